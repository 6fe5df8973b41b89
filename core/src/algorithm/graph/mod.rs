//! Maximum flow algorithms over capacity matrices
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod edmonds_karp;
pub mod labeling;
pub mod max_flow;

pub use self::edmonds_karp::EdmondsKarp;
pub use self::labeling::{LabelingEngine, Phase};
pub use self::max_flow::{FlowMetrics, MaxFlowAlgorithm, MaxFlowResult, MaxFlowSolver};
