//! labelflow core
//!
//! Maximum flow by the labeling method, with a step observer hook that
//! exposes every inspection and forward move of the search.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod config;
pub mod data_structures;
pub mod execution;

pub use algorithm::graph::{EdmondsKarp, FlowMetrics, LabelingEngine, MaxFlowAlgorithm, MaxFlowResult, MaxFlowSolver};
pub use algorithm::state::{AugmentingPath, Direction, FlowRun, Mark, MarkArena};
pub use algorithm::traits::{Algorithm, FlowError, FlowStrategy, NodeId};
pub use config::SolverConfig;
pub use data_structures::capacity_matrix::{Capacity, CapacityMatrix};
pub use data_structures::edge_list::{infer_node_count, parse_edge_list, read_edge_list, Edge};
pub use execution::history::{ExecutionHistory, HistoryError, StepRecorder, StepSnapshot};
pub use execution::observer::{NoopObserver, ObserverChain, StepEvent, StepKind, StepObserver};
