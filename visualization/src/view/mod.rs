//! Step views
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph_view;

pub use self::graph_view::{GraphStyle, GraphView, LayoutEngine};
