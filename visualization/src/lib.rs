//! labelflow visualization
//!
//! Turns the step events of a flow run into Graphviz DOT frames, either
//! live through the observer hook or by replaying a recorded trace.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod frames;
pub mod view;

pub use frames::{render_history, DotFrameWriter, FrameManifest, RenderError, DEFAULT_FPS, MANIFEST_FILE};
pub use view::graph_view::{GraphStyle, GraphView, LayoutEngine};
