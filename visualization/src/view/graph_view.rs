//! Graph view rendering one step of a flow run as Graphviz DOT
//!
//! Nodes sit on a circle (`circo` layout by default), every arc with
//! positive residual capacity is drawn with its capacity as label, and the
//! arcs of the current partial path are drawn in the highlight style.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use labelflow_core::{Capacity, CapacityMatrix, NodeId, StepEvent, StepKind, StepSnapshot};

/// Graphviz layout engines suited to small networks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    /// Nodes on a circle
    #[default]
    Circo,
    /// Layered, source on top
    Dot,
    /// Spring model
    Neato,
}

impl LayoutEngine {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Circo => "circo",
            Self::Dot => "dot",
            Self::Neato => "neato",
        }
    }
}

/// Visual parameters of a rendered frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStyle {
    pub layout: LayoutEngine,
    pub node_shape: String,
    pub highlight_color: String,
    pub highlight_width: f64,
    /// Print the step caption under the graph
    pub show_caption: bool,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            layout: LayoutEngine::Circo,
            node_shape: "circle".to_string(),
            highlight_color: "red".to_string(),
            highlight_width: 4.0,
            show_caption: true,
        }
    }
}

/// Stateless DOT renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphView {
    style: GraphStyle,
}

impl GraphView {
    pub fn new(style: GraphStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &GraphStyle {
        &self.style
    }

    /// Renders a residual matrix with the given arcs highlighted
    pub fn render<C: Capacity>(
        &self,
        residual: &CapacityMatrix<C>,
        highlighted: &[(NodeId, NodeId)],
        caption: Option<&str>,
    ) -> String {
        DotFrame {
            style: &self.style,
            residual,
            highlighted,
            caption,
        }
        .to_string()
    }

    /// Renders a live observer event
    pub fn render_event<C: Capacity>(&self, event: &StepEvent<'_, C>) -> String {
        let caption = caption(event.step, event.kind, event.current);
        self.render(event.residual, event.highlighted, Some(&caption))
    }

    /// Renders a recorded step
    pub fn render_snapshot<C: Capacity>(&self, snapshot: &StepSnapshot<C>) -> String {
        let caption = caption(snapshot.step, snapshot.kind, snapshot.current);
        self.render(&snapshot.residual, &snapshot.highlighted, Some(&caption))
    }
}

fn caption(step: usize, kind: StepKind, current: NodeId) -> String {
    match kind {
        StepKind::Inspect => format!("step {step}: inspect node {current}"),
        StepKind::Advance { to } => format!("step {step}: advance to node {to}"),
    }
}

struct DotFrame<'a, C> {
    style: &'a GraphStyle,
    residual: &'a CapacityMatrix<C>,
    highlighted: &'a [(NodeId, NodeId)],
    caption: Option<&'a str>,
}

impl<C: Capacity> DotFrame<'_, C> {
    fn write_highlight(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "color=\"{}\", penwidth={}",
            self.style.highlight_color, self.style.highlight_width
        )
    }
}

impl<C: Capacity> Display for DotFrame<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph flow {{")?;
        writeln!(f, "    layout={};", self.style.layout.as_str())?;
        if self.style.show_caption {
            if let Some(caption) = self.caption {
                writeln!(f, "    label=\"{}\";", caption.replace('"', "\\\""))?;
            }
        }
        writeln!(f, "    node [shape={}];", self.style.node_shape)?;

        for node in 0..self.residual.node_count() {
            writeln!(f, "    {node};")?;
        }

        for (from, to, capacity) in self.residual.edges() {
            write!(f, "    {from} -> {to} [label=\"{capacity}\"")?;
            if self.highlighted.contains(&(from, to)) {
                write!(f, ", ")?;
                self.write_highlight(f)?;
            }
            writeln!(f, "];")?;
        }

        // Highlighted arcs are normally residual arcs too; draw any leftover
        let nodes = self.residual.node_count();
        for &(from, to) in self.highlighted {
            if from >= nodes || to >= nodes {
                continue;
            }
            if self.residual.get(from, to) <= C::zero() {
                write!(f, "    {from} -> {to} [")?;
                self.write_highlight(f)?;
                writeln!(f, "];")?;
            }
        }

        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> CapacityMatrix<i64> {
        CapacityMatrix::from_rows(vec![vec![0, 3, 2], vec![0, 0, 1], vec![0, 0, 0]]).unwrap()
    }

    #[test]
    fn test_plain_frame() {
        let dot = GraphView::default().render(&network(), &[], None);
        assert!(dot.starts_with("digraph flow {\n    layout=circo;\n"));
        assert!(dot.contains("    node [shape=circle];\n"));
        assert!(dot.contains("    0 -> 1 [label=\"3\"];\n"));
        assert!(dot.contains("    1 -> 2 [label=\"1\"];\n"));
        assert!(!dot.contains("1 -> 0"));
        assert!(!dot.contains("label=\"step"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_highlighted_arcs() {
        let dot = GraphView::default().render(&network(), &[(0, 1)], Some("step 1: advance to node 1"));
        assert!(dot.contains("    0 -> 1 [label=\"3\", color=\"red\", penwidth=4];\n"));
        assert!(dot.contains("    0 -> 2 [label=\"2\"];\n"));
        assert!(dot.contains("    label=\"step 1: advance to node 1\";\n"));
    }

    #[test]
    fn test_highlight_without_residual() {
        let dot = GraphView::default().render(&network(), &[(2, 0)], None);
        assert!(dot.contains("    2 -> 0 [color=\"red\", penwidth=4];\n"));
    }

    #[test]
    fn test_highlight_outside_network_skipped() {
        let dot = GraphView::default().render(&network(), &[(9, 1), (0, 1)], None);
        assert!(!dot.contains("9 ->"));
        assert!(dot.contains("    0 -> 1 [label=\"3\", color=\"red\", penwidth=4];\n"));
    }

    #[test]
    fn test_custom_style() {
        let view = GraphView::new(GraphStyle {
            layout: LayoutEngine::Dot,
            highlight_color: "blue".to_string(),
            highlight_width: 2.5,
            show_caption: false,
            ..GraphStyle::default()
        });
        let dot = view.render(&network(), &[(1, 2)], Some("hidden"));
        assert!(dot.contains("layout=dot;"));
        assert!(dot.contains("1 -> 2 [label=\"1\", color=\"blue\", penwidth=2.5];"));
        assert!(!dot.contains("hidden"));
    }

    #[test]
    fn test_captions() {
        assert_eq!(caption(0, StepKind::Inspect, 0), "step 0: inspect node 0");
        assert_eq!(caption(4, StepKind::Advance { to: 3 }, 3), "step 4: advance to node 3");
    }
}
