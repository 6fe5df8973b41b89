//! Per-run algorithm state for augmenting-path flow methods
//!
//! Every run owns its marks, its residual matrix and its pristine copy of
//! the input, so runs never share mutable state. Marks live in an arena
//! indexed by node; the augmentation step is the only writer of the
//! residual matrix.
//!
//! # Invariants
//! - residual capacities stay non-negative
//! - residual\[i\]\[j\] + residual\[j\]\[i\] is constant for every pair
//! - during a labeling search the set marks form a single chain rooted at
//!   the source
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{FlowError, NodeId};
use crate::data_structures::capacity_matrix::{Capacity, CapacityMatrix};
use crate::execution::observer::{StepEvent, StepKind, StepObserver};

/// Which way flow moves across the arc used to reach a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub enum Direction {
    /// Arc of the original network (`+`)
    Forward,
    /// Reverse residual arc cancelling earlier flow (`-`)
    Backward,
}

impl Direction {
    #[inline]
    pub const fn as_char(self) -> char {
        match self {
            Self::Forward => '+',
            Self::Backward => '-',
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = FlowError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        match symbol {
            '+' => Ok(Self::Forward),
            '-' => Ok(Self::Backward),
            other => Err(FlowError::UnknownDirection(other)),
        }
    }
}

impl From<Direction> for char {
    fn from(direction: Direction) -> Self {
        direction.as_char()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Label attached to a node during one augmenting-path search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "C: Capacity", deserialize = "C: Capacity"))]
pub enum Mark<C> {
    /// Sentinel on the source: unbounded capacity, no predecessor
    Source,
    /// Node reached over the arc `predecessor -> node`
    Reached {
        capacity: C,
        predecessor: NodeId,
        direction: Direction,
    },
}

impl<C: Capacity> Mark<C> {
    /// Capacity of the arc that reached the node; `None` means unbounded
    pub fn capacity(&self) -> Option<C> {
        match self {
            Self::Source => None,
            Self::Reached { capacity, .. } => Some(*capacity),
        }
    }

    pub fn predecessor(&self) -> Option<NodeId> {
        match self {
            Self::Source => None,
            Self::Reached { predecessor, .. } => Some(*predecessor),
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Source => None,
            Self::Reached { direction, .. } => Some(*direction),
        }
    }
}

/// One arc of an augmenting path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathArc<C> {
    pub from: NodeId,
    pub to: NodeId,
    pub capacity: C,
    pub direction: Direction,
}

/// Mark slots, one per node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(serialize = "C: Capacity", deserialize = "C: Capacity"))]
pub struct MarkArena<C> {
    slots: Vec<Option<Mark<C>>>,
}

impl<C: Capacity> MarkArena<C> {
    pub fn new(nodes: usize) -> Self {
        Self { slots: vec![None; nodes] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn is_marked(&self, node: NodeId) -> bool {
        self.slots[node].is_some()
    }

    pub fn get(&self, node: NodeId) -> Option<&Mark<C>> {
        self.slots.get(node).and_then(Option::as_ref)
    }

    pub fn set(&mut self, node: NodeId, mark: Mark<C>) {
        self.slots[node] = Some(mark);
    }

    /// Removes and returns the mark of `node`
    pub fn take(&mut self, node: NodeId) -> Option<Mark<C>> {
        self.slots[node].take()
    }

    /// Clears every slot and labels `source` with the sentinel
    pub fn reset(&mut self, source: NodeId) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.slots[source] = Some(Mark::Source);
    }

    /// Set marks in ascending node order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Mark<C>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(node, slot)| slot.as_ref().map(|mark| (node, mark)))
    }

    /// `(predecessor, node)` for every reached node, ascending by node
    pub fn highlighted_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.iter()
            .filter_map(|(node, mark)| mark.predecessor().map(|predecessor| (predecessor, node)))
            .collect()
    }

    /// Minimum capacity over all set marks; `None` if only the sentinel is set
    pub fn bottleneck(&self) -> Option<C> {
        self.iter()
            .filter_map(|(_, mark)| mark.capacity())
            .fold(None, |best, capacity| match best {
                Some(current) if current <= capacity => Some(current),
                _ => Some(capacity),
            })
    }

    /// Follows predecessor links from `target` back to `source`.
    ///
    /// Returns the arcs in source-to-target order.
    pub fn path_to(&self, target: NodeId, source: NodeId) -> Result<Vec<PathArc<C>>, FlowError> {
        let mut arcs = Vec::new();
        let mut node = target;

        while node != source {
            if arcs.len() >= self.slots.len() {
                return Err(FlowError::CorruptedMarks(format!(
                    "predecessor chain from node {target} does not reach the source"
                )));
            }
            match self.get(node) {
                Some(Mark::Reached {
                    capacity,
                    predecessor,
                    direction,
                }) => {
                    arcs.push(PathArc {
                        from: *predecessor,
                        to: node,
                        capacity: *capacity,
                        direction: *direction,
                    });
                    node = *predecessor;
                }
                Some(Mark::Source) => {
                    return Err(FlowError::CorruptedMarks(format!(
                        "node {node} carries the source sentinel"
                    )));
                }
                None => {
                    return Err(FlowError::CorruptedMarks(format!(
                        "node {node} on the augmenting path has no mark"
                    )));
                }
            }
        }

        arcs.reverse();
        Ok(arcs)
    }
}

/// Applied augmenting path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "C: Capacity", deserialize = "C: Capacity"))]
pub struct AugmentingPath<C> {
    /// Nodes from source to sink
    pub nodes: Vec<NodeId>,
    /// Direction of each arc, `nodes.len() - 1` entries
    pub directions: Vec<Direction>,
    pub bottleneck: C,
}

/// Counters collected during a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Observer notifications issued
    pub steps: usize,
    /// Searches started from the source
    pub searches: usize,
    pub augmentations: usize,
    pub backtracks: usize,
}

/// Mutable state of one max-flow run
#[derive(Debug, Clone)]
pub struct FlowRun<C: Capacity> {
    pub(crate) original: CapacityMatrix<C>,
    pub(crate) residual: CapacityMatrix<C>,
    pub(crate) marks: MarkArena<C>,
    pub(crate) path_weights: Vec<C>,
    pub(crate) paths: Vec<AugmentingPath<C>>,
    pub(crate) metrics: RunMetrics,
    source: NodeId,
    sink: NodeId,
}

impl<C: Capacity> FlowRun<C> {
    /// Prepares a run; the input matrix is copied, never mutated
    pub fn new(network: &CapacityMatrix<C>) -> Result<Self, FlowError> {
        let nodes = network.node_count();
        if nodes < 2 {
            return Err(FlowError::TooFewNodes(nodes));
        }

        let mut marks = MarkArena::new(nodes);
        marks.reset(0);

        Ok(Self {
            original: network.clone(),
            residual: network.clone(),
            marks,
            path_weights: Vec::new(),
            paths: Vec::new(),
            metrics: RunMetrics::default(),
            source: 0,
            sink: nodes - 1,
        })
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.source
    }

    #[inline]
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.residual.node_count()
    }

    pub fn residual(&self) -> &CapacityMatrix<C> {
        &self.residual
    }

    pub fn original(&self) -> &CapacityMatrix<C> {
        &self.original
    }

    pub fn marks(&self) -> &MarkArena<C> {
        &self.marks
    }

    pub fn path_weights(&self) -> &[C] {
        &self.path_weights
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// `+` for arcs of the original network, `-` for pure reverse arcs
    pub fn direction_of(&self, from: NodeId, to: NodeId) -> Direction {
        if self.original.get(from, to) > C::zero() {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Labels `to` as reached from `from` with the current residual capacity
    pub(crate) fn mark(&mut self, from: NodeId, to: NodeId) {
        let mark = Mark::Reached {
            capacity: self.residual.get(from, to),
            predecessor: from,
            direction: self.direction_of(from, to),
        };
        trace!("mark {to} <- {from} ({mark:?})");
        self.marks.set(to, mark);
    }

    /// Clears all marks and starts a new search from the source
    pub(crate) fn begin_search(&mut self) {
        self.marks.reset(self.source);
        self.metrics.searches += 1;
    }

    /// Hands the current state to the observer
    pub(crate) fn notify(&mut self, observer: &mut dyn StepObserver<C>, kind: StepKind, current: NodeId) {
        let highlighted = self.marks.highlighted_edges();
        let event = StepEvent {
            step: self.metrics.steps,
            kind,
            current,
            residual: &self.residual,
            marks: &self.marks,
            highlighted: &highlighted,
        };
        observer.observe(&event);
        self.metrics.steps += 1;
    }

    /// Applies the marked source-to-sink path to the residual matrix.
    ///
    /// The bottleneck is the smallest arc capacity on the path. Marks of
    /// every node on the path are cleared; the source keeps its sentinel.
    pub(crate) fn augment(&mut self) -> Result<C, FlowError> {
        let arcs = self.marks.path_to(self.sink, self.source)?;
        let bottleneck = arcs
            .iter()
            .map(|arc| arc.capacity)
            .fold(None, |best: Option<C>, capacity| match best {
                Some(current) if current <= capacity => Some(current),
                _ => Some(capacity),
            })
            .ok_or_else(|| FlowError::CorruptedMarks("augmenting path has no arcs".to_string()))?;

        for arc in arcs.iter().rev() {
            if self.residual.get(arc.from, arc.to) < bottleneck {
                return Err(FlowError::CorruptedMarks(format!(
                    "arc {} -> {} has residual {} below the bottleneck {}",
                    arc.from,
                    arc.to,
                    self.residual.get(arc.from, arc.to),
                    bottleneck
                )));
            }
            self.residual.transfer(arc.from, arc.to, bottleneck)?;
            self.marks.take(arc.to);
        }

        let mut nodes = Vec::with_capacity(arcs.len() + 1);
        nodes.push(self.source);
        nodes.extend(arcs.iter().map(|arc| arc.to));

        self.path_weights.push(bottleneck);
        self.paths.push(AugmentingPath {
            nodes,
            directions: arcs.iter().map(|arc| arc.direction).collect(),
            bottleneck,
        });
        self.metrics.augmentations += 1;

        Ok(bottleneck)
    }

    /// Nodes reachable from the source over positive residual capacity
    pub fn source_side(&self) -> Vec<NodeId> {
        let nodes = self.node_count();
        let mut seen = vec![false; nodes];
        let mut stack = vec![self.source];
        seen[self.source] = true;

        while let Some(node) = stack.pop() {
            for (next, &capacity) in self.residual.row(node).iter().enumerate() {
                if !seen[next] && capacity > C::zero() {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }

        (0..nodes).filter(|&node| seen[node]).collect()
    }
}
