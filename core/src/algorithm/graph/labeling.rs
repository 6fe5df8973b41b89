//! Ford-Fulkerson labeling method
//!
//! Depth-first labeling search driven by an explicit state machine
//! instead of recursion:
//!
//! - `Advance`: compute the unmarked neighbours of the current node with
//!   positive residual capacity and move to the one with the largest
//!   capacity (lowest index on ties)
//! - `Augment`: the sink was reached; push the bottleneck along the marked
//!   path and restart from the source
//! - `Backtrack`: dead end; retire the node for the rest of the search and
//!   return to its predecessor
//! - `Done`: the source itself has no candidate left
//!
//! A search marks or retires each node at most once, so it finishes within
//! 2N transitions.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::algorithm::state::{FlowRun, Mark};
use crate::algorithm::traits::{FlowError, FlowStrategy, NodeId};
use crate::data_structures::capacity_matrix::Capacity;
use crate::execution::observer::{StepKind, StepObserver};

/// States of the labeling machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Advance,
    Augment,
    Backtrack,
    Done,
}

/// Greedy-by-capacity labeling engine
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelingEngine;

impl LabelingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Unmarked, non-retired neighbours of `current` with residual capacity,
    /// ascending by index
    pub(crate) fn candidates<C: Capacity>(
        run: &FlowRun<C>,
        current: NodeId,
        retired: &[bool],
    ) -> Vec<NodeId> {
        run.residual()
            .row(current)
            .iter()
            .enumerate()
            .filter(|&(node, &capacity)| {
                capacity > C::zero() && !run.marks().is_marked(node) && !retired[node]
            })
            .map(|(node, _)| node)
            .collect()
    }

    /// Candidate with the largest residual capacity; first wins on ties
    pub(crate) fn select<C: Capacity>(
        run: &FlowRun<C>,
        current: NodeId,
        candidates: &[NodeId],
    ) -> Option<NodeId> {
        let mut best: Option<(NodeId, C)> = None;
        for &node in candidates {
            let capacity = run.residual().get(current, node);
            match best {
                Some((_, best_capacity)) if capacity <= best_capacity => {}
                _ => best = Some((node, capacity)),
            }
        }
        best.map(|(node, _)| node)
    }

    /// Unmarks a dead-end node and returns its predecessor
    pub(crate) fn backtrack<C: Capacity>(
        run: &mut FlowRun<C>,
        current: NodeId,
        retired: &mut [bool],
    ) -> Result<NodeId, FlowError> {
        match run.marks.take(current) {
            Some(Mark::Reached { predecessor, .. }) => {
                retired[current] = true;
                run.metrics.backtracks += 1;
                trace!("dead end at {current}, back to {predecessor}");
                Ok(predecessor)
            }
            Some(Mark::Source) => Err(FlowError::CorruptedMarks(format!(
                "cannot back out of node {current}: it carries the source sentinel"
            ))),
            None => Err(FlowError::CorruptedMarks(format!(
                "cannot back out of node {current}: it is not marked"
            ))),
        }
    }
}

impl<C: Capacity> FlowStrategy<C> for LabelingEngine {
    fn name(&self) -> &'static str {
        "labeling"
    }

    fn execute(&mut self, run: &mut FlowRun<C>, observer: &mut dyn StepObserver<C>) -> Result<(), FlowError> {
        let source = run.source();
        let sink = run.sink();
        let mut retired = vec![false; run.node_count()];
        let mut current = source;
        let mut phase = Phase::Advance;

        run.begin_search();

        loop {
            phase = match phase {
                Phase::Advance => {
                    run.notify(observer, StepKind::Inspect, current);
                    let candidates = Self::candidates(run, current, &retired);
                    match Self::select(run, current, &candidates) {
                        Some(next) => {
                            run.mark(current, next);
                            current = next;
                            run.notify(observer, StepKind::Advance { to: next }, current);
                            if next == sink {
                                Phase::Augment
                            } else {
                                Phase::Advance
                            }
                        }
                        None if current == source => Phase::Done,
                        None => Phase::Backtrack,
                    }
                }
                Phase::Augment => {
                    let bottleneck = run.augment()?;
                    debug!(
                        "augmenting path {} carried {}",
                        run.paths.len(),
                        bottleneck
                    );

                    retired.iter_mut().for_each(|flag| *flag = false);
                    run.begin_search();
                    current = source;
                    Phase::Advance
                }
                Phase::Backtrack => {
                    current = Self::backtrack(run, current, &mut retired)?;
                    Phase::Advance
                }
                Phase::Done => break,
            };
        }

        Ok(())
    }
}
