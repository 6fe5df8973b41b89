//! Edmonds-Karp shortest augmenting paths
//!
//! Breadth-first labeling over the same residual matrix and mark arena as
//! the depth-first engine. Each search is reported to the observer as one
//! `Inspect` before the sweep and one `Advance` once the sink is labeled.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::debug;

use crate::algorithm::state::FlowRun;
use crate::algorithm::traits::{FlowError, FlowStrategy};
use crate::data_structures::capacity_matrix::Capacity;
use crate::execution::observer::{StepKind, StepObserver};

#[derive(Debug, Clone, Copy, Default)]
pub struct EdmondsKarp;

impl EdmondsKarp {
    pub fn new() -> Self {
        Self
    }

    /// Labels nodes breadth first; true once the sink is labeled
    fn sweep<C: Capacity>(run: &mut FlowRun<C>) -> bool {
        let sink = run.sink();
        let mut queue = VecDeque::from([run.source()]);

        while let Some(node) = queue.pop_front() {
            for next in 0..run.node_count() {
                if run.marks().is_marked(next) || run.residual().get(node, next) <= C::zero() {
                    continue;
                }
                run.mark(node, next);
                if next == sink {
                    return true;
                }
                queue.push_back(next);
            }
        }

        false
    }
}

impl<C: Capacity> FlowStrategy<C> for EdmondsKarp {
    fn name(&self) -> &'static str {
        "edmonds-karp"
    }

    fn execute(&mut self, run: &mut FlowRun<C>, observer: &mut dyn StepObserver<C>) -> Result<(), FlowError> {
        let source = run.source();
        let sink = run.sink();

        loop {
            run.begin_search();
            run.notify(observer, StepKind::Inspect, source);

            if !Self::sweep(run) {
                return Ok(());
            }

            run.notify(observer, StepKind::Advance { to: sink }, sink);
            let bottleneck = run.augment()?;
            debug!("shortest augmenting path {} carried {}", run.paths.len(), bottleneck);
        }
    }
}
