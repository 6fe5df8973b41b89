//! Step observation hook
//!
//! Engines call the observer synchronously, once before every candidate
//! computation and once after every forward move. Observers only receive
//! shared references and return nothing, so they cannot steer the run.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::algorithm::state::MarkArena;
use crate::algorithm::traits::NodeId;
use crate::data_structures::capacity_matrix::{Capacity, CapacityMatrix};

/// Point in the run at which the observer is called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// Before the candidate set of `current` is computed
    Inspect,
    /// After `to` was marked and became the current node
    Advance { to: NodeId },
}

/// Borrowed view of the run handed to observers
#[derive(Debug, Clone, Copy)]
pub struct StepEvent<'a, C: Capacity> {
    /// Zero-based step counter
    pub step: usize,
    pub kind: StepKind,
    /// Node being processed when the event fired
    pub current: NodeId,
    pub residual: &'a CapacityMatrix<C>,
    pub marks: &'a MarkArena<C>,
    /// `(predecessor, node)` of every set mark
    pub highlighted: &'a [(NodeId, NodeId)],
}

/// Receiver of step events
pub trait StepObserver<C: Capacity> {
    fn observe(&mut self, event: &StepEvent<'_, C>);
}

impl<C, F> StepObserver<C> for F
where
    C: Capacity,
    F: FnMut(&StepEvent<'_, C>),
{
    fn observe(&mut self, event: &StepEvent<'_, C>) {
        self(event)
    }
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<C: Capacity> StepObserver<C> for NoopObserver {
    fn observe(&mut self, _event: &StepEvent<'_, C>) {}
}

/// Fans every event out to several observers in order
pub struct ObserverChain<'a, C: Capacity> {
    observers: Vec<&'a mut dyn StepObserver<C>>,
}

impl<'a, C: Capacity> ObserverChain<'a, C> {
    pub fn new() -> Self {
        Self { observers: Vec::new() }
    }

    pub fn push(&mut self, observer: &'a mut dyn StepObserver<C>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<C: Capacity> Default for ObserverChain<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Capacity> StepObserver<C> for ObserverChain<'_, C> {
    fn observe(&mut self, event: &StepEvent<'_, C>) {
        for observer in self.observers.iter_mut() {
            observer.observe(event);
        }
    }
}
