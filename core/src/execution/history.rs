//! Execution history for step-by-step replay
//!
//! [`StepRecorder`] is an observer that keeps an owned snapshot of every
//! step. The resulting [`ExecutionHistory`] serializes to JSON so a run can
//! be rendered or inspected after the fact; loading validates that every
//! snapshot is consistent with the metadata and with its own marks.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::state::MarkArena;
use crate::algorithm::traits::NodeId;
use crate::data_structures::capacity_matrix::{Capacity, CapacityMatrix};
use crate::execution::observer::{StepEvent, StepKind, StepObserver};

/// Error types for execution history operations
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("inconsistent history: {0}")]
    Inconsistent(String),
}

/// Owned copy of one observed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "C: Capacity", deserialize = "C: Capacity"))]
pub struct StepSnapshot<C> {
    pub step: usize,
    pub kind: StepKind,
    pub current: NodeId,
    pub residual: CapacityMatrix<C>,
    pub marks: MarkArena<C>,
    pub highlighted: Vec<(NodeId, NodeId)>,
}

impl<C: Capacity> StepSnapshot<C> {
    pub fn from_event(event: &StepEvent<'_, C>) -> Self {
        Self {
            step: event.step,
            kind: event.kind,
            current: event.current,
            residual: event.residual.clone(),
            marks: event.marks.clone(),
            highlighted: event.highlighted.to_vec(),
        }
    }
}

/// Metadata for execution history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    pub algorithm_name: String,
    pub node_count: usize,
    pub step_count: usize,
}

/// Recorded run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "C: Capacity", deserialize = "C: Capacity"))]
pub struct ExecutionHistory<C> {
    metadata: ExecutionMetadata,
    snapshots: Vec<StepSnapshot<C>>,
}

impl<C: Capacity> ExecutionHistory<C> {
    pub fn metadata(&self) -> &ExecutionMetadata {
        &self.metadata
    }

    pub fn snapshots(&self) -> &[StepSnapshot<C>] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<&StepSnapshot<C>> {
        self.snapshots.get(step)
    }

    pub fn to_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and validates a JSON trace
    pub fn from_json(text: &str) -> Result<Self, HistoryError> {
        let history: Self = serde_json::from_str(text)?;
        history.validate()?;
        Ok(history)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), HistoryError> {
        fs::write(path.as_ref(), self.to_json()?)?;
        debug!("wrote {} steps to {}", self.len(), path.as_ref().display());
        Ok(())
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<(), HistoryError> {
        let nodes = self.metadata.node_count;
        if self.metadata.step_count != self.snapshots.len() {
            return Err(HistoryError::Inconsistent(format!(
                "metadata announces {} steps, found {}",
                self.metadata.step_count,
                self.snapshots.len()
            )));
        }

        for (index, snapshot) in self.snapshots.iter().enumerate() {
            if snapshot.step != index {
                return Err(HistoryError::Inconsistent(format!(
                    "snapshot {index} is numbered {}",
                    snapshot.step
                )));
            }
            if snapshot.residual.node_count() != nodes || snapshot.marks.len() != nodes {
                return Err(HistoryError::Inconsistent(format!(
                    "step {index} does not describe {nodes} nodes"
                )));
            }
            if snapshot.current >= nodes {
                return Err(HistoryError::Inconsistent(format!(
                    "step {index} processes node {} outside the network",
                    snapshot.current
                )));
            }
            if let Some((node, predecessor)) = snapshot
                .marks
                .iter()
                .find_map(|(node, mark)| mark.predecessor().filter(|&p| p >= nodes).map(|p| (node, p)))
            {
                return Err(HistoryError::Inconsistent(format!(
                    "step {index} marks node {node} as reached from node {predecessor} outside the network"
                )));
            }
            if snapshot.highlighted != snapshot.marks.highlighted_edges() {
                return Err(HistoryError::Inconsistent(format!(
                    "step {index} highlights edges that do not match its marks"
                )));
            }
        }

        Ok(())
    }
}

/// Observer collecting an owned snapshot of every step
#[derive(Debug, Clone, Default)]
pub struct StepRecorder<C> {
    snapshots: Vec<StepSnapshot<C>>,
}

impl<C: Capacity> StepRecorder<C> {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn snapshots(&self) -> &[StepSnapshot<C>] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Seals the recording; `node_count` comes from the first snapshot
    pub fn into_history(self, algorithm_name: &str) -> ExecutionHistory<C> {
        let node_count = self
            .snapshots
            .first()
            .map(|snapshot| snapshot.residual.node_count())
            .unwrap_or(0);
        ExecutionHistory {
            metadata: ExecutionMetadata {
                algorithm_name: algorithm_name.to_string(),
                node_count,
                step_count: self.snapshots.len(),
            },
            snapshots: self.snapshots,
        }
    }
}

impl<C: Capacity> StepObserver<C> for StepRecorder<C> {
    fn observe(&mut self, event: &StepEvent<'_, C>) {
        self.snapshots.push(StepSnapshot::from_event(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::graph::max_flow::{MaxFlowAlgorithm, MaxFlowSolver};
    use crate::algorithm::state::{Direction, Mark};

    fn recorded() -> ExecutionHistory<i64> {
        let network = CapacityMatrix::from_rows(vec![
            vec![0, 3, 2, 0],
            vec![0, 0, 1, 2],
            vec![0, 0, 0, 2],
            vec![0, 0, 0, 0],
        ])
        .unwrap();
        let mut recorder = StepRecorder::<i64>::new();
        MaxFlowSolver::new(MaxFlowAlgorithm::Labeling)
            .solve_with_observer(&network, Some(&mut recorder))
            .unwrap();
        recorder.into_history("labeling")
    }

    #[test]
    fn test_recorder_captures_every_step() {
        let history = recorded();
        assert_eq!(history.metadata().node_count, 4);
        assert_eq!(history.metadata().step_count, history.len());
        assert_eq!(history.get(0).unwrap().kind, StepKind::Inspect);
        assert_eq!(history.get(1).unwrap().kind, StepKind::Advance { to: 1 });
        assert_eq!(history.get(1).unwrap().highlighted, vec![(0, 1)]);

        let last = history.snapshots().last().unwrap();
        assert_eq!(last.kind, StepKind::Inspect);
        assert_eq!(last.current, 0);
    }

    #[test]
    fn test_json_round_trip() {
        let history = recorded();
        let json = history.to_json().unwrap();
        let restored = ExecutionHistory::<i64>::from_json(&json).unwrap();
        assert_eq!(restored, history);
    }

    #[test]
    fn test_unknown_direction_in_trace() {
        let json = recorded().to_json().unwrap().replace("\"+\"", "\"?\"");
        let err = ExecutionHistory::<i64>::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("unknown direction '?'"));
    }

    #[test]
    fn test_inconsistent_trace_rejected() {
        let mut history = recorded();
        history.metadata.step_count += 1;
        let json = serde_json::to_string(&history).unwrap();
        assert!(matches!(
            ExecutionHistory::<i64>::from_json(&json),
            Err(HistoryError::Inconsistent(_))
        ));

        let mut history = recorded();
        history.snapshots[1].highlighted.clear();
        let json = serde_json::to_string(&history).unwrap();
        assert!(matches!(
            ExecutionHistory::<i64>::from_json(&json),
            Err(HistoryError::Inconsistent(_))
        ));

        let mut history = recorded();
        let snapshot = &mut history.snapshots[1];
        snapshot.marks.set(
            1,
            Mark::Reached {
                capacity: 3,
                predecessor: 9,
                direction: Direction::Forward,
            },
        );
        snapshot.highlighted = snapshot.marks.highlighted_edges();
        let json = serde_json::to_string(&history).unwrap();
        let err = ExecutionHistory::<i64>::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("reached from node 9 outside the network"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let history = recorded();
        history.write_to(&path).unwrap();
        assert_eq!(ExecutionHistory::<i64>::read_from(&path).unwrap(), history);
    }
}
