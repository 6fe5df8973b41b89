//! Core algorithm trait definitions for labelflow
//!
//! This module establishes the shared vocabulary of the flow engine: the
//! node identifier, the error type every layer reports through, and the
//! runtime parameter interface solvers expose to configuration layers.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::algorithm::state::FlowRun;
use crate::data_structures::capacity_matrix::Capacity;
use crate::execution::observer::StepObserver;

/// Node index inside a capacity matrix (0 is the source, N-1 the sink)
pub type NodeId = usize;

/// Errors raised while building networks or running flow algorithms
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("line {line}: malformed edge: {reason}")]
    MalformedEdge { line: usize, reason: String },

    #[error("node {node} is out of range for a network of {nodes} nodes")]
    NodeOutOfRange { node: NodeId, nodes: usize },

    #[error("negative capacity {capacity} on edge {from} -> {to}")]
    NegativeCapacity {
        from: NodeId,
        to: NodeId,
        capacity: String,
    },

    #[error("row {row} has {len} entries, expected {expected}")]
    NonSquareMatrix { row: usize, len: usize, expected: usize },

    #[error("matrix dimensions differ: {left} vs {right} nodes")]
    DimensionMismatch { left: usize, right: usize },

    #[error("a flow network needs at least two nodes, got {0}")]
    TooFewNodes(usize),

    #[error("unknown direction '{0}', expected '+' or '-'")]
    UnknownDirection(char),

    #[error("mark state corrupted: {0}")]
    CorruptedMarks(String),

    #[error("capacity arithmetic overflows in {0}")]
    CapacityOverflow(String),

    #[error("flow invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl FlowError {
    /// True for errors caused by the caller's network description
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedEdge { .. }
                | Self::NodeOutOfRange { .. }
                | Self::NegativeCapacity { .. }
                | Self::NonSquareMatrix { .. }
                | Self::DimensionMismatch { .. }
                | Self::TooFewNodes(_)
        )
    }
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Boolean,
    Enum(Vec<String>),
}

/// Runtime parameter descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
}

/// Common surface of every solver exposed to configuration layers
pub trait Algorithm {
    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category
    fn category(&self) -> &'static str;

    /// Returns a short description of the method
    fn description(&self) -> String;

    /// Returns supported parameters with their current values
    fn parameters(&self) -> Vec<AlgorithmParameter>;

    /// Sets algorithm parameter with type validation
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), FlowError>;

    /// Gets algorithm parameter value
    fn get_parameter(&self, name: &str) -> Option<String>;
}

/// Augmenting-path search strategy driving a [`FlowRun`] to completion
pub trait FlowStrategy<C: Capacity> {
    /// Short identifier used in logs and traces
    fn name(&self) -> &'static str;

    /// Runs searches and augmentations until no augmenting path remains
    fn execute(&mut self, run: &mut FlowRun<C>, observer: &mut dyn StepObserver<C>) -> Result<(), FlowError>;
}
