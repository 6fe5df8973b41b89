//! Maximum Flow Solver
//!
//! Front door of the flow engine: picks the augmenting-path strategy,
//! runs it over a private copy of the capacity matrix and assembles the
//! result (flow value, net flow matrix, path decomposition, minimum cut).
//!
//! # Result conventions
//! `net_flow` is `original - residual` entrywise. It is skew-symmetric: an
//! edge carrying `f` units shows `f` on its own cell and `-f` on the
//! reverse cell. [`MaxFlowResult::edge_flows`] keeps the positive part only.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::algorithm::graph::edmonds_karp::EdmondsKarp;
use crate::algorithm::graph::labeling::LabelingEngine;
use crate::algorithm::state::{AugmentingPath, FlowRun};
use crate::algorithm::traits::{
    Algorithm, AlgorithmParameter, FlowError, FlowStrategy, NodeId, ParameterType,
};
use crate::config::SolverConfig;
use crate::data_structures::capacity_matrix::{Capacity, CapacityMatrix};
use crate::execution::observer::{NoopObserver, StepObserver};

/// Maximum flow algorithm variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaxFlowAlgorithm {
    /// Depth-first labeling, widest arc first
    #[default]
    Labeling,
    /// Breadth-first shortest augmenting paths
    EdmondsKarp,
}

impl MaxFlowAlgorithm {
    pub const ALL: [MaxFlowAlgorithm; 2] = [Self::Labeling, Self::EdmondsKarp];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Labeling => "labeling",
            Self::EdmondsKarp => "edmonds-karp",
        }
    }
}

impl fmt::Display for MaxFlowAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaxFlowAlgorithm {
    type Err = FlowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == value)
            .ok_or_else(|| FlowError::InvalidParameter {
                name: "algorithm".to_string(),
                reason: format!("unknown algorithm '{value}', expected labeling or edmonds-karp"),
            })
    }
}

/// Flow algorithm performance metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    /// Observer notifications issued
    pub steps: usize,
    pub searches: usize,
    pub augmentations: usize,
    pub backtracks: usize,
    pub execution_time_ms: f64,
}

/// Maximum flow result with detailed flow information
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = "C: Capacity"))]
pub struct MaxFlowResult<C> {
    pub algorithm: MaxFlowAlgorithm,
    /// Sum of all path weights
    pub max_flow: C,
    /// `original - residual`
    pub net_flow: CapacityMatrix<C>,
    /// Bottleneck of every applied path, in order
    pub path_weights: Vec<C>,
    pub paths: Vec<AugmentingPath<C>>,
    /// Source side of a minimum cut
    pub min_cut: Vec<NodeId>,
    pub min_cut_capacity: C,
    pub metrics: FlowMetrics,
}

impl<C: Capacity> MaxFlowResult<C> {
    fn from_run(run: FlowRun<C>, algorithm: MaxFlowAlgorithm, elapsed: Duration) -> Result<Self, FlowError> {
        let min_cut = run.source_side();
        let mut on_source_side = vec![false; run.node_count()];
        min_cut.iter().for_each(|&node| on_source_side[node] = true);

        let min_cut_capacity = run
            .original
            .edges()
            .filter(|&(from, to, _)| on_source_side[from] && !on_source_side[to])
            .try_fold(C::zero(), |acc, (_, _, capacity)| {
                acc.checked_sum(capacity)
                    .ok_or_else(|| FlowError::CapacityOverflow("minimum cut capacity".to_string()))
            })?;
        let max_flow = run.path_weights.iter().try_fold(C::zero(), |acc, &weight| {
            acc.checked_sum(weight)
                .ok_or_else(|| FlowError::CapacityOverflow("total flow".to_string()))
        })?;
        let net_flow = run.original.difference(&run.residual)?;

        Ok(Self {
            algorithm,
            max_flow,
            net_flow,
            path_weights: run.path_weights,
            paths: run.paths,
            min_cut,
            min_cut_capacity,
            metrics: FlowMetrics {
                steps: run.metrics.steps,
                searches: run.metrics.searches,
                augmentations: run.metrics.augmentations,
                backtracks: run.metrics.backtracks,
                execution_time_ms: elapsed.as_secs_f64() * 1000.0,
            },
        })
    }

    /// Flow carried by each edge, negative reverse entries dropped
    pub fn edge_flows(&self) -> CapacityMatrix<C> {
        self.net_flow.positive_part()
    }

    /// Checks capacity bounds, skew symmetry, conservation and the
    /// max-flow / min-cut equality against the input network.
    ///
    /// Floating capacities are compared within [`Capacity::approx_eq`].
    pub fn verify(&self, original: &CapacityMatrix<C>) -> Result<(), FlowError> {
        let nodes = original.node_count();
        if self.net_flow.node_count() != nodes {
            return Err(FlowError::DimensionMismatch {
                left: self.net_flow.node_count(),
                right: nodes,
            });
        }
        let sink = nodes.saturating_sub(1);

        for from in 0..nodes {
            for to in 0..nodes {
                let flow = self.net_flow.get(from, to);
                let capacity = original.get(from, to);
                if flow > capacity && !flow.approx_eq(capacity) {
                    return Err(FlowError::InvariantViolation(format!(
                        "edge {from} -> {to} carries {flow} over capacity {capacity}"
                    )));
                }
                if !flow.approx_eq(-self.net_flow.get(to, from)) {
                    return Err(FlowError::InvariantViolation(format!(
                        "net flow on {from} <-> {to} is not antisymmetric"
                    )));
                }
            }
        }

        for node in 1..sink {
            let balance = self.net_flow.row_sum(node)?;
            if !balance.approx_eq(C::zero()) {
                return Err(FlowError::InvariantViolation(format!(
                    "node {node} is unbalanced by {balance}"
                )));
            }
        }

        let emitted = self.net_flow.row_sum(0)?;
        if !emitted.approx_eq(self.max_flow) {
            return Err(FlowError::InvariantViolation(format!(
                "source emits {emitted} but the path weights sum to {}",
                self.max_flow
            )));
        }
        if !self.min_cut_capacity.approx_eq(self.max_flow) {
            return Err(FlowError::InvariantViolation(format!(
                "flow {} differs from cut capacity {}",
                self.max_flow, self.min_cut_capacity
            )));
        }

        Ok(())
    }
}

/// Maximum flow solver with runtime parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaxFlowSolver {
    algorithm: MaxFlowAlgorithm,
    verify: bool,
}

impl MaxFlowSolver {
    /// Create new maximum flow solver with specified algorithm
    pub fn new(algorithm: MaxFlowAlgorithm) -> Self {
        Self {
            algorithm,
            verify: false,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            algorithm: config.algorithm,
            verify: config.verify,
        }
    }

    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn algorithm(&self) -> MaxFlowAlgorithm {
        self.algorithm
    }

    /// Solves without observation
    pub fn solve<C: Capacity>(&self, network: &CapacityMatrix<C>) -> Result<MaxFlowResult<C>, FlowError> {
        self.solve_with_observer(network, None)
    }

    /// Solves, reporting every step to `observer`
    pub fn solve_with_observer<C: Capacity>(
        &self,
        network: &CapacityMatrix<C>,
        observer: Option<&mut dyn StepObserver<C>>,
    ) -> Result<MaxFlowResult<C>, FlowError> {
        let started = Instant::now();
        let mut run = FlowRun::new(network)?;
        info!(
            "solving max flow on {} nodes with {}",
            network.node_count(),
            self.algorithm
        );

        match observer {
            Some(observer) => self.drive(&mut run, observer)?,
            None => self.drive(&mut run, &mut NoopObserver)?,
        }

        let result = MaxFlowResult::from_run(run, self.algorithm, started.elapsed())?;
        info!(
            "max flow {} after {} augmenting paths",
            result.max_flow,
            result.path_weights.len()
        );

        if self.verify {
            result.verify(network)?;
            debug!("flow invariants verified");
        }
        Ok(result)
    }

    fn drive<C: Capacity>(&self, run: &mut FlowRun<C>, observer: &mut dyn StepObserver<C>) -> Result<(), FlowError> {
        match self.algorithm {
            MaxFlowAlgorithm::Labeling => Self::run_strategy(LabelingEngine::new(), run, observer),
            MaxFlowAlgorithm::EdmondsKarp => Self::run_strategy(EdmondsKarp::new(), run, observer),
        }
    }

    fn run_strategy<C: Capacity, S: FlowStrategy<C>>(
        mut strategy: S,
        run: &mut FlowRun<C>,
        observer: &mut dyn StepObserver<C>,
    ) -> Result<(), FlowError> {
        debug!("running {} strategy", strategy.name());
        strategy.execute(run, observer)
    }
}

impl Algorithm for MaxFlowSolver {
    fn name(&self) -> &'static str {
        match self.algorithm {
            MaxFlowAlgorithm::Labeling => "Ford-Fulkerson Labeling",
            MaxFlowAlgorithm::EdmondsKarp => "Edmonds-Karp",
        }
    }

    fn category(&self) -> &'static str {
        "max_flow"
    }

    fn description(&self) -> String {
        match self.algorithm {
            MaxFlowAlgorithm::Labeling => "Ford-Fulkerson labeling method: depth-first search over \
                residual capacities, widest arc first, with backtracking out of dead ends."
                .to_string(),
            MaxFlowAlgorithm::EdmondsKarp => "Edmonds-Karp: breadth-first shortest augmenting paths \
                over residual capacities."
                .to_string(),
        }
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        vec![
            AlgorithmParameter {
                name: "algorithm".to_string(),
                value: self.algorithm.to_string(),
                value_type: ParameterType::Enum(
                    MaxFlowAlgorithm::ALL.iter().map(|a| a.to_string()).collect(),
                ),
            },
            AlgorithmParameter {
                name: "verify".to_string(),
                value: self.verify.to_string(),
                value_type: ParameterType::Boolean,
            },
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), FlowError> {
        match name {
            "algorithm" => {
                self.algorithm = value.parse()?;
                Ok(())
            }
            "verify" => {
                self.verify = value.parse::<bool>().map_err(|_| FlowError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("expected true or false, got '{value}'"),
                })?;
                Ok(())
            }
            _ => Err(FlowError::InvalidParameter {
                name: name.to_string(),
                reason: "unknown parameter".to_string(),
            }),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "algorithm" => Some(self.algorithm.to_string()),
            "verify" => Some(self.verify.to_string()),
            _ => None,
        }
    }
}
