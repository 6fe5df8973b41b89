//! Solver configuration
//!
//! Plain serde structure with defaults for every field, so an empty JSON
//! object is a valid configuration.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::max_flow::MaxFlowAlgorithm;
use crate::algorithm::traits::FlowError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Augmenting-path strategy
    pub algorithm: MaxFlowAlgorithm,
    /// Check flow invariants after every solve
    pub verify: bool,
}

impl SolverConfig {
    pub fn from_json_str(text: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SolverConfig::default());
        assert_eq!(config.algorithm, MaxFlowAlgorithm::Labeling);
        assert!(!config.verify);
    }

    #[test]
    fn test_explicit_values() {
        let config = SolverConfig::from_json_str(r#"{"algorithm": "edmonds-karp", "verify": true}"#).unwrap();
        assert_eq!(config.algorithm, MaxFlowAlgorithm::EdmondsKarp);
        assert!(config.verify);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = SolverConfig::from_json_str(r#"{"algo": "labeling"}"#).unwrap_err();
        assert!(matches!(err, FlowError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solver.json");
        fs::write(&path, r#"{"verify": true}"#).unwrap();
        assert!(SolverConfig::from_file(&path).unwrap().verify);
    }
}
