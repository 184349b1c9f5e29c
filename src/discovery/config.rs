//! Discovery configuration.
//!
//! Every knob of a discovery run lives in [`DiscoveryConfig`]. It can be built
//! in code with the `with_*` setters or loaded from TOML:
//!
//! ```toml
//! top_n = 10
//! strategy = "graph_degree"
//! max_candidates = 500      # integer: absolute cap
//! # max_candidates = 0.3    # float in (0, 1]: fraction of the graph
//! target_relation = "locatedIn"
//! max_negatives = 100
//! seed = 0
//! consolidate_sides = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::candidates::{CandidateParams, MaxCandidates, Strategy};
use crate::error::ConfigError;

/// Result type for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Parameters of one discovery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Rank cutoff for accepting a candidate.
    pub top_n: usize,
    /// Candidate generation strategy.
    pub strategy: Strategy,
    /// Candidate cap for sampling strategies.
    pub max_candidates: MaxCandidates,
    /// Restrict discovery to one relation. `None` processes every relation
    /// the model knows.
    pub target_relation: Option<String>,
    /// Entities used to build corruptions during ranking.
    pub corruption_entities: Option<Vec<String>>,
    /// Maximum corruptions per side during ranking.
    pub max_negatives: usize,
    /// Seed for every random draw of the run.
    pub seed: u64,
    /// Use the union of subjects and objects as both entity pools.
    pub consolidate_sides: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            strategy: Strategy::Exhaustive,
            max_candidates: MaxCandidates::default(),
            target_relation: None,
            corruption_entities: None,
            max_negatives: 100,
            seed: 0,
            consolidate_sides: false,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: impl Into<MaxCandidates>) -> Self {
        self.max_candidates = max_candidates.into();
        self
    }

    pub fn with_target_relation(mut self, relation: impl Into<String>) -> Self {
        self.target_relation = Some(relation.into());
        self
    }

    pub fn with_corruption_entities(mut self, entities: Vec<String>) -> Self {
        self.corruption_entities = Some(entities);
        self
    }

    pub fn with_max_negatives(mut self, max_negatives: usize) -> Self {
        self.max_negatives = max_negatives;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_consolidated_sides(mut self, consolidate: bool) -> Self {
        self.consolidate_sides = consolidate;
        self
    }

    /// The candidate-generation subset of this config.
    pub fn candidate_params(&self) -> CandidateParams {
        CandidateParams {
            strategy: self.strategy,
            max_candidates: self.max_candidates,
            consolidate_sides: self.consolidate_sides,
        }
    }

    /// Parse from a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(toml_str: &str) -> ConfigResult<Self> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }
}
