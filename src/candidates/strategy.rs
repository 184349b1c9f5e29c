//! Candidate generation parameters: strategy selection and the candidate cap.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CandidateError;
use crate::graph::metrics::GraphMetric;

use super::CandidateResult;

/// How candidate triples are proposed for a target relation.
///
/// The four graph-metric strategies share one variant; they only differ in
/// which [`GraphMetric`] ranks the entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Strategy {
    /// Every subject × object combination, one batch per subject.
    #[default]
    Exhaustive,
    /// Uniform sample of subjects and objects.
    RandomUniform,
    /// Sample among the least frequent entities.
    EntityFrequency,
    /// Sample among the entities scoring lowest on a structural metric.
    GraphMetric(GraphMetric),
}

impl Strategy {
    /// Every recognised strategy, in documentation order.
    pub const ALL: [Strategy; 7] = [
        Strategy::Exhaustive,
        Strategy::RandomUniform,
        Strategy::EntityFrequency,
        Strategy::GraphMetric(GraphMetric::Degree),
        Strategy::GraphMetric(GraphMetric::ClusteringCoefficient),
        Strategy::GraphMetric(GraphMetric::Triangles),
        Strategy::GraphMetric(GraphMetric::SquareClustering),
    ];

    /// The canonical name accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Exhaustive => "exhaustive",
            Strategy::RandomUniform => "random_uniform",
            Strategy::EntityFrequency => "entity_frequency",
            Strategy::GraphMetric(GraphMetric::Degree) => "graph_degree",
            Strategy::GraphMetric(GraphMetric::ClusteringCoefficient) => "cluster_coefficient",
            Strategy::GraphMetric(GraphMetric::Triangles) => "cluster_triangles",
            Strategy::GraphMetric(GraphMetric::SquareClustering) => "cluster_squares",
        }
    }

    /// Whether this strategy draws from the random source.
    pub fn is_sampled(self) -> bool {
        !matches!(self, Strategy::Exhaustive)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = CandidateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| CandidateError::InvalidStrategy {
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for Strategy {
    type Error = CandidateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.name().to_string()
    }
}

/// Upper bound on how many candidates a sampling strategy considers.
///
/// In TOML an integer is an absolute cap and a float is a fraction of the
/// graph size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxCandidates {
    /// An absolute number of candidates.
    Absolute(i64),
    /// A fraction of the number of triples in the graph.
    Fraction(f64),
}

impl Default for MaxCandidates {
    fn default() -> Self {
        MaxCandidates::Fraction(0.3)
    }
}

impl MaxCandidates {
    /// Convert to an absolute cap for a graph of `graph_len` triples.
    ///
    /// Fractions in (0, 1] scale the graph size; larger floats are truncated
    /// and used as an absolute cap.
    pub fn resolve(self, graph_len: usize) -> CandidateResult<usize> {
        match self {
            MaxCandidates::Absolute(n) if n > 0 => Ok(n as usize),
            MaxCandidates::Absolute(n) => Err(CandidateError::InvalidParameter {
                message: format!("max_candidates must be positive, got {n}"),
            }),
            MaxCandidates::Fraction(f) if !f.is_finite() || f <= 0.0 => {
                Err(CandidateError::InvalidParameter {
                    message: format!("max_candidates must be a positive finite number, got {f}"),
                })
            }
            MaxCandidates::Fraction(f) if f <= 1.0 => Ok((f * graph_len as f64).floor() as usize),
            MaxCandidates::Fraction(f) => Ok(f.floor() as usize),
        }
    }
}

impl From<usize> for MaxCandidates {
    fn from(n: usize) -> Self {
        MaxCandidates::Absolute(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MaxCandidates {
    fn from(f: f64) -> Self {
        MaxCandidates::Fraction(f)
    }
}

/// Parameters for one candidate generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateParams {
    /// Generation strategy.
    pub strategy: Strategy,
    /// Candidate cap for sampling strategies. Ignored by exhaustive generation.
    pub max_candidates: MaxCandidates,
    /// Use the union of subjects and objects as both entity pools.
    pub consolidate_sides: bool,
}

impl CandidateParams {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: impl Into<MaxCandidates>) -> Self {
        self.max_candidates = max_candidates.into();
        self
    }

    pub fn with_consolidated_sides(mut self, consolidate: bool) -> Self {
        self.consolidate_sides = consolidate;
        self
    }
}
