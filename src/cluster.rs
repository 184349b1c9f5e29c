//! Link-based cluster analysis of triples.
//!
//! Each triple becomes one feature row `[subject | relation | object]` built
//! from the model's embeddings, and a pluggable [`ClusteringAlgorithm`]
//! assigns every row to exactly one cluster.

use std::collections::{HashSet, VecDeque};

use crate::error::ClusterError;
use crate::graph::Triple;
use crate::model::{EmbeddingKind, ScoringModel};

/// Result type for clustering.
pub type ClusterResult<T> = std::result::Result<T, ClusterError>;

/// Label used for rows that belong to no cluster.
pub const NOISE: i64 = -1;

/// Anything that assigns a cluster label to each feature row.
pub trait ClusteringAlgorithm {
    fn fit_predict(&mut self, features: &[Vec<f32>]) -> ClusterResult<Vec<i64>>;
}

/// Cluster triples by their embeddings.
///
/// - `entities_subset`: `None` uses every triple. An empty slice drops the
///   entity parts of every row (zero-filled). Otherwise only triples whose
///   subject or object is listed are clustered.
/// - `relations_subset`: likewise for the relation part and the relation.
///
/// Returns one label per clustered triple, in input order.
pub fn find_clusters<M, A>(
    triples: &[Triple],
    model: &M,
    algorithm: &mut A,
    entities_subset: Option<&[String]>,
    relations_subset: Option<&[String]>,
) -> ClusterResult<Vec<i64>>
where
    M: ScoringModel + ?Sized,
    A: ClusteringAlgorithm + ?Sized,
{
    if !model.is_fitted() {
        return Err(ClusterError::ModelNotFitted);
    }

    let subjects: Vec<&str> = triples.iter().map(|t| t.subject.as_str()).collect();
    let relations: Vec<&str> = triples.iter().map(|t| t.relation.as_str()).collect();
    let objects: Vec<&str> = triples.iter().map(|t| t.object.as_str()).collect();

    let s = model.get_embeddings(&subjects, EmbeddingKind::Entity)?;
    let p = model.get_embeddings(&relations, EmbeddingKind::Relation)?;
    let o = model.get_embeddings(&objects, EmbeddingKind::Entity)?;

    let drop_entities = entities_subset.is_some_and(<[String]>::is_empty);
    let drop_relations = relations_subset.is_some_and(<[String]>::is_empty);

    let entity_filter: Option<HashSet<&str>> = entities_subset
        .filter(|subset| !subset.is_empty())
        .map(|subset| subset.iter().map(String::as_str).collect());
    let relation_filter: Option<HashSet<&str>> = relations_subset
        .filter(|subset| !subset.is_empty())
        .map(|subset| subset.iter().map(String::as_str).collect());

    let features: Vec<Vec<f32>> = triples
        .iter()
        .enumerate()
        .filter(|(_, t)| {
            entity_filter.as_ref().is_none_or(|keep| {
                keep.contains(t.subject.as_str()) || keep.contains(t.object.as_str())
            }) && relation_filter
                .as_ref()
                .is_none_or(|keep| keep.contains(t.relation.as_str()))
        })
        .map(|(i, _)| {
            let mut row = Vec::with_capacity(s[i].len() + p[i].len() + o[i].len());
            append(&mut row, &s[i], drop_entities);
            append(&mut row, &p[i], drop_relations);
            append(&mut row, &o[i], drop_entities);
            row
        })
        .collect();

    tracing::debug!(
        rows = features.len(),
        total = triples.len(),
        "clustering triple embeddings"
    );

    algorithm.fit_predict(&features)
}

fn append(row: &mut Vec<f32>, part: &[f32], zeroed: bool) {
    if zeroed {
        row.extend(std::iter::repeat_n(0.0, part.len()));
    } else {
        row.extend_from_slice(part);
    }
}

/// Density-based clustering (DBSCAN) with Euclidean distance.
///
/// Noise rows get [`NOISE`]; clusters are numbered from 0 in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dbscan {
    /// Neighbourhood radius.
    pub eps: f32,
    /// Minimum neighbourhood size (the point included) for a core point.
    pub min_samples: usize,
}

impl Default for Dbscan {
    fn default() -> Self {
        Self {
            eps: 0.5,
            min_samples: 5,
        }
    }
}

impl Dbscan {
    pub fn new(eps: f32, min_samples: usize) -> Self {
        Self { eps, min_samples }
    }

    fn neighbours(features: &[Vec<f32>], i: usize, eps: f32) -> Vec<usize> {
        features
            .iter()
            .enumerate()
            .filter(|(_, other)| euclidean(&features[i], other) <= eps)
            .map(|(j, _)| j)
            .collect()
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

impl ClusteringAlgorithm for Dbscan {
    fn fit_predict(&mut self, features: &[Vec<f32>]) -> ClusterResult<Vec<i64>> {
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(ClusterError::InvalidParameter {
                message: format!("eps must be positive and finite, got {}", self.eps),
            });
        }
        if self.min_samples == 0 {
            return Err(ClusterError::InvalidParameter {
                message: "min_samples must be at least 1".into(),
            });
        }
        if let Some(expected) = features.first().map(Vec::len) {
            if let Some(row) = features.iter().find(|row| row.len() != expected) {
                return Err(ClusterError::RaggedFeatures {
                    expected,
                    actual: row.len(),
                });
            }
        }

        let mut labels: Vec<Option<i64>> = vec![None; features.len()];
        let mut next_cluster = 0i64;

        for i in 0..features.len() {
            if labels[i].is_some() {
                continue;
            }
            let seeds = Self::neighbours(features, i, self.eps);
            if seeds.len() < self.min_samples {
                labels[i] = Some(NOISE);
                continue;
            }

            let cluster = next_cluster;
            next_cluster += 1;
            labels[i] = Some(cluster);

            let mut queue: VecDeque<usize> = seeds.into_iter().collect();
            while let Some(j) = queue.pop_front() {
                match labels[j] {
                    // Border point previously marked as noise.
                    Some(NOISE) => labels[j] = Some(cluster),
                    Some(_) => continue,
                    None => {
                        labels[j] = Some(cluster);
                        let reach = Self::neighbours(features, j, self.eps);
                        if reach.len() >= self.min_samples {
                            queue.extend(reach);
                        }
                    }
                }
            }
        }

        Ok(labels.into_iter().map(|l| l.unwrap_or(NOISE)).collect())
    }
}
