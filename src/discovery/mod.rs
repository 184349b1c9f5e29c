//! Fact discovery: generate candidates per relation, rank them with a fitted
//! model, and keep the ones that pass the rank threshold.
//!
//! # Acceptance
//!
//! Each candidate is ranked twice, against subject and against object
//! corruptions, and the two ranks are averaged. A candidate is accepted when
//! its averaged rank is **at least** `top_n`. This direction is inherited
//! behaviour and is reproduced as is, even though it reads inverted relative
//! to ordinary top-k ranking.
//!
//! # Randomness
//!
//! A single `StdRng` is seeded from [`DiscoveryConfig::seed`] at entry and
//! threaded through every relation, so a run is reproducible and independent
//! of any other run in the process.

pub mod config;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::candidates::{CandidateBatch, generate_candidates};
use crate::error::{DiscoveryError, EvaluationError};
use crate::evaluate::{EvaluationRequest, Evaluator, RankMetrics};
use crate::graph::{KnowledgeGraph, Triple};
use crate::model::{ScoringModel, filter_unseen_entities};

pub use config::DiscoveryConfig;

/// Result type for discovery.
pub type DiscoveryResult<T> = std::result::Result<T, DiscoveryError>;

/// Discover new facts in `graph` using `model` to rank candidates.
///
/// All validation happens before any candidate is generated or scored. The
/// returned triples are grouped by relation in processing order and are not
/// de-duplicated across relations.
pub fn discover_facts<M, E>(
    graph: &KnowledgeGraph,
    model: &M,
    evaluator: &E,
    config: &DiscoveryConfig,
) -> DiscoveryResult<Vec<Triple>>
where
    M: ScoringModel + ?Sized,
    E: Evaluator<M> + ?Sized,
{
    if !model.is_fitted() {
        tracing::error!("model is not fitted");
        return Err(DiscoveryError::ModelNotFitted);
    }

    if !model.is_fitted_on(graph) {
        tracing::warn!("model might not be fitted on this data");
    }

    if config.top_n == 0 {
        tracing::error!("top_n must be positive");
        return Err(DiscoveryError::InvalidParameter {
            message: "top_n must be a positive integer".into(),
        });
    }

    // Surface a malformed cap here rather than on the first relation.
    config.max_candidates.resolve(graph.len())?;

    let relations: Vec<String> = match &config.target_relation {
        Some(relation) => {
            if !model.has_relation(relation) {
                tracing::error!(relation = %relation, "target relation not found in model");
                return Err(DiscoveryError::UnknownRelation {
                    relation: relation.clone(),
                });
            }
            vec![relation.clone()]
        }
        None => {
            tracing::info!(
                "no target relation specified, using all relations to generate candidates"
            );
            model.relations().to_vec()
        }
    };

    let mut rng = StdRng::seed_from_u64(config.seed);
    let filtered = filter_unseen_entities(graph, model);
    let params = config.candidate_params();

    let request = EvaluationRequest {
        filter_triples: graph,
        corruption_entities: config.corruption_entities.as_deref(),
        max_negatives: config.max_negatives,
        both_sides: true,
        verbose: false,
        seed: config.seed,
    };

    let mut discoveries = Vec::new();
    for relation in &relations {
        tracing::debug!(relation = %relation, "generating candidates for relation");
        let before = discoveries.len();

        for batch in generate_candidates(&filtered, &params, relation, &mut rng)? {
            if batch.is_empty() {
                continue;
            }
            tracing::debug!(count = batch.len(), "generated candidate statements");

            let ranks = evaluator.evaluate(batch.triples(), model, &request)?;
            discoveries.extend(accept_candidates(batch, &ranks, config.top_n)?);
        }

        tracing::debug!(
            relation = %relation,
            accepted = discoveries.len() - before,
            "relation done"
        );
    }

    tracing::info!(count = discoveries.len(), "discovered facts");
    Ok(discoveries)
}

/// Average the subject-corruption and object-corruption rank of every
/// candidate.
///
/// `ranks` must hold exactly `2 * n` entries: `n` subject ranks followed by
/// `n` object ranks, in candidate order. Entry `i` is paired with `i + n`.
pub fn average_ranks(ranks: &[f64], n: usize) -> DiscoveryResult<Vec<f64>> {
    if ranks.len() != 2 * n {
        return Err(EvaluationError::RankLayout {
            expected: 2 * n,
            actual: ranks.len(),
        }
        .into());
    }
    let (subject_side, object_side) = ranks.split_at(n);
    Ok(subject_side
        .iter()
        .zip(object_side)
        .map(|(s, o)| (s + o) / 2.0)
        .collect())
}

/// Keep the candidates whose averaged rank is at least `top_n`.
pub fn accept_candidates(
    batch: CandidateBatch,
    ranks: &[f64],
    top_n: usize,
) -> DiscoveryResult<Vec<Triple>> {
    let averaged = average_ranks(ranks, batch.len())?;
    tracing::debug!(metrics = %RankMetrics::from_ranks(&averaged).summary(), "batch ranked");

    let threshold = top_n as f64;
    Ok(batch
        .into_triples()
        .into_iter()
        .zip(averaged)
        .filter(|(_, rank)| *rank >= threshold)
        .map(|(triple, _)| triple)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_of(triples: &[(&str, &str, &str)]) -> CandidateBatch {
        CandidateBatch::from_parts("y", triples.iter().copied().map(Triple::from).collect())
    }

    #[test]
    fn averages_pair_index_i_with_i_plus_n() {
        let avg = average_ranks(&[1.0, 2.0, 3.0, 5.0, 6.0, 7.0], 3).unwrap();
        assert_eq!(avg, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn layout_mismatch_is_an_error() {
        let err = average_ranks(&[1.0, 2.0, 3.0], 2).unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::Evaluation(EvaluationError::RankLayout {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn threshold_is_inclusive() {
        let batch = batch_of(&[("a", "y", "e"), ("f", "y", "a")]);
        let all_below = accept_candidates(batch.clone(), &[9.0, 9.0, 9.0, 9.0], 10).unwrap();
        assert!(all_below.is_empty());
        let all_at = accept_candidates(batch, &[10.0, 10.0, 10.0, 10.0], 10).unwrap();
        assert_eq!(all_at.len(), 2);
    }

    #[test]
    fn acceptance_follows_pairing() {
        let batch = batch_of(&[("a", "y", "e"), ("f", "y", "a")]);
        // Candidate 0 averages (20 + 2) / 2 = 11, candidate 1 averages (1 + 3) / 2 = 2.
        let accepted = accept_candidates(batch.clone(), &[20.0, 1.0, 2.0, 3.0], 10).unwrap();
        assert_eq!(accepted, vec![Triple::new("a", "y", "e")]);

        // Swapping halves within a side changes the pairing and the outcome.
        let swapped = accept_candidates(batch, &[1.0, 20.0, 3.0, 2.0], 10).unwrap();
        assert_eq!(swapped, vec![Triple::new("f", "y", "a")]);
    }
}
