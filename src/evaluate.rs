//! Ranking evaluation of candidate triples against corruptions.
//!
//! # Rank layout
//!
//! For `n` candidates an evaluator returns `2n` ranks: entries `[0, n)` rank
//! each candidate against subject corruptions `(?, r, o)`, entries `[n, 2n)`
//! against object corruptions `(s, r, ?)`, both in candidate order. Discovery
//! relies on this layout to pair the two sides.
//!
//! # Filtered ranking
//!
//! Corruptions that appear in the filter graph are true facts, not negatives,
//! and are skipped. A rank is `1 + #{corruptions scoring >= the candidate}`,
//! so ties count against the candidate.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::EvaluationError;
use crate::graph::{KnowledgeGraph, Triple};
use crate::model::TripleScorer;

/// Result type for evaluation.
pub type EvaluationResult<T> = std::result::Result<T, EvaluationError>;

/// Everything an evaluator needs besides the candidates and the model.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    /// Known true triples, excluded from the negatives.
    pub filter_triples: &'a KnowledgeGraph,
    /// Entities used to build corruptions. `None` means every model entity.
    pub corruption_entities: Option<&'a [String]>,
    /// Upper bound on corruption entities per side.
    pub max_negatives: usize,
    /// Corrupt both subject and object (the `2n` layout). When false only
    /// object corruptions are ranked and `n` ranks are returned.
    pub both_sides: bool,
    /// Emit per-candidate progress events.
    pub verbose: bool,
    /// Seed for negative sub-sampling.
    pub seed: u64,
}

impl<'a> EvaluationRequest<'a> {
    /// Two-sided request with no corruption subset and 100 negatives.
    pub fn new(filter_triples: &'a KnowledgeGraph) -> Self {
        Self {
            filter_triples,
            corruption_entities: None,
            max_negatives: 100,
            both_sides: true,
            verbose: false,
            seed: 0,
        }
    }
}

/// Ranks candidate triples.
pub trait Evaluator<M: ?Sized> {
    fn evaluate(
        &self,
        candidates: &[Triple],
        model: &M,
        request: &EvaluationRequest<'_>,
    ) -> EvaluationResult<Vec<f64>>;
}

impl<M, F> Evaluator<M> for F
where
    M: ?Sized,
    F: Fn(&[Triple], &M, &EvaluationRequest<'_>) -> EvaluationResult<Vec<f64>>,
{
    fn evaluate(
        &self,
        candidates: &[Triple],
        model: &M,
        request: &EvaluationRequest<'_>,
    ) -> EvaluationResult<Vec<f64>> {
        self(candidates, model, request)
    }
}

/// Reference evaluator: filtered ranking against entity corruptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorruptionEvaluator;

#[derive(Clone, Copy)]
enum Side {
    Subject,
    Object,
}

impl CorruptionEvaluator {
    fn corruption_pool<M>(model: &M, request: &EvaluationRequest<'_>) -> Vec<String>
    where
        M: TripleScorer + ?Sized,
    {
        let pool: Vec<String> = match request.corruption_entities {
            Some(entities) => entities
                .iter()
                .filter(|e| model.has_entity(e))
                .cloned()
                .collect(),
            None => model.entities().to_vec(),
        };
        if pool.len() <= request.max_negatives {
            return pool;
        }
        let mut rng = StdRng::seed_from_u64(request.seed);
        pool.choose_multiple(&mut rng, request.max_negatives)
            .cloned()
            .collect()
    }

    fn rank<M>(
        model: &M,
        candidate: &Triple,
        side: Side,
        pool: &[String],
        filter: &HashSet<&Triple>,
    ) -> EvaluationResult<f64>
    where
        M: TripleScorer + ?Sized,
    {
        let positive = model.score(candidate)?;
        let mut above = 0usize;
        for entity in pool {
            let corruption = match side {
                Side::Subject if *entity != candidate.subject => Triple::new(
                    entity.as_str(),
                    candidate.relation.as_str(),
                    candidate.object.as_str(),
                ),
                Side::Object if *entity != candidate.object => Triple::new(
                    candidate.subject.as_str(),
                    candidate.relation.as_str(),
                    entity.as_str(),
                ),
                _ => continue,
            };
            if filter.contains(&corruption) {
                continue;
            }
            if model.score(&corruption)? >= positive {
                above += 1;
            }
        }
        Ok((above + 1) as f64)
    }
}

impl<M> Evaluator<M> for CorruptionEvaluator
where
    M: TripleScorer + ?Sized,
{
    fn evaluate(
        &self,
        candidates: &[Triple],
        model: &M,
        request: &EvaluationRequest<'_>,
    ) -> EvaluationResult<Vec<f64>> {
        let pool = Self::corruption_pool(model, request);
        let filter: HashSet<&Triple> = request.filter_triples.iter().collect();

        let sides: &[Side] = if request.both_sides {
            &[Side::Subject, Side::Object]
        } else {
            &[Side::Object]
        };

        let mut ranks = Vec::with_capacity(candidates.len() * sides.len());
        for &side in sides {
            for candidate in candidates {
                let rank = Self::rank(model, candidate, side, &pool, &filter)?;
                if request.verbose {
                    tracing::debug!(%candidate, rank, "ranked candidate");
                }
                ranks.push(rank);
            }
        }
        Ok(ranks)
    }
}

/// Standard link-prediction summary over a set of ranks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankMetrics {
    /// Mean rank.
    pub mr: f64,
    /// Mean reciprocal rank.
    pub mrr: f64,
    pub hits_at_1: f64,
    pub hits_at_3: f64,
    pub hits_at_10: f64,
    /// Number of ranks summarised.
    pub count: usize,
}

impl RankMetrics {
    pub fn from_ranks(ranks: &[f64]) -> Self {
        if ranks.is_empty() {
            return Self::default();
        }
        let n = ranks.len() as f64;
        let hits = |k: f64| ranks.iter().filter(|&&r| r <= k).count() as f64 / n;
        Self {
            mr: ranks.iter().sum::<f64>() / n,
            mrr: ranks.iter().map(|r| 1.0 / r).sum::<f64>() / n,
            hits_at_1: hits(1.0),
            hits_at_3: hits(3.0),
            hits_at_10: hits(10.0),
            count: ranks.len(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "MRR: {:.4} | MR: {:.1} | H@1: {:.3} | H@3: {:.3} | H@10: {:.3} (n={})",
            self.mrr, self.mr, self.hits_at_1, self.hits_at_3, self.hits_at_10, self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransE;

    /// Entities on a line; relation "next" moves one step right.
    fn line_model() -> TransE {
        TransE::builder(1)
            .with_entity("a", vec![0.0])
            .unwrap()
            .with_entity("b", vec![1.0])
            .unwrap()
            .with_entity("c", vec![2.0])
            .unwrap()
            .with_entity("d", vec![3.0])
            .unwrap()
            .with_relation("next", vec![1.0])
            .unwrap()
            .build()
    }

    #[test]
    fn two_sided_layout() {
        let model = line_model();
        let kg = KnowledgeGraph::new();
        let candidates = [Triple::new("a", "next", "b"), Triple::new("a", "next", "d")];
        let ranks = CorruptionEvaluator
            .evaluate(&candidates, &model, &EvaluationRequest::new(&kg))
            .unwrap();
        assert_eq!(ranks.len(), 4);
        // (a, next, b) is a perfect translation on both sides.
        assert_eq!(ranks[0], 1.0);
        assert_eq!(ranks[2], 1.0);
        // (a, next, d): subject corruption (c, next, d) is perfect, so is (a, next, b)
        // on the object side.
        assert!(ranks[1] > 1.0);
        assert!(ranks[3] > 1.0);
    }

    #[test]
    fn known_facts_are_not_negatives() {
        let model = line_model();
        let candidate = [Triple::new("a", "next", "c")];
        let unfiltered = KnowledgeGraph::new();
        let raw = CorruptionEvaluator
            .evaluate(&candidate, &model, &EvaluationRequest::new(&unfiltered))
            .unwrap();

        let known = KnowledgeGraph::from_triples([("a", "next", "b")]);
        let filtered = CorruptionEvaluator
            .evaluate(&candidate, &model, &EvaluationRequest::new(&known))
            .unwrap();
        // Object side: (a, next, b) outranks the candidate unless filtered.
        assert_eq!(filtered[1], raw[1] - 1.0);
    }

    #[test]
    fn one_sided_returns_object_ranks_only() {
        let model = line_model();
        let kg = KnowledgeGraph::new();
        let request = EvaluationRequest {
            both_sides: false,
            ..EvaluationRequest::new(&kg)
        };
        let ranks = CorruptionEvaluator
            .evaluate(&[Triple::new("a", "next", "b")], &model, &request)
            .unwrap();
        assert_eq!(ranks, vec![1.0]);
    }

    #[test]
    fn max_negatives_bounds_the_rank() {
        let model = line_model();
        let kg = KnowledgeGraph::new();
        let request = EvaluationRequest {
            max_negatives: 1,
            ..EvaluationRequest::new(&kg)
        };
        let ranks = CorruptionEvaluator
            .evaluate(&[Triple::new("d", "next", "a")], &model, &request)
            .unwrap();
        assert!(ranks.iter().all(|&r| r <= 2.0));
    }

    #[test]
    fn corruption_subset_restricts_negatives() {
        let model = line_model();
        let kg = KnowledgeGraph::new();
        let subset = vec!["a".to_string()];
        let request = EvaluationRequest {
            corruption_entities: Some(&subset),
            ..EvaluationRequest::new(&kg)
        };
        // Only 'a' corrupts; it equals the subject so the subject side has no negatives.
        let ranks = CorruptionEvaluator
            .evaluate(&[Triple::new("a", "next", "d")], &model, &request)
            .unwrap();
        assert_eq!(ranks[0], 1.0);
    }

    #[test]
    fn closures_are_evaluators() {
        let kg = KnowledgeGraph::new();
        let fixed = |c: &[Triple], _: &TransE, _: &EvaluationRequest| -> EvaluationResult<Vec<f64>> {
            Ok(vec![7.0; c.len() * 2])
        };
        let ranks = fixed
            .evaluate(&[Triple::new("a", "next", "b")], &line_model(), &EvaluationRequest::new(&kg))
            .unwrap();
        assert_eq!(ranks, vec![7.0, 7.0]);
    }

    #[test]
    fn rank_metrics_summary() {
        let m = RankMetrics::from_ranks(&[1.0, 2.0, 4.0, 20.0]);
        assert_eq!(m.count, 4);
        assert!((m.mr - 6.75).abs() < 1e-12);
        assert!((m.hits_at_1 - 0.25).abs() < 1e-12);
        assert!((m.hits_at_3 - 0.5).abs() < 1e-12);
        assert!((m.hits_at_10 - 0.75).abs() < 1e-12);
        assert!(m.summary().contains("n=4"));
        assert_eq!(RankMetrics::from_ranks(&[]), RankMetrics::default());
    }
}
