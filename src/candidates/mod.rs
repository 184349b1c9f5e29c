//! Candidate generation: propose triples for a target relation that are not
//! yet in the observed graph.
//!
//! [`generate_candidates`] validates its parameters eagerly and returns a lazy,
//! finite [`Candidates`] iterator of [`CandidateBatch`]es. Every batch is
//! locked to the target relation, disjoint from the observed graph, and free
//! of self-loops.
//!
//! Exhaustive generation yields one batch per subject so that only one
//! subject's worth of candidates is materialised at a time. The sampling
//! strategies draw their entities up front from the caller's random source
//! and yield a single batch.

pub mod strategy;

use std::iter::FusedIterator;

use rand::seq::SliceRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::CandidateError;
use crate::graph::metrics::{self, EntityMetricTable};
use crate::graph::setdiff::difference_from_graph;
use crate::graph::{KnowledgeGraph, Triple};

pub use strategy::{CandidateParams, MaxCandidates, Strategy};

/// Result type for candidate generation.
pub type CandidateResult<T> = std::result::Result<T, CandidateError>;

/// Candidate triples generated for one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBatch {
    relation: String,
    triples: Vec<Triple>,
}

impl CandidateBatch {
    /// Wrap already-filtered triples. Callers uphold the batch invariants.
    pub(crate) fn from_parts(relation: impl Into<String>, triples: Vec<Triple>) -> Self {
        Self {
            relation: relation.into(),
            triples,
        }
    }

    /// The target relation every triple in this batch carries.
    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }
}

impl<'a> IntoIterator for &'a CandidateBatch {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

/// Entities drawn by a sampling strategy.
#[derive(Debug, Clone)]
struct Sample {
    subjects: Vec<String>,
    objects: Vec<String>,
}

enum Plan {
    /// One batch per remaining subject.
    PerSubject {
        subjects: std::vec::IntoIter<String>,
        objects: Vec<String>,
    },
    /// A single batch over a pre-drawn sample.
    Single { sample: Sample, done: bool },
}

/// Lazy, finite sequence of candidate batches for one relation.
pub struct Candidates<'g> {
    graph: &'g KnowledgeGraph,
    relation: String,
    plan: Plan,
}

impl<'g> Candidates<'g> {
    /// The target relation.
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Subjects and objects drawn by a sampling strategy.
    ///
    /// `None` for exhaustive generation.
    pub fn sampled_entities(&self) -> Option<(&[String], &[String])> {
        match &self.plan {
            Plan::Single { sample, .. } => Some((&sample.subjects, &sample.objects)),
            Plan::PerSubject { .. } => None,
        }
    }
}

impl Iterator for Candidates<'_> {
    type Item = CandidateBatch;

    fn next(&mut self) -> Option<CandidateBatch> {
        let Self {
            graph,
            relation,
            plan,
        } = self;
        match plan {
            Plan::PerSubject { subjects, objects } => {
                let subject = subjects.next()?;
                Some(build_batch(
                    graph,
                    relation,
                    std::slice::from_ref(&subject),
                    objects,
                ))
            }
            Plan::Single { sample, done } => {
                if *done {
                    return None;
                }
                *done = true;
                Some(build_batch(
                    graph,
                    relation,
                    &sample.subjects,
                    &sample.objects,
                ))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match &self.plan {
            Plan::PerSubject { subjects, .. } => subjects.len(),
            Plan::Single { done, .. } => usize::from(!*done),
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Candidates<'_> {}

impl FusedIterator for Candidates<'_> {}

impl std::fmt::Debug for Candidates<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidates")
            .field("relation", &self.relation)
            .field("remaining", &self.len())
            .finish()
    }
}

/// Cross product of subjects × {relation} × objects, minus observed triples
/// and self-loops.
fn build_batch(
    graph: &KnowledgeGraph,
    relation: &str,
    subjects: &[String],
    objects: &[String],
) -> CandidateBatch {
    let raw: Vec<Triple> = subjects
        .iter()
        .flat_map(|s| {
            objects
                .iter()
                .map(move |o| Triple::new(s.clone(), relation, o.clone()))
        })
        .collect();

    let triples: Vec<Triple> = difference_from_graph(raw, graph)
        .into_iter()
        .filter(|t| !t.is_self_loop())
        .collect();

    tracing::debug!(relation, count = triples.len(), "built candidate batch");

    CandidateBatch::from_parts(relation, triples)
}

/// Generate candidate triples for `target_relation`.
///
/// Parameters are validated before any generation work. A target relation
/// that never occurs in `graph` is legal and only logged as a warning.
pub fn generate_candidates<'g, R>(
    graph: &'g KnowledgeGraph,
    params: &CandidateParams,
    target_relation: &str,
    rng: &mut R,
) -> CandidateResult<Candidates<'g>>
where
    R: Rng + ?Sized,
{
    let cap = params.max_candidates.resolve(graph.len())?;

    if !graph.has_relation(target_relation) {
        tracing::warn!(
            relation = target_relation,
            "target relation is not found in triples"
        );
    }

    let (subject_pool, object_pool) = if params.consolidate_sides {
        let entities = graph.entities();
        (entities.clone(), entities)
    } else {
        (graph.subjects(), graph.objects())
    };

    tracing::info!(
        strategy = %params.strategy,
        relation = target_relation,
        cap,
        "generating candidates"
    );

    let sample_size = (cap as f64).sqrt().floor() as usize;

    let plan = match params.strategy {
        Strategy::Exhaustive => Plan::PerSubject {
            subjects: subject_pool.into_iter(),
            objects: object_pool,
        },
        Strategy::RandomUniform => Plan::Single {
            sample: Sample {
                subjects: sample_without_replacement(&subject_pool, sample_size, rng),
                objects: sample_without_replacement(&object_pool, sample_size, rng),
            },
            done: false,
        },
        Strategy::EntityFrequency => {
            let scored = graph
                .entity_frequencies()
                .into_iter()
                .map(|(entity, count)| (entity, count as f64))
                .collect();
            lowest_scoring_plan(scored, cap, sample_size, rng)
        }
        Strategy::GraphMetric(metric) => {
            let scored = metrics::compute_metric(graph, metric);
            lowest_scoring_plan(scored, cap, sample_size, rng)
        }
    };

    Ok(Candidates {
        graph,
        relation: target_relation.to_string(),
        plan,
    })
}

/// [`generate_candidates`] with a fresh random source seeded from `seed`.
///
/// Identical inputs and seed always produce identical batches.
pub fn generate_candidates_seeded<'g>(
    graph: &'g KnowledgeGraph,
    params: &CandidateParams,
    target_relation: &str,
    seed: u64,
) -> CandidateResult<Candidates<'g>> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_candidates(graph, params, target_relation, &mut rng)
}

/// Restrict to the `cap` lowest-scoring entities, then sample both sides
/// independently from that pool.
fn lowest_scoring_plan<R>(
    mut scored: EntityMetricTable,
    cap: usize,
    sample_size: usize,
    rng: &mut R,
) -> Plan
where
    R: Rng + ?Sized,
{
    // Stable: ties keep their table order.
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    let pool: Vec<String> = scored
        .into_iter()
        .take(cap)
        .map(|(entity, _)| entity)
        .collect();

    Plan::Single {
        sample: Sample {
            subjects: sample_without_replacement(&pool, sample_size, rng),
            objects: sample_without_replacement(&pool, sample_size, rng),
        },
        done: false,
    }
}

fn sample_without_replacement<R>(pool: &[String], amount: usize, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
{
    if amount > pool.len() {
        tracing::debug!(
            requested = amount,
            available = pool.len(),
            "sample size exceeds entity pool, clamping"
        );
    }
    pool.choose_multiple(rng, amount.min(pool.len()))
        .cloned()
        .collect()
}
