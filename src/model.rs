//! Scoring model boundary.
//!
//! Discovery never trains or mutates a model; it only asks whether the model is
//! fitted, which entities and relations it knows, and for embeddings or
//! scores. [`ScoringModel`] is that read-only surface. [`TransE`] is a small
//! reference implementation over caller-supplied embedding tables.

use std::collections::{HashMap, HashSet};

use crate::error::ModelError;
use crate::graph::{KnowledgeGraph, Triple};

/// Result type for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Which embedding table to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingKind {
    Entity,
    Relation,
}

/// A fitted link-prediction model, seen read-only.
pub trait ScoringModel {
    /// Whether the model has been trained.
    fn is_fitted(&self) -> bool;

    /// Whether the model was trained on exactly this graph.
    fn is_fitted_on(&self, graph: &KnowledgeGraph) -> bool;

    /// Known relations in index order.
    fn relations(&self) -> &[String];

    /// Known entities in index order.
    fn entities(&self) -> &[String];

    /// Integer index of a relation, if known.
    fn relation_index(&self, relation: &str) -> Option<usize> {
        self.relations().iter().position(|r| r == relation)
    }

    fn has_entity(&self, entity: &str) -> bool {
        self.entities().iter().any(|e| e == entity)
    }

    fn has_relation(&self, relation: &str) -> bool {
        self.relation_index(relation).is_some()
    }

    /// Embedding vectors for the given ids, one row per id.
    fn get_embeddings(&self, ids: &[&str], kind: EmbeddingKind) -> ModelResult<Vec<Vec<f32>>>;
}

/// A model that can score individual triples. Higher is more plausible.
pub trait TripleScorer: ScoringModel {
    fn score(&self, triple: &Triple) -> ModelResult<f32>;
}

/// Drop triples that reference an entity or relation the model never saw.
pub fn filter_unseen_entities<M>(graph: &KnowledgeGraph, model: &M) -> KnowledgeGraph
where
    M: ScoringModel + ?Sized,
{
    let entities: HashSet<&str> = model.entities().iter().map(String::as_str).collect();
    let relations: HashSet<&str> = model.relations().iter().map(String::as_str).collect();

    let filtered: KnowledgeGraph = graph
        .iter()
        .filter(|t| {
            entities.contains(t.subject.as_str())
                && entities.contains(t.object.as_str())
                && relations.contains(t.relation.as_str())
        })
        .cloned()
        .collect();

    let dropped = graph.len() - filtered.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = filtered.len(), "filtered unseen entities");
    }
    filtered
}

/// Translational embedding model: `score(s, r, o) = -‖s + r − o‖₂`.
///
/// Embeddings are supplied by the caller; this type does not train.
#[derive(Debug, Clone)]
pub struct TransE {
    dim: usize,
    entities: Vec<String>,
    relations: Vec<String>,
    entity_vectors: HashMap<String, Vec<f32>>,
    relation_vectors: HashMap<String, Vec<f32>>,
    fitted_on: Option<HashSet<Triple>>,
}

impl TransE {
    /// Start an empty model with the given embedding dimension.
    pub fn builder(dim: usize) -> TransEBuilder {
        TransEBuilder {
            dim,
            model: TransE {
                dim,
                entities: Vec::new(),
                relations: Vec::new(),
                entity_vectors: HashMap::new(),
                relation_vectors: HashMap::new(),
                fitted_on: None,
            },
        }
    }

    /// Embedding dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    fn vector(&self, id: &str, kind: EmbeddingKind) -> ModelResult<&[f32]> {
        match kind {
            EmbeddingKind::Entity => self
                .entity_vectors
                .get(id)
                .map(Vec::as_slice)
                .ok_or_else(|| ModelError::UnknownEntity {
                    entity: id.to_string(),
                }),
            EmbeddingKind::Relation => self
                .relation_vectors
                .get(id)
                .map(Vec::as_slice)
                .ok_or_else(|| ModelError::UnknownRelation {
                    relation: id.to_string(),
                }),
        }
    }
}

/// Builder for [`TransE`]. Entities and relations keep insertion order.
#[derive(Debug, Clone)]
pub struct TransEBuilder {
    dim: usize,
    model: TransE,
}

impl TransEBuilder {
    pub fn with_entity(mut self, id: impl Into<String>, vector: Vec<f32>) -> ModelResult<Self> {
        self.check_dim(&vector)?;
        let id = id.into();
        if self.model.entity_vectors.insert(id.clone(), vector).is_none() {
            self.model.entities.push(id);
        }
        Ok(self)
    }

    pub fn with_relation(mut self, id: impl Into<String>, vector: Vec<f32>) -> ModelResult<Self> {
        self.check_dim(&vector)?;
        let id = id.into();
        if self.model.relation_vectors.insert(id.clone(), vector).is_none() {
            self.model.relations.push(id);
        }
        Ok(self)
    }

    /// Record the graph the embeddings were trained on.
    pub fn fitted_on(mut self, graph: &KnowledgeGraph) -> Self {
        self.model.fitted_on = Some(graph.iter().cloned().collect());
        self
    }

    /// Finish the model. It reports itself fitted once it has at least one
    /// entity and one relation.
    pub fn build(self) -> TransE {
        self.model
    }

    fn check_dim(&self, vector: &[f32]) -> ModelResult<()> {
        if vector.len() != self.dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

impl ScoringModel for TransE {
    fn is_fitted(&self) -> bool {
        !self.entities.is_empty() && !self.relations.is_empty()
    }

    fn is_fitted_on(&self, graph: &KnowledgeGraph) -> bool {
        match &self.fitted_on {
            Some(seen) => {
                let current: HashSet<&Triple> = graph.iter().collect();
                current.len() == seen.len() && current.iter().all(|t| seen.contains(*t))
            }
            None => false,
        }
    }

    fn relations(&self) -> &[String] {
        &self.relations
    }

    fn entities(&self) -> &[String] {
        &self.entities
    }

    fn has_entity(&self, entity: &str) -> bool {
        self.entity_vectors.contains_key(entity)
    }

    fn has_relation(&self, relation: &str) -> bool {
        self.relation_vectors.contains_key(relation)
    }

    fn get_embeddings(&self, ids: &[&str], kind: EmbeddingKind) -> ModelResult<Vec<Vec<f32>>> {
        ids.iter()
            .map(|id| self.vector(id, kind).map(<[f32]>::to_vec))
            .collect()
    }
}

impl TripleScorer for TransE {
    fn score(&self, triple: &Triple) -> ModelResult<f32> {
        let s = self.vector(&triple.subject, EmbeddingKind::Entity)?;
        let r = self.vector(&triple.relation, EmbeddingKind::Relation)?;
        let o = self.vector(&triple.object, EmbeddingKind::Entity)?;
        let sq: f32 = s
            .iter()
            .zip(r)
            .zip(o)
            .map(|((s, r), o)| {
                let d = s + r - o;
                d * d
            })
            .sum();
        Ok(-sq.sqrt())
    }
}
