//! Knowledge graph data model: triples, the observed graph, and graph utilities.
//!
//! - [`Triple`]: an immutable (subject, relation, object) statement
//! - [`KnowledgeGraph`]: ordered triples with hashed membership
//! - [`setdiff`]: composite three-field set difference
//! - [`metrics`]: structural per-entity scores on a relation-collapsed graph

pub mod index;
pub mod metrics;
pub mod setdiff;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use index::KnowledgeGraph;

/// A triple (subject, relation, object) in the knowledge graph.
///
/// Identifiers are opaque. Identity is structural: two triples are equal when
/// all three fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    /// The subject entity.
    pub subject: String,
    /// The relation type.
    pub relation: String,
    /// The object entity.
    pub object: String,
}

impl Triple {
    /// Create a new triple.
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }

    /// Whether subject and object are the same entity.
    pub fn is_self_loop(&self) -> bool {
        self.subject == self.object
    }
}

impl<S, R, O> From<(S, R, O)> for Triple
where
    S: Into<String>,
    R: Into<String>,
    O: Into<String>,
{
    fn from((subject, relation, object): (S, R, O)) -> Self {
        Self::new(subject, relation, object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.relation, self.object)
    }
}
