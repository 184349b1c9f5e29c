//! In-memory knowledge graph with hashed membership.
//!
//! Keeps the triples in input order (duplicates included) alongside a
//! `HashSet` so that membership checks during candidate filtering are O(1).

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::Triple;

/// An observed knowledge graph.
///
/// Duplicates are permitted in the triple list but the graph behaves as a set
/// for [`contains`](Self::contains).
#[derive(Clone, Default)]
pub struct KnowledgeGraph {
    /// Triples in insertion order.
    triples: Vec<Triple>,
    /// Distinct triples for membership tests.
    members: HashSet<Triple>,
}

impl KnowledgeGraph {
    /// Create a new empty knowledge graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from any sequence of triples.
    pub fn from_triples<I, T>(triples: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Triple>,
    {
        triples.into_iter().map(Into::into).collect()
    }

    /// Append a triple.
    pub fn insert(&mut self, triple: Triple) {
        self.members.insert(triple.clone());
        self.triples.push(triple);
    }

    /// Number of triples, duplicates included.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// All triples in insertion order.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    /// Exact three-field membership test.
    pub fn contains(&self, triple: &Triple) -> bool {
        self.members.contains(triple)
    }

    /// Distinct relations, sorted.
    pub fn relations(&self) -> Vec<String> {
        distinct(self.triples.iter().map(|t| &t.relation))
    }

    /// Whether any triple uses the given relation.
    pub fn has_relation(&self, relation: &str) -> bool {
        self.triples.iter().any(|t| t.relation == relation)
    }

    /// Distinct subjects, sorted.
    pub fn subjects(&self) -> Vec<String> {
        distinct(self.triples.iter().map(|t| &t.subject))
    }

    /// Distinct objects, sorted.
    pub fn objects(&self) -> Vec<String> {
        distinct(self.triples.iter().map(|t| &t.object))
    }

    /// Distinct entities appearing as subject or object, sorted.
    pub fn entities(&self) -> Vec<String> {
        distinct(
            self.triples
                .iter()
                .flat_map(|t| [&t.subject, &t.object]),
        )
    }

    /// Occurrence count of every entity as subject or object, sorted by entity.
    ///
    /// A self-loop triple counts its entity twice.
    pub fn entity_frequencies(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for t in &self.triples {
            *counts.entry(&t.subject).or_default() += 1;
            *counts.entry(&t.object).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(entity, count)| (entity.to_string(), count))
            .collect()
    }

    /// Keep only the triples matching the predicate, preserving order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Triple) -> bool,
    {
        self.triples.retain(|t| keep(t));
        self.members = self.triples.iter().cloned().collect();
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

impl FromIterator<Triple> for KnowledgeGraph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut kg = Self::new();
        kg.extend(iter);
        kg
    }
}

impl Extend<Triple> for KnowledgeGraph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl<'a> IntoIterator for &'a KnowledgeGraph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl std::fmt::Debug for KnowledgeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeGraph")
            .field("triples", &self.len())
            .field("distinct", &self.members.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KnowledgeGraph {
        KnowledgeGraph::from_triples([
            ("a", "y", "b"),
            ("b", "y", "a"),
            ("a", "y", "c"),
            ("c", "y", "a"),
            ("a", "y", "d"),
            ("c", "y", "d"),
            ("b", "y", "c"),
            ("f", "y", "e"),
        ])
    }

    #[test]
    fn insert_and_contains() {
        let kg = sample();
        assert_eq!(kg.len(), 8);
        assert!(kg.contains(&Triple::new("a", "y", "b")));
        assert!(!kg.contains(&Triple::new("a", "y", "e")));
    }

    #[test]
    fn duplicates_are_kept_in_order_but_membership_is_a_set() {
        let mut kg = KnowledgeGraph::new();
        kg.insert(Triple::new("a", "r", "b"));
        kg.insert(Triple::new("a", "r", "b"));
        assert_eq!(kg.len(), 2);
        assert!(kg.contains(&Triple::new("a", "r", "b")));
    }

    #[test]
    fn entity_pools() {
        let kg = sample();
        assert_eq!(kg.subjects(), vec!["a", "b", "c", "f"]);
        assert_eq!(kg.objects(), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(kg.entities(), vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(kg.relations(), vec!["y"]);
    }

    #[test]
    fn frequencies_count_both_sides() {
        let kg = sample();
        let freq: BTreeMap<_, _> = kg.entity_frequencies().into_iter().collect();
        assert_eq!(freq["a"], 5);
        assert_eq!(freq["e"], 1);
        assert_eq!(freq["f"], 1);
    }

    #[test]
    fn retain_rebuilds_membership() {
        let mut kg = sample();
        kg.retain(|t| t.subject != "f");
        assert_eq!(kg.len(), 7);
        assert!(!kg.contains(&Triple::new("f", "y", "e")));
    }

    #[test]
    fn empty_graph() {
        let kg = KnowledgeGraph::new();
        assert!(kg.is_empty());
        assert!(kg.entities().is_empty());
        assert!(!kg.has_relation("y"));
    }
}
