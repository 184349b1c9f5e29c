//! Composite set difference: rows of one array that do not occur in another.
//!
//! Matching is by all fields at once, never per column. Relative order of the
//! first input is preserved, and duplicate rows in the first input that are
//! absent from the second are all kept.

use std::collections::HashSet;
use std::hash::Hash;

use crate::error::CandidateError;

use super::{KnowledgeGraph, Triple};

/// Result type for set-difference operations on raw rows.
pub type SetDiffResult<T> = std::result::Result<T, CandidateError>;

/// Rows of `a` that do not appear in `b`, by exact three-field match.
pub fn set_difference(a: &[Triple], b: &[Triple]) -> Vec<Triple> {
    let exclude: HashSet<&Triple> = b.iter().collect();
    a.iter()
        .filter(|t| !exclude.contains(t))
        .cloned()
        .collect()
}

/// Drop every candidate already present in the observed graph.
pub fn difference_from_graph(candidates: Vec<Triple>, graph: &KnowledgeGraph) -> Vec<Triple> {
    candidates
        .into_iter()
        .filter(|t| !graph.contains(t))
        .collect()
}

/// Generic row form of [`set_difference`].
///
/// Every row of both inputs must have the same column count, otherwise
/// [`CandidateError::ShapeError`] is returned. An empty input imposes no
/// column count.
pub fn set_difference_rows<T>(a: &[Vec<T>], b: &[Vec<T>]) -> SetDiffResult<Vec<Vec<T>>>
where
    T: Eq + Hash + Clone,
{
    let width = a.first().or_else(|| b.first()).map(Vec::len);
    if let Some(expected) = width {
        if let Some(row) = a.iter().chain(b).find(|row| row.len() != expected) {
            return Err(CandidateError::ShapeError {
                expected,
                actual: row.len(),
            });
        }
    }

    let exclude: HashSet<&[T]> = b.iter().map(Vec::as_slice).collect();
    Ok(a.iter()
        .filter(|row| !exclude.contains(row.as_slice()))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, r: &str, o: &str) -> Triple {
        Triple::new(s, r, o)
    }

    fn rows(items: &[[&str; 3]]) -> Vec<Vec<String>> {
        items
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn disjoint_inputs_keep_everything() {
        let a = vec![t("a", "y", "b"), t("b", "y", "c")];
        let b = vec![t("c", "y", "d")];
        assert_eq!(set_difference(&a, &b), a);
    }

    #[test]
    fn subset_is_emptied() {
        let a = vec![t("a", "y", "b")];
        let b = vec![t("a", "y", "b"), t("b", "y", "c")];
        assert!(set_difference(&a, &b).is_empty());
    }

    #[test]
    fn identical_inputs_are_emptied() {
        let a = vec![t("a", "y", "b"), t("b", "y", "c")];
        assert!(set_difference(&a, &a.clone()).is_empty());
    }

    #[test]
    fn partial_field_matches_are_not_removed() {
        // Same subject and relation, different object.
        let a = vec![t("a", "y", "b"), t("a", "y", "e")];
        let b = vec![t("a", "y", "b"), t("e", "y", "a"), t("a", "x", "e")];
        assert_eq!(set_difference(&a, &b), vec![t("a", "y", "e")]);
    }

    #[test]
    fn order_and_duplicates_preserved() {
        let a = vec![t("c", "y", "d"), t("a", "y", "b"), t("c", "y", "d")];
        let b = vec![t("a", "y", "b")];
        assert_eq!(
            set_difference(&a, &b),
            vec![t("c", "y", "d"), t("c", "y", "d")]
        );
    }

    #[test]
    fn graph_difference_matches_slice_difference() {
        let kg = KnowledgeGraph::from_triples([("a", "y", "b"), ("b", "y", "c")]);
        let candidates = vec![t("a", "y", "b"), t("a", "y", "c"), t("b", "y", "c")];
        assert_eq!(
            difference_from_graph(candidates.clone(), &kg),
            set_difference(&candidates, kg.triples())
        );
    }

    #[test]
    fn rows_difference() {
        let a = rows(&[["a", "y", "b"], ["a", "y", "e"]]);
        let b = rows(&[["a", "y", "b"]]);
        let diff = set_difference_rows(&a, &b).unwrap();
        assert_eq!(diff, rows(&[["a", "y", "e"]]));
    }

    #[test]
    fn rows_shape_mismatch_is_rejected() {
        let a = rows(&[["a", "y", "b"]]);
        let b = vec![vec!["a".to_string(), "y".to_string()]];
        let err = set_difference_rows(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            CandidateError::ShapeError {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn rows_with_empty_side() {
        let a = rows(&[["a", "y", "b"]]);
        assert_eq!(set_difference_rows(&a, &[]).unwrap(), a);
        assert!(set_difference_rows::<String>(&[], &a).unwrap().is_empty());
    }
}
