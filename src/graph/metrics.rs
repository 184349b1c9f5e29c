//! Graph metrics: per-entity structural scores used to steer candidate sampling.
//!
//! Triples are collapsed into an undirected simple graph: one node per entity,
//! one edge per unordered (subject, object) pair. When several triples connect
//! the same pair only the relation of the last one survives as the edge label.
//! This is a deliberate simplification; every metric here depends only on
//! connectivity, never on relation identity.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use super::KnowledgeGraph;

/// Entity → score, in node insertion order (first appearance in the triples).
pub type EntityMetricTable = Vec<(String, f64)>;

/// A structural per-entity metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphMetric {
    /// Number of incident edges.
    Degree,
    /// Local clustering coefficient.
    ClusteringCoefficient,
    /// Number of triangles through the node.
    Triangles,
    /// Square clustering coefficient.
    SquareClustering,
}

impl fmt::Display for GraphMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphMetric::Degree => write!(f, "degree"),
            GraphMetric::ClusteringCoefficient => write!(f, "clustering coefficient"),
            GraphMetric::Triangles => write!(f, "triangles"),
            GraphMetric::SquareClustering => write!(f, "square clustering"),
        }
    }
}

/// Undirected, relation-collapsed view of a [`KnowledgeGraph`].
pub struct EntityGraph {
    graph: UnGraph<String, String>,
    /// Neighbour sets with the node itself removed.
    neighbours: Vec<HashSet<NodeIndex>>,
}

impl EntityGraph {
    /// Build the entity graph from observed triples.
    pub fn from_graph(kg: &KnowledgeGraph) -> Self {
        let mut graph: UnGraph<String, String> = UnGraph::default();
        let mut node_index: HashMap<&str, NodeIndex> = HashMap::new();

        for triple in kg {
            let s = *node_index
                .entry(triple.subject.as_str())
                .or_insert_with(|| graph.add_node(triple.subject.clone()));
            let o = *node_index
                .entry(triple.object.as_str())
                .or_insert_with(|| graph.add_node(triple.object.clone()));
            // Replaces the label of an existing edge in either direction.
            graph.update_edge(s, o, triple.relation.clone());
        }

        let neighbours: Vec<HashSet<NodeIndex>> = graph
            .node_indices()
            .map(|n| graph.neighbors(n).filter(|&m| m != n).collect())
            .collect();

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built entity graph"
        );

        Self { graph, neighbours }
    }

    /// Number of entity nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct undirected edges after relation collapsing.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The relation label surviving on the edge between two entities, if any.
    pub fn edge_relation(&self, a: &str, b: &str) -> Option<&str> {
        let a = self.node(a)?;
        let b = self.node(b)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).map(String::as_str)
    }

    fn node(&self, entity: &str) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&n| self.graph[n] == entity)
    }

    /// Compute the requested metric for every entity.
    pub fn metric(&self, metric: GraphMetric) -> EntityMetricTable {
        match metric {
            GraphMetric::Degree => self.table(|n| self.degree(n) as f64),
            GraphMetric::ClusteringCoefficient => self.table(|n| self.clustering(n)),
            GraphMetric::Triangles => self.table(|n| self.triangles(n) as f64),
            GraphMetric::SquareClustering => self.table(|n| self.square_clustering(n)),
        }
    }

    fn table(&self, score: impl Fn(NodeIndex) -> f64) -> EntityMetricTable {
        self.graph
            .node_indices()
            .map(|n| (self.graph[n].clone(), score(n)))
            .collect()
    }

    /// Incident edges, a self-loop counting twice.
    fn degree(&self, n: NodeIndex) -> usize {
        self.graph
            .edges(n)
            .map(|e| if e.source() == e.target() { 2 } else { 1 })
            .sum()
    }

    fn triangles(&self, n: NodeIndex) -> usize {
        let nbrs = &self.neighbours[n.index()];
        let linked: usize = nbrs
            .iter()
            .map(|u| {
                self.neighbours[u.index()]
                    .iter()
                    .filter(|w| nbrs.contains(w))
                    .count()
            })
            .sum();
        // Every triangle is seen once from each of its two other corners.
        linked / 2
    }

    fn clustering(&self, n: NodeIndex) -> f64 {
        let d = self.neighbours[n.index()].len();
        if d < 2 {
            return 0.0;
        }
        let t = self.triangles(n) as f64;
        2.0 * t / (d as f64 * (d as f64 - 1.0))
    }

    fn square_clustering(&self, v: NodeIndex) -> f64 {
        let mut nbrs: Vec<NodeIndex> = self.neighbours[v.index()].iter().copied().collect();
        nbrs.sort_unstable();

        let mut squares = 0.0;
        let mut potential = 0.0;
        for (i, &u) in nbrs.iter().enumerate() {
            let nu = &self.neighbours[u.index()];
            for &w in &nbrs[i + 1..] {
                let nw = &self.neighbours[w.index()];
                let q = nu.intersection(nw).filter(|&&x| x != v).count();
                let mut theta = q + 1;
                if nu.contains(&w) {
                    theta += 1;
                }
                squares += q as f64;
                potential += (nu.len() as f64 - theta as f64)
                    + (nw.len() as f64 - theta as f64)
                    + q as f64;
            }
        }

        if potential > 0.0 {
            squares / potential
        } else {
            0.0
        }
    }
}

impl fmt::Debug for EntityGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

/// Build the entity graph and compute one metric in a single call.
pub fn compute_metric(kg: &KnowledgeGraph, metric: GraphMetric) -> EntityMetricTable {
    EntityGraph::from_graph(kg).metric(metric)
}
