// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # kg-discovery
//!
//! Discover plausible new facts in a knowledge graph by proposing triples that
//! are absent from the observed graph and ranking them with a fitted
//! link-prediction model. Also clusters triples by their learned embeddings.
//!
//! ## Architecture
//!
//! - **Graph** (`graph`): triples, the observed graph, composite set
//!   difference, and structural metrics on a petgraph view
//! - **Candidates** (`candidates`): exhaustive, uniform, frequency-based and
//!   graph-metric generation strategies behind one lazy iterator
//! - **Model boundary** (`model`, `evaluate`): read-only scoring model and
//!   ranking evaluator traits, with TransE and filtered-corruption reference
//!   implementations
//! - **Discovery** (`discovery`): validation, per-relation orchestration, and
//!   two-sided rank aggregation
//! - **Clustering** (`cluster`): embedding-based triple clustering with DBSCAN
//!
//! ## Library usage
//!
//! ```no_run
//! use kg_discovery::discovery::{discover_facts, DiscoveryConfig};
//! use kg_discovery::evaluate::CorruptionEvaluator;
//! use kg_discovery::graph::KnowledgeGraph;
//! use kg_discovery::model::TransE;
//!
//! let kg = KnowledgeGraph::from_triples([("a", "y", "b"), ("b", "y", "c")]);
//! let model = TransE::builder(2)
//!     .with_entity("a", vec![0.0, 0.0]).unwrap()
//!     .with_entity("b", vec![1.0, 0.0]).unwrap()
//!     .with_entity("c", vec![2.0, 0.0]).unwrap()
//!     .with_relation("y", vec![1.0, 0.0]).unwrap()
//!     .fitted_on(&kg)
//!     .build();
//!
//! let config = DiscoveryConfig::default().with_top_n(2);
//! let facts = discover_facts(&kg, &model, &CorruptionEvaluator, &config).unwrap();
//! ```

pub mod candidates;
pub mod cluster;
pub mod discovery;
pub mod error;
pub mod evaluate;
pub mod graph;
pub mod model;
