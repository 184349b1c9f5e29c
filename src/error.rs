//! Rich diagnostic error types for kg-discovery.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so callers know exactly
//! what went wrong and how to fix it.
//!
//! Non-fatal conditions (a model fitted on a different graph, a target relation
//! missing from the observed triples) are not errors: they are reported as
//! `tracing::warn!` events and execution continues.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the crate.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum KgdError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Candidate(#[from] CandidateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Candidate generation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CandidateError {
    #[error("{name} is not a valid candidate generation strategy")]
    #[diagnostic(
        code(kgd::candidates::invalid_strategy),
        help(
            "Choose one of: exhaustive, random_uniform, entity_frequency, \
             graph_degree, cluster_coefficient, cluster_triangles, cluster_squares."
        )
    )]
    InvalidStrategy { name: String },

    #[error("invalid parameter: {message}")]
    #[diagnostic(
        code(kgd::candidates::invalid_parameter),
        help(
            "max_candidates must be a positive integer, or a float in (0, 1] \
             interpreted as a fraction of the graph size."
        )
    )]
    InvalidParameter { message: String },

    #[error("row shape mismatch: expected {expected} columns, got {actual}")]
    #[diagnostic(
        code(kgd::candidates::shape),
        help(
            "Both inputs to the set difference must be two-dimensional with the \
             same number of columns in every row."
        )
    )]
    ShapeError { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// Scoring model errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    #[error("entity not known to the model: {entity}")]
    #[diagnostic(
        code(kgd::model::unknown_entity),
        help(
            "The model has no embedding for this entity. Filter unseen entities \
             with `filter_unseen_entities` before scoring."
        )
    )]
    UnknownEntity { entity: String },

    #[error("relation not known to the model: {relation}")]
    #[diagnostic(
        code(kgd::model::unknown_relation),
        help("The model has no embedding for this relation.")
    )]
    UnknownRelation { relation: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    #[diagnostic(
        code(kgd::model::dim_mismatch),
        help("All entity and relation embeddings of a model must share one dimension.")
    )]
    DimensionMismatch { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// Evaluation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EvaluationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error("rank vector has {actual} entries, expected {expected} (two per candidate)")]
    #[diagnostic(
        code(kgd::evaluate::rank_layout),
        help(
            "Evaluators must return subject-corruption ranks for every candidate \
             followed by object-corruption ranks, in candidate order."
        )
    )]
    RankLayout { expected: usize, actual: usize },

    #[error("evaluation failed: {message}")]
    #[diagnostic(code(kgd::evaluate::failed))]
    Failed { message: String },
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DiscoveryError {
    #[error("model is not fitted")]
    #[diagnostic(
        code(kgd::discovery::not_fitted),
        help("Train the model before running discovery; this crate does not fit models.")
    )]
    ModelNotFitted,

    #[error("target relation not found in model: {relation}")]
    #[diagnostic(
        code(kgd::discovery::unknown_relation),
        help(
            "The target relation must be one the model was trained on. \
             Omit `target_relation` to discover facts for every known relation."
        )
    )]
    UnknownRelation { relation: String },

    #[error("invalid parameter: {message}")]
    #[diagnostic(code(kgd::discovery::invalid_parameter))]
    InvalidParameter { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Candidate(#[from] CandidateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Evaluation(#[from] EvaluationError),
}

// ---------------------------------------------------------------------------
// Clustering errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ClusterError {
    #[error("model has not been fitted")]
    #[diagnostic(
        code(kgd::cluster::not_fitted),
        help("Clustering needs embeddings from a trained model.")
    )]
    ModelNotFitted,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error("feature rows have inconsistent widths: expected {expected}, got {actual}")]
    #[diagnostic(code(kgd::cluster::ragged_features))]
    RaggedFeatures { expected: usize, actual: usize },

    #[error("invalid clustering parameter: {message}")]
    #[diagnostic(code(kgd::cluster::invalid_parameter))]
    InvalidParameter { message: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read discovery config: {path}")]
    #[diagnostic(
        code(kgd::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse discovery config: {message}")]
    #[diagnostic(
        code(kgd::config::parse),
        help("Check the TOML syntax and field names of the discovery config.")
    )]
    Parse { message: String },
}

/// Convenience result alias for top-level operations.
pub type KgdResult<T> = std::result::Result<T, KgdError>;
