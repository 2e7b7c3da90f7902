//! # Graph Errors
//!
//! This module defines the error types used throughout the engine. [`GraphError`] is
//! what a build returns; [`SourceError`] is what the data, loader and cache
//! collaborators return. Collaborator failures are never recovered locally: they are
//! wrapped once in [`GraphError::Source`] and abort the build.

/// Errors raised while assembling a resource graph.
///
/// Every variant aborts the whole build. No partially attached node is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Caching requested without a usable cache key")]
    InvalidCacheKey,
    #[error("Required parameter(s) for {0} relationship missed")]
    RequiredParameterMissing(String),
    #[error("Required {0} relationship data missed")]
    RequiredRelationshipDataMissing(String),
    #[error("No producer registered for type: {0}")]
    UnknownProducer(String),
    #[error("No loader registered with name: {0}")]
    UnknownLoader(String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Cache payload error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors reported by the data source, loader and cache collaborators.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error("Collaborator error: {0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}
