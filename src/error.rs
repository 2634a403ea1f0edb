//! Error types for the transformation pipeline
//!
//! Provides a single error enum with HTTP status mapping so the hosting
//! framework can translate failures without inspecting variants.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while handling a variant request
#[derive(Error, Debug)]
pub enum ImageflyError {
    /// Malformed or insufficient URL parameters
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Source file missing or unreadable
    #[error("source image not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// Parameter string rejected by the enforced preset list
    #[error("parameter string not in preset list: {0}")]
    PresetRejected(String),

    /// Codec or resize failure from the image primitives
    #[error("transform failed: {0}")]
    TransformFailure(String),

    /// Filesystem error while persisting a cache artifact
    #[error("cache write failed: {0}")]
    CacheWriteFailure(#[source] std::io::Error),

    /// Configuration errors (invalid YAML, missing fields, etc.)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageflyError {
    /// Maps pipeline errors to HTTP status codes
    ///
    /// Status mapping:
    /// - InvalidRequest, SourceNotFound, PresetRejected → 404 (Not Found)
    /// - TransformFailure, CacheWriteFailure, Config, Io → 500 (Internal Server Error)
    pub fn to_http_status(&self) -> u16 {
        match self {
            ImageflyError::InvalidRequest(_)
            | ImageflyError::SourceNotFound { .. }
            | ImageflyError::PresetRejected(_) => 404,

            ImageflyError::TransformFailure(_)
            | ImageflyError::CacheWriteFailure(_)
            | ImageflyError::Config(_)
            | ImageflyError::Io(_) => 500,
        }
    }
}
