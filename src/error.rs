// In: src/error.rs

//! This module defines the single, unified error type for the entire samar library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamarError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// The factory cannot build a model for the declared column type.
    #[error("Unsupported data type for this operation: {0}")]
    UnsupportedType(String),

    /// A column passed to `train`/`generate` does not match the model's declared type.
    #[error("Column type mismatch: {0}")]
    TypeMismatch(String),

    /// A loaded model stream was created for a different table structure.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A loaded model stream declares a format version this build does not understand.
    #[error("Unknown model format version: expected {expected}, got {found}")]
    FormatVersionMismatch { expected: u8, found: u8 },

    /// A persisted model stream is truncated or otherwise malformed.
    #[error("Model serialization/deserialization failed: {0}")]
    ModelFormatError(String),

    #[error("Internal logic error (this is a bug): {0}")]
    LogicalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during config parsing.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
