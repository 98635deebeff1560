//! Error types for the Kaleido library.
//!
//! All failures are represented by the [`KaleidoError`] enum. The variants
//! follow the error taxonomy of the analysis core: unsupported queries and
//! invalid inputs are caller errors raised before any pipeline stage runs,
//! content conversion/decoding errors are structural properties of the input,
//! and fan-out errors are terminal failures of a shared upstream.
//!
//! # Examples
//!
//! ```
//! use kaleido::error::{KaleidoError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(KaleidoError::invalid_input("empty descriptor collection"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Kaleido operations.
#[derive(Error, Debug)]
pub enum KaleidoError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Query variant or operator/attribute combination not handled by an analyser
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    /// Request-validation failures (empty collections, malformed dates, bad exemplars)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The input variant carries no content-derivable payload
    #[error("Content conversion unsupported: {0}")]
    ContentConversion(String),

    /// Malformed embedded payload (invalid base64, undecodable image bytes)
    #[error("Content decode failure: {0}")]
    ContentDecode(String),

    /// Terminal failure of a shared upstream, delivered to every subscriber
    #[error("Fan-out failure: {0}")]
    FanOut(String),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with KaleidoError.
pub type Result<T> = std::result::Result<T, KaleidoError>;

impl KaleidoError {
    /// Create a new unsupported-query error.
    pub fn unsupported_query<S: Into<String>>(msg: S) -> Self {
        KaleidoError::UnsupportedQuery(msg.into())
    }

    /// Create a new invalid-input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        KaleidoError::InvalidInput(msg.into())
    }

    /// Create a new content-conversion error.
    pub fn content_conversion<S: Into<String>>(msg: S) -> Self {
        KaleidoError::ContentConversion(msg.into())
    }

    /// Create a new content-decode error.
    pub fn content_decode<S: Into<String>>(msg: S) -> Self {
        KaleidoError::ContentDecode(msg.into())
    }

    /// Create a new fan-out error.
    pub fn fan_out<S: Into<String>>(msg: S) -> Self {
        KaleidoError::FanOut(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        KaleidoError::Schema(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        KaleidoError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = KaleidoError::unsupported_query("spatial query needs a dedicated retriever");
        assert_eq!(
            error.to_string(),
            "Unsupported query: spatial query needs a dedicated retriever"
        );

        let error = KaleidoError::invalid_input("at least one descriptor must be provided");
        assert_eq!(
            error.to_string(),
            "Invalid input: at least one descriptor must be provided"
        );

        let error = KaleidoError::content_conversion("no content representation");
        assert_eq!(
            error.to_string(),
            "Content conversion unsupported: no content representation"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let kaleido_error = KaleidoError::from(io_error);

        match kaleido_error {
            KaleidoError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
