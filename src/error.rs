//! # Error Types
//!
//! This module defines error types used throughout the pancarta library.

use thiserror::Error;

/// Main error type for pancarta operations
#[derive(Debug, Error)]
pub enum PancartaError {
    /// Input image bytes could not be parsed as a raster
    #[error("Decode error: {0}")]
    Decode(String),

    /// Final raster could not be serialized
    #[error("Encode error: {0}")]
    Encode(String),

    /// Text-recognition collaborator failed, timed out, or found nothing usable
    #[error("Recognition error: {0}")]
    Recognition(String),

    /// Image download failure
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Font loading or rendering error
    #[error("Font error: {0}")]
    Font(String),

    /// Coordinate template storage error
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid parameter or command usage
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
