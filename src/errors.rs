/*!
 * Error types for the doctran application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised when a source path cannot be mapped to its destination
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathMapError {
    /// The source language segment does not appear in the path
    #[error("Path {path:?} has no '{segment}' component")]
    MissingSegment {
        path: PathBuf,
        segment: String,
    },

    /// The source language segment appears more than once
    #[error("Path {path:?} has {count} '{segment}' components, expected exactly one")]
    AmbiguousSegment {
        path: PathBuf,
        segment: String,
        count: usize,
    },
}

/// Errors raised while building a token escaper
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscaperError {
    #[error("Reserved marker must not be empty")]
    EmptyMarker,

    #[error("Marker '{0}' is identical to its sentinel")]
    SentinelEqualsMarker(String),

    #[error("Duplicate marker or sentinel: '{0}'")]
    Duplicate(String),

    #[error("Marker set does not compile to a pattern: {0}")]
    Pattern(String),
}

/// Errors that abort a run before any item is processed
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The input root does not exist or is not a directory
    #[error("Input directory does not exist: {0:?}")]
    RootNotFound(PathBuf),

    /// The directory walk failed (permissions, vanished entries)
    #[error("Failed to walk input directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A discovered file could not be mapped to a destination
    #[error("Cannot derive output path: {0}")]
    PathMap(#[from] PathMapError),

    /// Two sources map to the same destination
    #[error("Sources {first:?} and {second:?} both map to {destination:?}")]
    DestinationCollision {
        first: PathBuf,
        second: PathBuf,
        destination: PathBuf,
    },
}

/// Errors that abort a single work item while it is being translated
#[derive(Error, Debug)]
pub enum StreamingError {
    /// Error from the completion provider, either before or during streaming
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The source document could not be read
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while persisting a destination document
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination appeared while the document was being written
    #[error("Destination {0:?} already exists, refusing to overwrite")]
    AlreadyExists(PathBuf),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from discovery
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Error from streaming a translation
    #[error("Translation error: {0}")]
    Streaming(#[from] StreamingError),

    /// Error from writing output
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<EscaperError> for AppError {
    fn from(error: EscaperError) -> Self {
        Self::Config(error.to_string())
    }
}
