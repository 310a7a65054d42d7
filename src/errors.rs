/*!
 * Error types for the subpolish application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to an LLM provider API
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
        message: String,
    },

    /// Request exceeded the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),
}

/// Errors that can occur while processing one batch inside a dispatch run.
///
/// Transient and validation failures are retry-eligible; a permanent failure
/// means the retry budget for that batch is exhausted. A permanently failed
/// batch never aborts sibling batches - its segments keep their original text.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Collaborator call failed or returned something unusable
    #[error("transient batch failure: {0}")]
    Transient(String),

    /// Result had the wrong cardinality or shape for the submitted batch
    #[error("batch result validation failed: {0}")]
    Validation(String),

    /// Retry budget exhausted for this batch
    #[error("batch failed permanently after {attempts} attempts: {last_error}")]
    Permanent {
        /// Number of attempts made, including the first
        attempts: u32,
        /// The error from the final attempt
        last_error: String,
    },
}

impl BatchError {
    /// Whether this failure is still eligible for a retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Validation(_))
    }
}

impl From<ProviderError> for BatchError {
    fn from(error: ProviderError) -> Self {
        Self::Transient(error.to_string())
    }
}

/// Configuration errors, fatal at construction before any work starts
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Worker count must be at least 1
    #[error("invalid worker count: {0} (must be >= 1)")]
    InvalidWorkerCount(usize),

    /// Batch size must be at least 1
    #[error("invalid batch size: {0} (must be >= 1)")]
    InvalidBatchSize(usize),

    /// Threshold or ratio outside its sensible range
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value rendered as text
        value: String,
    },

    /// Target language not in the supported set
    #[error("unrecognized target language: {0}")]
    UnrecognizedLanguage(String),

    /// Missing required credential for the configured provider
    #[error("missing credential: {0}")]
    MissingCredential(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from configuration validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from batch processing
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

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
