//! Custom error types for rustscopus.
//!
//! This module defines all error types used throughout the application.
//! All functions return `Result<T, ScopusError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for rustscopus operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum ScopusError {
    /// Query builder rejected the input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Authentication failed (bad or missing API key)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limited by the Scopus API
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Scopus API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code from the API
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Validation errors raised by the query builder.
///
/// Every variant is recoverable by re-prompting the user; none of them
/// produce a partial query string.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ValidationError {
    /// No usable keyword after trimming
    #[error("Enter at least one keyword")]
    EmptyQuery,

    /// More than three keyword slots supplied
    #[error("At most three keywords are supported")]
    TooManyTerms,

    /// A keyword contains an embedded double quote
    #[error("Keywords must not contain double quotes")]
    InvalidCharacter,

    /// An empty keyword slot precedes a filled one
    #[error("Fill keywords in order, without gaps")]
    NonContiguousTerms,
}

/// Result type alias using `ScopusError`
pub type Result<T> = std::result::Result<T, ScopusError>;
