//! Error types for the application

use thiserror::Error;

/// Result type alias using our BotError
pub type Result<T> = std::result::Result<T, BotError>;

/// Main error type for venue queries and trade execution
#[derive(Error, Debug)]
pub enum BotError {
    /// A read query against the venue failed or returned unusable data
    #[error("Venue query error: {0}")]
    VenueQuery(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Strategy row with an unrecognized action or chain
    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),

    /// Trade submission was rejected or could not be broadcast
    #[error("Trade submission error: {0}")]
    Submission(String),

    /// Transaction never reached a confirmed state
    #[error("Confirmation failure: {0}")]
    Confirmation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
