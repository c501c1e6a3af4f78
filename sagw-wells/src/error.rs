/// Error types for the groundwater wells library
use thiserror::Error;

/// Main error type for WaterConnect operations
#[derive(Error, Debug)]
pub enum SagwError {
    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service could not be reached
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The service answered with a non-success status
    #[error("{service} returned status {status}")]
    Status { service: String, status: u16 },

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to parse JSON data
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A well record lacks a required value
    #[error("Invalid well record: {0}")]
    InvalidRecord(String),

    /// A downloaded table lacks a required column
    #[error("Missing column {0:?}")]
    MissingColumn(String),

    /// Unknown parameter name
    #[error("Unknown parameter {0:?}")]
    UnknownParameter(String),

    /// The operation was canceled before it finished
    #[error("Canceled")]
    Canceled,
}

impl SagwError {
    /// True for failures to reach the service at all, the only class of
    /// error worth an immediate second attempt.
    pub fn is_connection(&self) -> bool {
        match self {
            SagwError::Connection(_) => true,
            #[cfg(feature = "api")]
            SagwError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

/// Type alias for Results using SagwError
pub type Result<T> = std::result::Result<T, SagwError>;
