use thiserror::Error;

/// Main error type for mileage-cli
#[derive(Error, Debug)]
pub enum MileageError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authentication required. Check GARMIN_EMAIL and GARMIN_PASSWORD.")]
    NotAuthenticated,

    #[error("Rate limited. Please wait before retrying.")]
    RateLimited,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidDateFormat(String),
}

pub type Result<T> = std::result::Result<T, MileageError>;

impl MileageError {
    /// Create an authentication error from a message
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid response error from a message
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a database error from a message
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

/// Format an error for end-user display
pub fn format_user_error(err: &MileageError) -> String {
    match err {
        MileageError::Http(e) if e.is_timeout() => {
            "Request timed out. Garmin Connect may be slow or unreachable.".to_string()
        }
        MileageError::Http(e) if e.is_connect() => {
            "Could not connect to Garmin Connect. Check your network.".to_string()
        }
        other => other.to_string(),
    }
}
