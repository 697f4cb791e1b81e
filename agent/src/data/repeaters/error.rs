//! Repeater error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepeaterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Repeater timed out after {0}s")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = RepeaterError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API returned status 503: unavailable");
    }

    #[test]
    fn test_missing_api_key_display() {
        assert_eq!(
            RepeaterError::MissingApiKey.to_string(),
            "API key is not configured"
        );
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(
            RepeaterError::Timeout(30).to_string(),
            "Repeater timed out after 30s"
        );
    }
}
