//! Gatherer error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatherError {
    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Cloud API error: {0}")]
    Cloud(String),

    #[error("Gatherer timed out after {0}s")]
    Timeout(u64),
}

impl GatherError {
    pub fn cloud(message: impl Into<String>) -> Self {
        Self::Cloud(message.into())
    }
}
