//! MySQL access for the database gatherers
//!
//! The pool is created lazily so the agent starts (and keeps sending the
//! sections that do not need the database) while MySQL is unreachable.

pub use sqlx::MySqlPool;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::ConnectOptions;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tracing::log::LevelFilter;

use crate::core::config::MysqlConfig;
use crate::core::constants::{MYSQL_ACQUIRE_TIMEOUT_SECS, MYSQL_MAX_CONNECTIONS};

/// Read-only query surface used by gatherers
#[async_trait]
pub trait SqlSource: Send + Sync {
    /// First column of the first row; `None` when the query returns no rows
    async fn fetch_scalar(&self, sql: &str) -> Result<Option<String>, sqlx::Error>;

    /// Two-column rows as (name, value) pairs
    async fn fetch_pairs(&self, sql: &str) -> Result<Vec<(String, String)>, sqlx::Error>;
}

#[async_trait]
impl SqlSource for MySqlPool {
    async fn fetch_scalar(&self, sql: &str) -> Result<Option<String>, sqlx::Error> {
        let value = sqlx::query_scalar::<_, Option<String>>(sql)
            .fetch_optional(self)
            .await?;
        Ok(value.flatten())
    }

    async fn fetch_pairs(&self, sql: &str) -> Result<Vec<(String, String)>, sqlx::Error> {
        sqlx::query_as::<_, (String, String)>(sql)
            .fetch_all(self)
            .await
    }
}

/// MySQL connection pool owned by the application
pub struct MysqlService {
    pool: MySqlPool,
}

impl MysqlService {
    /// Create the pool without connecting; connections open on first use
    pub fn connect_lazy(config: &MysqlConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .log_statements(LevelFilter::Trace);

        let pool = MySqlPoolOptions::new()
            .max_connections(MYSQL_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(MYSQL_ACQUIRE_TIMEOUT_SECS))
            .connect_lazy_with(options);

        tracing::debug!(
            host = %config.host,
            port = config.port,
            user = %config.user,
            "MySQL pool configured"
        );
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("MySQL pool closed");
    }
}
