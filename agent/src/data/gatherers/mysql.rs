//! MySQL global status and global variables
//!
//! Both gatherers participate fail-fast: without the server's status or
//! settings the aggregate is not worth sending.

use std::sync::Arc;

use async_trait::async_trait;

use super::{FailurePolicy, GatherError, Gatherer};
use crate::data::mysql::SqlSource;
use crate::domain::metrics::{MetricGroupValue, MetricValue, Section};

pub const GLOBAL_STATUS_QUERY: &str = "SELECT CAST(VARIABLE_NAME AS CHAR), CAST(VARIABLE_VALUE AS CHAR) \
FROM performance_schema.global_status";

pub const GLOBAL_VARIABLES_QUERY: &str = "SELECT CAST(VARIABLE_NAME AS CHAR), CAST(VARIABLE_VALUE AS CHAR) \
FROM performance_schema.global_variables";

async fn fetch_group(source: &dyn SqlSource, sql: &str) -> Result<MetricGroupValue, GatherError> {
    let rows = source.fetch_pairs(sql).await?;
    Ok(rows
        .into_iter()
        .map(|(name, value)| (name, MetricValue::Text(value)))
        .collect())
}

/// `DB.Status`: server counters, part of every collection cycle
pub struct MysqlStatusGatherer {
    source: Arc<dyn SqlSource>,
}

impl MysqlStatusGatherer {
    pub fn new(source: Arc<dyn SqlSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Gatherer for MysqlStatusGatherer {
    fn name(&self) -> &'static str {
        "mysql_status"
    }

    fn section(&self) -> Section {
        Section::DbStatus
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::FailFast
    }

    async fn gather(&self) -> Result<MetricGroupValue, GatherError> {
        let output = fetch_group(self.source.as_ref(), GLOBAL_STATUS_QUERY).await?;
        tracing::debug!(count = output.len(), "Collected global status");
        Ok(output)
    }
}

/// `DB.Variables`: server settings, collected only for recommendation cycles
pub struct MysqlVariablesGatherer {
    source: Arc<dyn SqlSource>,
}

impl MysqlVariablesGatherer {
    pub fn new(source: Arc<dyn SqlSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Gatherer for MysqlVariablesGatherer {
    fn name(&self) -> &'static str {
        "mysql_variables"
    }

    fn section(&self) -> Section {
        Section::DbVariables
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::FailFast
    }

    async fn gather(&self) -> Result<MetricGroupValue, GatherError> {
        let output = fetch_group(self.source.as_ref(), GLOBAL_VARIABLES_QUERY).await?;
        tracing::debug!(count = output.len(), "Collected global variables");
        Ok(output)
    }
}
