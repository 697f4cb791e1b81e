//! Metric gatherers
//!
//! Each gatherer produces exactly one [`Section`] of the cycle aggregate:
//! - `agent` - static agent metadata
//! - `cloudwatch` - RDS instance metrics from CloudWatch
//! - `latency` - approximate p95 statement latency from performance_schema
//! - `mysql` - global status and global variables
//!
//! A gatherer either participates fail-fast (its error aborts the cycle) or
//! swallows its own failures and reports partial output. The policy is part
//! of each implementation, see [`FailurePolicy`].

pub mod agent;
pub mod cloudwatch;
pub mod error;
pub mod latency;
pub mod mysql;

pub use agent::AgentInfoGatherer;
pub use cloudwatch::{CloudWatchGatherer, CloudWatchSource, MetricDataSource};
pub use error::GatherError;
pub use latency::QueryLatencyGatherer;
pub use mysql::{MysqlStatusGatherer, MysqlVariablesGatherer};

use async_trait::async_trait;

use crate::domain::metrics::{MetricGroupValue, Section};

/// How a gatherer treats failures of its own source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Source errors are returned and abort the cycle
    FailFast,
    /// Source errors are logged; partial or empty output is returned as success
    Swallow,
}

/// Producer of one named metric section
#[async_trait]
pub trait Gatherer: Send + Sync {
    /// Gatherer name used in logs
    fn name(&self) -> &'static str;

    /// The only section this gatherer writes
    fn section(&self) -> Section;

    fn policy(&self) -> FailurePolicy;

    /// Collect the section's values
    async fn gather(&self) -> Result<MetricGroupValue, GatherError>;
}
