//! Approximate p95 statement latency
//!
//! Buckets `events_statements_summary_by_digest` rows by average wait
//! (microseconds) and returns the smallest bucket whose cumulative share of
//! digests exceeds 0.95. No rows means no data. Query failures are logged and
//! reported as an empty section.

use std::sync::Arc;

use async_trait::async_trait;

use super::{FailurePolicy, GatherError, Gatherer};
use crate::data::mysql::SqlSource;
use crate::domain::metrics::{MetricGroupValue, MetricValue, Section};

pub const LATENCY_P95_QUERY: &str = "SELECT CAST(p.avg_us AS CHAR) FROM (\
select `s2`.`avg_us` AS `avg_us` from (\
(select count(0) AS `cnt`,round(`performance_schema`.`events_statements_summary_by_digest`.`AVG_TIMER_WAIT` / 1000000,0) AS `avg_us` \
from `performance_schema`.`events_statements_summary_by_digest` \
group by round(`performance_schema`.`events_statements_summary_by_digest`.`AVG_TIMER_WAIT` / 1000000,0)) `s1` \
join (select count(0) AS `cnt`,round(`performance_schema`.`events_statements_summary_by_digest`.`AVG_TIMER_WAIT` / 1000000,0) AS `avg_us` \
from `performance_schema`.`events_statements_summary_by_digest` \
group by round(`performance_schema`.`events_statements_summary_by_digest`.`AVG_TIMER_WAIT` / 1000000,0)) `s2` \
on(`s1`.`avg_us` <= `s2`.`avg_us`)) \
group by `s2`.`avg_us` \
having ifnull(sum(`s1`.`cnt`) / nullif((select count(0) from `performance_schema`.`events_statements_summary_by_digest`),0),0) > 0.95 \
order by ifnull(sum(`s1`.`cnt`) / nullif((select count(0) from `performance_schema`.`events_statements_summary_by_digest`),0),0) \
limit 1) p";

pub struct QueryLatencyGatherer {
    source: Arc<dyn SqlSource>,
}

impl QueryLatencyGatherer {
    pub fn new(source: Arc<dyn SqlSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Gatherer for QueryLatencyGatherer {
    fn name(&self) -> &'static str {
        "latency"
    }

    fn section(&self) -> Section {
        Section::QueryMetrics
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Swallow
    }

    async fn gather(&self) -> Result<MetricGroupValue, GatherError> {
        let mut output = MetricGroupValue::new();

        match self.source.fetch_scalar(LATENCY_P95_QUERY).await {
            Ok(Some(latency)) => {
                output.insert("Latency".to_string(), MetricValue::Text(latency));
            }
            Ok(None) | Err(sqlx::Error::RowNotFound) => {
                tracing::debug!("No statement digests to compute latency from");
            }
            Err(e) => {
                tracing::error!(error = %e, "Latency query failed");
            }
        }

        tracing::debug!(values = ?output, "Collected query latency");
        Ok(output)
    }
}
