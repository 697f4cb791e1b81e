//! CloudWatch gatherer for RDS instance metrics
//!
//! Issues one batched `GetMetricData` request covering the whole RDS catalog
//! for a single instance and keeps the most recent datapoint of every series.
//! Series without datapoints are left out of the section. API failures are
//! logged and whatever was already collected is returned as success.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Dimension, Metric, MetricDataQuery, MetricStat};

use super::{FailurePolicy, GatherError, Gatherer};
use crate::core::constants::{
    CLOUDWATCH_LOOKBACK_SECS, CLOUDWATCH_PERIOD_SECS, CLOUDWATCH_RDS_DIMENSION,
    CLOUDWATCH_RDS_NAMESPACE, CLOUDWATCH_STAT,
};
use crate::domain::metrics::{MetricGroupValue, MetricValue, Section};

/// Upper bound on followed pages per request
const MAX_PAGES: usize = 10;

/// RDS series requested every cycle
pub const RDS_METRICS: &[&str] = &[
    "BinLogDiskUsage",
    "BurstBalance",
    "CPUUtilization",
    "CPUCreditUsage",
    "CPUCreditBalance",
    "CPUSurplusCreditBalance",
    "CPUSurplusCreditsCharged",
    "DatabaseConnections",
    "DiskQueueDepth",
    "FreeableMemory",
    "FreeStorageSpace",
    "LVMReadIOPS",
    "LVMWriteIOPS",
    "NetworkReceiveThroughput",
    "NetworkTransmitThroughput",
    "ReadIOPS",
    "ReadLatency",
    "ReadThroughput",
    "ReplicaLag",
    "SwapUsage",
    "WriteIOPS",
    "WriteLatency",
    "WriteThroughput",
    "NumVCPUs",
];

/// Batched time-series query for one monitored resource
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub resource_id: String,
    pub metric_names: &'static [&'static str],
    /// Window start, unix seconds
    pub start: i64,
    /// Window end, unix seconds
    pub end: i64,
}

impl MetricQuery {
    /// Query over the lookback window ending at `now` (whole seconds)
    pub fn ending_at(resource_id: &str, now: i64) -> Self {
        Self {
            resource_id: resource_id.to_string(),
            metric_names: RDS_METRICS,
            start: now - CLOUDWATCH_LOOKBACK_SECS,
            end: now,
        }
    }
}

/// One returned series, values ordered newest first
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResult {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesPage {
    pub series: Vec<SeriesResult>,
    pub next_token: Option<String>,
}

/// Source of metric data pages
#[async_trait]
pub trait MetricDataSource: Send + Sync {
    async fn fetch_page(
        &self,
        query: &MetricQuery,
        next_token: Option<String>,
    ) -> Result<SeriesPage, GatherError>;
}

// =============================================================================
// CloudWatch client
// =============================================================================

/// [`MetricDataSource`] backed by the AWS CloudWatch API
#[derive(Debug, Clone)]
pub struct CloudWatchSource {
    client: Client,
}

impl CloudWatchSource {
    /// Build a client from the default AWS credential chain
    pub async fn new(region: Option<String>) -> Self {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            config_loader = config_loader.region(aws_sdk_cloudwatch::config::Region::new(region));
        }
        let config = config_loader.load().await;
        tracing::debug!(region = ?config.region(), "CloudWatch client initialized");
        Self {
            client: Client::new(&config),
        }
    }

    fn build_queries(query: &MetricQuery) -> Vec<MetricDataQuery> {
        query
            .metric_names
            .iter()
            .map(|name| {
                let dimension = Dimension::builder()
                    .name(CLOUDWATCH_RDS_DIMENSION)
                    .value(&query.resource_id)
                    .build();
                let metric = Metric::builder()
                    .namespace(CLOUDWATCH_RDS_NAMESPACE)
                    .metric_name(*name)
                    .dimensions(dimension)
                    .build();
                let stat = MetricStat::builder()
                    .metric(metric)
                    .period(CLOUDWATCH_PERIOD_SECS)
                    .stat(CLOUDWATCH_STAT)
                    .build();
                MetricDataQuery::builder()
                    .id(query_id(name))
                    .label(*name)
                    .metric_stat(stat)
                    .build()
            })
            .collect()
    }
}

#[async_trait]
impl MetricDataSource for CloudWatchSource {
    async fn fetch_page(
        &self,
        query: &MetricQuery,
        next_token: Option<String>,
    ) -> Result<SeriesPage, GatherError> {
        let queries = Self::build_queries(query);
        let output = self
            .client
            .get_metric_data()
            .set_metric_data_queries(Some(queries))
            .start_time(DateTime::from_secs(query.start))
            .end_time(DateTime::from_secs(query.end))
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| GatherError::cloud(DisplayErrorContext(&e).to_string()))?;

        let series = output
            .metric_data_results()
            .iter()
            .filter_map(|r| {
                let label = r
                    .label()
                    .map(str::to_string)
                    .or_else(|| r.id().map(label_from_id))?;
                Some(SeriesResult {
                    label,
                    values: r.values().to_vec(),
                })
            })
            .collect();

        Ok(SeriesPage {
            series,
            next_token: output.next_token().map(str::to_string),
        })
    }
}

/// Query ids must start with a lowercase letter
fn query_id(metric_name: &str) -> String {
    format!("id{}", metric_name)
}

fn label_from_id(id: &str) -> String {
    id.strip_prefix("id").unwrap_or(id).to_string()
}

// =============================================================================
// Gatherer
// =============================================================================

pub struct CloudWatchGatherer {
    source: Arc<dyn MetricDataSource>,
    resource_id: String,
}

impl CloudWatchGatherer {
    pub fn new(source: Arc<dyn MetricDataSource>, resource_id: impl Into<String>) -> Self {
        Self {
            source,
            resource_id: resource_id.into(),
        }
    }

    /// Keep the newest datapoint of each series; skip empty series
    fn fold_series(output: &mut MetricGroupValue, series: Vec<SeriesResult>) {
        for s in series {
            match s.values.first() {
                Some(latest) => {
                    output.insert(s.label, MetricValue::Text(format!("{:.6}", latest)));
                }
                None => {
                    tracing::debug!(metric = %s.label, "No datapoints returned");
                }
            }
        }
    }
}

#[async_trait]
impl Gatherer for CloudWatchGatherer {
    fn name(&self) -> &'static str {
        "cloudwatch"
    }

    fn section(&self) -> Section {
        Section::InstanceMetrics
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Swallow
    }

    async fn gather(&self) -> Result<MetricGroupValue, GatherError> {
        let query = MetricQuery::ending_at(&self.resource_id, chrono::Utc::now().timestamp());
        let mut output = MetricGroupValue::new();
        let mut next_token = None;

        for _ in 0..MAX_PAGES {
            match self.source.fetch_page(&query, next_token.take()).await {
                Ok(page) => {
                    Self::fold_series(&mut output, page.series);
                    match page.next_token {
                        Some(token) => next_token = Some(token),
                        None => break,
                    }
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        resource = %self.resource_id,
                        collected = output.len(),
                        "CloudWatch GetMetricData failed"
                    );
                    break;
                }
            }
        }

        tracing::debug!(
            resource = %self.resource_id,
            series = output.len(),
            "Collected CloudWatch metrics"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    struct FakeSource {
        pages: Mutex<VecDeque<Result<SeriesPage, GatherError>>>,
        queries: Mutex<Vec<(MetricQuery, Option<String>)>>,
    }

    impl FakeSource {
        fn new(pages: Vec<Result<SeriesPage, GatherError>>) -> Arc<Self> {
            Arc::new(Self {
                pages: Mutex::new(pages.into()),
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl MetricDataSource for FakeSource {
        async fn fetch_page(
            &self,
            query: &MetricQuery,
            next_token: Option<String>,
        ) -> Result<SeriesPage, GatherError> {
            self.queries.lock().push((query.clone(), next_token));
            self.pages
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(SeriesPage::default()))
        }
    }

    fn series(label: &str, values: &[f64]) -> SeriesResult {
        SeriesResult {
            label: label.to_string(),
            values: values.to_vec(),
        }
    }

    fn page(series: Vec<SeriesResult>, next_token: Option<&str>) -> SeriesPage {
        SeriesPage {
            series,
            next_token: next_token.map(str::to_string),
        }
    }

    #[test]
    fn test_catalog_size() {
        assert_eq!(RDS_METRICS.len(), 24);
        assert!(RDS_METRICS.contains(&"ReadIOPS"));
    }

    #[test]
    fn test_query_window() {
        let query = MetricQuery::ending_at("prod-db", 1_700_000_000);
        assert_eq!(query.end - query.start, 120);
        assert_eq!(query.resource_id, "prod-db");
    }

    #[test]
    fn test_request_covers_catalog_for_instance() {
        let query = MetricQuery::ending_at("prod-db", 1_700_000_000);
        let queries = CloudWatchSource::build_queries(&query);

        assert_eq!(queries.len(), 24);
        for (q, name) in queries.iter().zip(RDS_METRICS) {
            assert_eq!(q.id(), Some(format!("id{}", name).as_str()));
            assert_eq!(q.label(), Some(*name));

            let stat = q.metric_stat().unwrap();
            assert_eq!(stat.period(), Some(60));
            assert_eq!(stat.stat(), Some("Average"));

            let metric = stat.metric().unwrap();
            assert_eq!(metric.namespace(), Some("AWS/RDS"));
            assert_eq!(metric.metric_name(), Some(*name));
            let dimensions = metric.dimensions();
            assert_eq!(dimensions.len(), 1);
            assert_eq!(dimensions[0].name(), Some("DBInstanceIdentifier"));
            assert_eq!(dimensions[0].value(), Some("prod-db"));
        }
    }

    #[test]
    fn test_query_id_round_trip() {
        assert_eq!(query_id("ReadIOPS"), "idReadIOPS");
        assert_eq!(label_from_id("idReadIOPS"), "ReadIOPS");
    }

    #[tokio::test]
    async fn test_series_without_datapoints_omitted() {
        let source = FakeSource::new(vec![Ok(page(
            vec![
                series("ReadIOPS", &[]),
                series("WriteIOPS", &[42.0, 40.0]),
            ],
            None,
        ))]);
        let gatherer = CloudWatchGatherer::new(source, "prod-db");

        let output = gatherer.gather().await.unwrap();
        assert!(!output.contains_key("ReadIOPS"));
        assert_eq!(
            output.get("WriteIOPS"),
            Some(&MetricValue::Text("42.000000".to_string()))
        );
    }

    #[tokio::test]
    async fn test_api_error_swallowed() {
        let source = FakeSource::new(vec![Err(GatherError::cloud("AccessDenied"))]);
        let gatherer = CloudWatchGatherer::new(source, "prod-db");

        let output = gatherer.gather().await.unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_error_after_first_page_keeps_partial_output() {
        let source = FakeSource::new(vec![
            Ok(page(vec![series("CPUUtilization", &[12.5])], Some("t1"))),
            Err(GatherError::cloud("Throttling")),
        ]);
        let gatherer = CloudWatchGatherer::new(source.clone(), "prod-db");

        let output = gatherer.gather().await.unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(
            output.get("CPUUtilization"),
            Some(&MetricValue::Text("12.500000".to_string()))
        );

        let queries = source.queries.lock();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].1, None);
        assert_eq!(queries[1].1.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_follows_pages() {
        let source = FakeSource::new(vec![
            Ok(page(vec![series("ReadLatency", &[0.001])], Some("t1"))),
            Ok(page(vec![series("WriteLatency", &[0.002])], None)),
        ]);
        let gatherer = CloudWatchGatherer::new(source, "prod-db");

        let output = gatherer.gather().await.unwrap();
        assert_eq!(output.len(), 2);
        assert!(output.contains_key("ReadLatency"));
        assert!(output.contains_key("WriteLatency"));
    }

    #[test]
    fn test_policy_is_swallow() {
        let gatherer = CloudWatchGatherer::new(FakeSource::new(vec![]), "prod-db");
        assert_eq!(gatherer.policy(), FailurePolicy::Swallow);
        assert_eq!(gatherer.section(), Section::InstanceMetrics);
    }
}
