//! Dispatch pipeline
//!
//! Hands one aggregate to every repeater of a group, in order. A failing
//! repeater is logged and the next one still runs.

use std::sync::Arc;
use std::time::Duration;

use super::types::Metrics;
use crate::core::config::AgentConfig;
use crate::data::repeaters::{Repeater, RepeaterError};

/// Outcome of one dispatch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Dispatch `metrics` to every repeater in `repeaters`
///
/// Each call is bounded by `call_timeout`. Failures never stop the loop and
/// never reach the caller except through the report counts.
pub async fn dispatch_metrics(
    metrics: &Metrics,
    repeaters: &[Arc<dyn Repeater>],
    config: &AgentConfig,
    call_timeout: Duration,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for repeater in repeaters {
        let name = repeater.name();
        let result = match tokio::time::timeout(call_timeout, repeater.dispatch(config, metrics)).await {
            Ok(result) => result,
            Err(_) => Err(RepeaterError::Timeout(call_timeout.as_secs())),
        };

        match result {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::error!(repeater = name, error = %e, "Repeater failed");
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{Metric, MetricGroupValue, MetricValue, Section};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct RecordingRepeater {
        name: &'static str,
        fail: bool,
        hang: bool,
        seen: Arc<Mutex<Vec<(&'static str, Metrics)>>>,
    }

    #[async_trait]
    impl Repeater for RecordingRepeater {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn dispatch(
            &self,
            _config: &AgentConfig,
            metrics: &Metrics,
        ) -> Result<(), RepeaterError> {
            self.seen.lock().push((self.name, metrics.clone()));
            if self.hang {
                std::future::pending::<()>().await;
            }
            if self.fail {
                return Err(RepeaterError::MissingApiKey);
            }
            Ok(())
        }
    }

    fn repeater(
        name: &'static str,
        fail: bool,
        hang: bool,
        seen: &Arc<Mutex<Vec<(&'static str, Metrics)>>>,
    ) -> Arc<dyn Repeater> {
        Arc::new(RecordingRepeater {
            name,
            fail,
            hang,
            seen: Arc::clone(seen),
        })
    }

    fn sample_metrics() -> Metrics {
        let mut values = MetricGroupValue::new();
        values.insert("Latency".to_string(), MetricValue::from("812"));
        let mut metrics = Metrics::new();
        metrics
            .insert(Metric::new(Section::QueryMetrics, values))
            .unwrap();
        metrics
    }

    const TIMEOUT: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_failure_does_not_stop_later_repeaters() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let repeaters = vec![
            repeater("first", true, false, &seen),
            repeater("second", false, false, &seen),
        ];
        let metrics = sample_metrics();

        let report =
            dispatch_metrics(&metrics, &repeaters, &AgentConfig::default(), TIMEOUT).await;

        assert_eq!(report, DispatchReport { delivered: 1, failed: 1 });
        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "first");
        assert_eq!(seen[1].0, "second");
        assert_eq!(seen[0].1, metrics);
        assert_eq!(seen[1].1, metrics);
    }

    #[tokio::test]
    async fn test_empty_group_is_noop() {
        let report =
            dispatch_metrics(&sample_metrics(), &[], &AgentConfig::default(), TIMEOUT).await;
        assert_eq!(report.attempted(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let repeaters = vec![
            repeater("stuck", false, true, &seen),
            repeater("next", false, false, &seen),
        ];

        let report = dispatch_metrics(
            &sample_metrics(),
            &repeaters,
            &AgentConfig::default(),
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(report, DispatchReport { delivered: 1, failed: 1 });
        assert_eq!(seen.lock().len(), 2);
    }
}
