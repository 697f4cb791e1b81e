//! Collection pipeline
//!
//! Runs gatherers in list order against a fresh aggregate. The first failure
//! aborts the cycle; the partially built aggregate is dropped with it.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::types::{Metric, MetricGroupValue, Metrics, MetricsError};
use crate::data::gatherers::{FailurePolicy, GatherError, Gatherer};

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Gatherer {name} failed: {source}")]
    Gatherer {
        name: &'static str,
        #[source]
        source: GatherError,
    },

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Collect one aggregate from the given gatherers
///
/// Every call is bounded by `call_timeout`. An elapsed timeout counts as a
/// gatherer error for fail-fast gatherers; a swallowing gatherer contributes
/// an empty section instead. Gatherers after the failing one are not invoked.
pub async fn collect_metrics(
    gatherers: &[Arc<dyn Gatherer>],
    call_timeout: Duration,
) -> Result<Metrics, CollectError> {
    let mut metrics = Metrics::new();

    for gatherer in gatherers {
        let name = gatherer.name();
        let values = match tokio::time::timeout(call_timeout, gatherer.gather()).await {
            Ok(Ok(values)) => values,
            Ok(Err(source)) => {
                tracing::error!(gatherer = name, error = %source, "Gatherer failed");
                return Err(CollectError::Gatherer { name, source });
            }
            Err(_) => {
                let source = GatherError::Timeout(call_timeout.as_secs());
                match gatherer.policy() {
                    FailurePolicy::Swallow => {
                        tracing::warn!(
                            gatherer = name,
                            error = %source,
                            "Gatherer timed out, reporting empty section"
                        );
                        MetricGroupValue::new()
                    }
                    FailurePolicy::FailFast => {
                        tracing::error!(gatherer = name, error = %source, "Gatherer failed");
                        return Err(CollectError::Gatherer { name, source });
                    }
                }
            }
        };

        tracing::debug!(
            gatherer = name,
            section = %gatherer.section(),
            values = values.len(),
            "Gathered section"
        );
        metrics.insert(Metric::new(gatherer.section(), values))?;
    }

    Ok(metrics)
}
