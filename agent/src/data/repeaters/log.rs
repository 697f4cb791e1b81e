use async_trait::async_trait;

use super::{Repeater, RepeaterError};
use crate::core::config::AgentConfig;
use crate::domain::metrics::Metrics;

/// Writes the aggregate to the log. Enabled for debug runs.
#[derive(Debug, Default)]
pub struct LogRepeater;

#[async_trait]
impl Repeater for LogRepeater {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn dispatch(
        &self,
        _config: &AgentConfig,
        metrics: &Metrics,
    ) -> Result<(), RepeaterError> {
        let json = serde_json::to_string(metrics)?;
        tracing::info!(sections = metrics.len(), metrics = %json, "Metrics snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_repeater_accepts_empty_aggregate() {
        let result = LogRepeater
            .dispatch(&AgentConfig::default(), &Metrics::new())
            .await;
        assert!(result.is_ok());
    }
}
