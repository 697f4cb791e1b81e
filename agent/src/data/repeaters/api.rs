//! HTTP repeater for the recommendation API

use async_trait::async_trait;

use super::{Repeater, RepeaterError};
use crate::core::config::AgentConfig;
use crate::core::constants::API_KEY_HEADER;
use crate::domain::metrics::Metrics;
use crate::utils::string::{PREVIEW_MAX_LENGTH, truncate_preview};

/// POSTs the aggregate as JSON to `{api_url}/{path}`
///
/// The base URL and API key are read from the configuration passed to each
/// dispatch, so a reloaded config takes effect on the next cycle.
#[derive(Debug, Clone)]
pub struct ApiRepeater {
    client: reqwest::Client,
    path: String,
}

impl ApiRepeater {
    pub fn new(client: reqwest::Client, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into().trim_start_matches('/').to_string(),
        }
    }

    fn url(&self, config: &AgentConfig) -> String {
        format!("{}/{}", config.api_url, self.path)
    }
}

#[async_trait]
impl Repeater for ApiRepeater {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn dispatch(
        &self,
        config: &AgentConfig,
        metrics: &Metrics,
    ) -> Result<(), RepeaterError> {
        if config.api_key.is_empty() {
            return Err(RepeaterError::MissingApiKey);
        }

        let url = self.url(config);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &config.api_key)
            .json(metrics)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepeaterError::Status {
                status: status.as_u16(),
                body: truncate_preview(&body, PREVIEW_MAX_LENGTH),
            });
        }

        tracing::debug!(url = %url, status = status.as_u16(), "Metrics delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{Metric, MetricGroupValue, MetricValue, Section};
    use httpmock::prelude::*;

    fn sample_metrics() -> Metrics {
        let mut metrics = Metrics::new();
        let mut values = MetricGroupValue::new();
        values.insert("Version".to_string(), MetricValue::from("1.2.0"));
        metrics
            .insert(Metric::new(Section::AgentInfo, values))
            .unwrap();
        metrics
    }

    fn config_for(server: &MockServer, api_key: &str) -> AgentConfig {
        AgentConfig {
            api_key: api_key.to_string(),
            api_url: server.url("/v1"),
            ..AgentConfig::default()
        }
    }

    #[tokio::test]
    async fn test_posts_metrics_with_api_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/metrics")
                    .header("x-api-key", "test-key")
                    .json_body(serde_json::json!({ "Agent.Info": { "Version": "1.2.0" } }));
                then.status(200);
            })
            .await;

        let repeater = ApiRepeater::new(reqwest::Client::new(), "metrics");
        repeater
            .dispatch(&config_for(&server, "test-key"), &sample_metrics())
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/configurations");
                then.status(500).body("internal error");
            })
            .await;

        let repeater = ApiRepeater::new(reqwest::Client::new(), "/configurations");
        let err = repeater
            .dispatch(&config_for(&server, "test-key"), &sample_metrics())
            .await
            .unwrap_err();

        match err {
            RepeaterError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_skips_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200);
            })
            .await;

        let repeater = ApiRepeater::new(reqwest::Client::new(), "metrics");
        let err = repeater
            .dispatch(&config_for(&server, ""), &sample_metrics())
            .await
            .unwrap_err();

        assert!(matches!(err, RepeaterError::MissingApiKey));
        mock.assert_calls_async(0).await;
    }
}
