use async_trait::async_trait;

use super::{FailurePolicy, GatherError, Gatherer};
use crate::core::constants::AGENT_VERSION;
use crate::domain::metrics::{MetricGroupValue, MetricValue, Section};

/// Static self-description of the agent. Makes no external call.
#[derive(Debug, Default)]
pub struct AgentInfoGatherer {
    hostname: Option<String>,
}

impl AgentInfoGatherer {
    pub fn new(hostname: Option<String>) -> Self {
        Self { hostname }
    }
}

#[async_trait]
impl Gatherer for AgentInfoGatherer {
    fn name(&self) -> &'static str {
        "agent"
    }

    fn section(&self) -> Section {
        Section::AgentInfo
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::FailFast
    }

    async fn gather(&self) -> Result<MetricGroupValue, GatherError> {
        let mut output = MetricGroupValue::new();
        output.insert("Version".to_string(), MetricValue::from(AGENT_VERSION));
        if let Some(ref hostname) = self.hostname {
            output.insert("Hostname".to_string(), MetricValue::from(hostname.clone()));
        }
        tracing::debug!(values = ?output, "Collected agent info");
        Ok(output)
    }
}
