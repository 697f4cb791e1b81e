//! Metric repeaters
//!
//! A repeater forwards a completed aggregate to one sink. Repeaters are
//! organized in named groups; the worker dispatches a cycle to exactly one
//! group. The set of groups is fixed when the application starts.

pub mod api;
pub mod error;
pub mod log;

pub use api::ApiRepeater;
pub use error::RepeaterError;
pub use log::LogRepeater;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::AgentConfig;
use crate::domain::metrics::Metrics;

/// Consumer forwarding an aggregate to a sink
#[async_trait]
pub trait Repeater: Send + Sync {
    /// Repeater name used in logs
    fn name(&self) -> &'static str;

    async fn dispatch(&self, config: &AgentConfig, metrics: &Metrics)
    -> Result<(), RepeaterError>;
}

/// Ordered repeater lists keyed by group name
#[derive(Clone, Default)]
pub struct RepeaterGroups {
    groups: HashMap<String, Vec<Arc<dyn Repeater>>>,
}

impl RepeaterGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, name: impl Into<String>, repeaters: Vec<Arc<dyn Repeater>>) -> Self {
        self.groups.insert(name.into(), repeaters);
        self
    }

    /// Append a repeater to every group
    pub fn push_all(&mut self, repeater: Arc<dyn Repeater>) {
        for repeaters in self.groups.values_mut() {
            repeaters.push(Arc::clone(&repeater));
        }
    }

    /// Repeaters of a group in dispatch order; empty for an unknown group
    pub fn get(&self, name: &str) -> &[Arc<dyn Repeater>] {
        self.groups.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_group_is_empty() {
        let groups = RepeaterGroups::new();
        assert!(groups.get("Metrics").is_empty());
        assert!(!groups.contains("Metrics"));
    }

    #[test]
    fn test_push_all_appends_in_order() {
        let mut groups = RepeaterGroups::new()
            .with_group("Metrics", vec![Arc::new(LogRepeater) as Arc<dyn Repeater>])
            .with_group("Configurations", vec![]);
        groups.push_all(Arc::new(LogRepeater));

        assert_eq!(groups.get("Metrics").len(), 2);
        assert_eq!(groups.get("Configurations").len(), 1);
        assert_eq!(groups.get("Configurations")[0].name(), "log");
    }
}
