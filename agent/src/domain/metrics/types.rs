//! Metric value types shared by gatherers, pipelines and repeaters

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single scalar measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    /// String-encoded numeric, or a textual server setting
    Text(String),
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Metric name to value. A missing key means "no data".
pub type MetricGroupValue = BTreeMap<String, MetricValue>;

// =============================================================================
// Sections
// =============================================================================

/// Named sections of the per-cycle aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Section {
    #[serde(rename = "Agent.Info")]
    AgentInfo,
    #[serde(rename = "Instance.Metrics")]
    InstanceMetrics,
    #[serde(rename = "Query.Metrics")]
    QueryMetrics,
    #[serde(rename = "DB.Status")]
    DbStatus,
    #[serde(rename = "DB.Variables")]
    DbVariables,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgentInfo => "Agent.Info",
            Self::InstanceMetrics => "Instance.Metrics",
            Self::QueryMetrics => "Query.Metrics",
            Self::DbStatus => "DB.Status",
            Self::DbVariables => "DB.Variables",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named section as produced by a single gatherer call
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub section: Section,
    pub values: MetricGroupValue,
}

impl Metric {
    pub fn new(section: Section, values: MetricGroupValue) -> Self {
        Self { section, values }
    }
}

// =============================================================================
// Aggregate
// =============================================================================

#[derive(Error, Debug, PartialEq)]
pub enum MetricsError {
    #[error("Section {0} already written in this cycle")]
    SectionConflict(Section),
}

/// Aggregate for one cycle. Built empty every cycle and never merged across cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metrics {
    sections: BTreeMap<Section, MetricGroupValue>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a section. Each section accepts exactly one writer per cycle.
    pub fn insert(&mut self, metric: Metric) -> Result<(), MetricsError> {
        if self.sections.contains_key(&metric.section) {
            return Err(MetricsError::SectionConflict(metric.section));
        }
        self.sections.insert(metric.section, metric.values);
        Ok(())
    }

    pub fn section(&self, section: Section) -> Option<&MetricGroupValue> {
        self.sections.get(&section)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(pairs: &[(&str, MetricValue)]) -> MetricGroupValue {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_new_aggregate_is_empty() {
        let metrics = Metrics::new();
        assert!(metrics.is_empty());
        assert_eq!(metrics.len(), 0);
        assert!(metrics.section(Section::AgentInfo).is_none());
    }

    #[test]
    fn test_insert_and_read_section() {
        let mut metrics = Metrics::new();
        metrics
            .insert(Metric::new(
                Section::QueryMetrics,
                group(&[("Latency", MetricValue::from("812"))]),
            ))
            .unwrap();

        let section = metrics.section(Section::QueryMetrics).unwrap();
        assert_eq!(section.get("Latency"), Some(&MetricValue::Text("812".into())));
    }

    #[test]
    fn test_second_writer_rejected() {
        let mut metrics = Metrics::new();
        metrics
            .insert(Metric::new(Section::DbStatus, MetricGroupValue::new()))
            .unwrap();

        let err = metrics
            .insert(Metric::new(Section::DbStatus, MetricGroupValue::new()))
            .unwrap_err();
        assert_eq!(err, MetricsError::SectionConflict(Section::DbStatus));
        assert_eq!(
            err.to_string(),
            "Section DB.Status already written in this cycle"
        );
    }

    #[test]
    fn test_serializes_by_section_key() {
        let mut metrics = Metrics::new();
        metrics
            .insert(Metric::new(
                Section::AgentInfo,
                group(&[("Version", MetricValue::from("1.2.0"))]),
            ))
            .unwrap();
        metrics
            .insert(Metric::new(
                Section::InstanceMetrics,
                group(&[("CPUUtilization", MetricValue::Number(12.5))]),
            ))
            .unwrap();

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["Agent.Info"]["Version"], "1.2.0");
        assert_eq!(json["Instance.Metrics"]["CPUUtilization"], 12.5);
    }

    #[test]
    fn test_section_display() {
        assert_eq!(Section::InstanceMetrics.to_string(), "Instance.Metrics");
        assert_eq!(Section::DbVariables.as_str(), "DB.Variables");
    }
}
