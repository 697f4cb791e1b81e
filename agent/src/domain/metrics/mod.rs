//! Metric aggregate and the collect/dispatch pipelines
//!
//! - `types` - values, sections and the per-cycle aggregate
//! - `collect` - fail-fast collection from gatherers
//! - `dispatch` - best-effort delivery to repeaters

pub mod collect;
pub mod dispatch;
pub mod types;

pub use collect::{CollectError, collect_metrics};
pub use dispatch::{DispatchReport, dispatch_metrics};
pub use types::{Metric, MetricGroupValue, MetricValue, Metrics, MetricsError, Section};
