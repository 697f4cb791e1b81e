//! Agent domain logic
//!
//! - `metrics` - aggregate types and the collect/dispatch pipelines
//! - `worker` - run mode and the timer-driven worker loop

pub mod metrics;
pub mod worker;
