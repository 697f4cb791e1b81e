//! Metrics agent: collects database and instance metrics on a schedule and
//! forwards them to the recommendation API.

pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
