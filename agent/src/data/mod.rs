//! Data sources and sinks
//!
//! - `gatherers` - producers of metric sections
//! - `mysql` - MySQL pool and the query surface used by gatherers
//! - `repeaters` - sinks the aggregate is dispatched to

pub mod gatherers;
pub mod mysql;
pub mod repeaters;
