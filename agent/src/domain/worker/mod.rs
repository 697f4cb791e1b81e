//! Worker loop and run mode
//!
//! - `mode` - one-shot vs continuous operation, selected at startup
//! - `scheduler` - the timer-driven loop that triggers collect/dispatch cycles

pub mod mode;
pub mod scheduler;

pub use mode::{Mode, ModeType};
pub use scheduler::{Worker, WorkerExit};
