//! Process-lifetime run mode

use std::fmt;

use crate::core::constants::{GROUP_CONFIGURATIONS, GROUP_EVENTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeType {
    /// Single generate cycle right after start, then exit
    FirstRun,
    /// Single event dispatch, then exit
    Events,
    /// Regular continuous operation
    Periodic,
}

impl fmt::Display for ModeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeType::FirstRun => write!(f, "first-run"),
            ModeType::Events => write!(f, "events"),
            ModeType::Periodic => write!(f, "periodic"),
        }
    }
}

/// Selects one-shot vs continuous generate cycles and the repeater group
/// a generate cycle dispatches to (`name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    pub name: String,
    pub mode_type: ModeType,
    /// Event name when running in event mode
    pub event: Option<String>,
}

impl Mode {
    pub fn new(name: impl Into<String>, mode_type: ModeType) -> Self {
        Self {
            name: name.into(),
            mode_type,
            event: None,
        }
    }

    pub fn periodic() -> Self {
        Self::new(GROUP_CONFIGURATIONS, ModeType::Periodic)
    }

    pub fn first_run() -> Self {
        Self::new(GROUP_CONFIGURATIONS, ModeType::FirstRun)
    }

    pub fn event(event: &str) -> Self {
        Self {
            event: Some(event.to_string()),
            ..Self::new(GROUP_EVENTS, ModeType::Events)
        }
    }

    /// One generate cycle with zero initial delay, then exit
    pub fn is_one_shot(&self) -> bool {
        self.mode_type == ModeType::FirstRun || self.name == GROUP_EVENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_is_continuous() {
        assert!(!Mode::periodic().is_one_shot());
    }

    #[test]
    fn test_first_run_is_one_shot() {
        assert!(Mode::first_run().is_one_shot());
    }

    #[test]
    fn test_events_name_alone_makes_one_shot() {
        let mode = Mode::new("Events", ModeType::Periodic);
        assert!(mode.is_one_shot());
    }

    #[test]
    fn test_other_name_periodic_not_one_shot() {
        let mode = Mode::new("Queries", ModeType::Periodic);
        assert!(!mode.is_one_shot());
    }

    #[test]
    fn test_mode_type_display() {
        assert_eq!(ModeType::FirstRun.to_string(), "first-run");
        assert_eq!(ModeType::Periodic.to_string(), "periodic");
    }
}
