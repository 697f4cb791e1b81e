use clap::Parser;

use std::path::PathBuf;

use super::constants::{ENV_API_KEY, ENV_CONFIG, ENV_DEBUG, ENV_EVENT};
use crate::domain::worker::Mode;

#[derive(Parser)]
#[command(name = "tuning-agent")]
#[command(
    version,
    about = "Collects database metrics and requests tuning recommendations",
    long_about = None
)]
pub struct Cli {
    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Enable debug logging and the log repeater
    #[arg(long, env = ENV_DEBUG)]
    pub debug: bool,

    /// API key (overrides the config file)
    #[arg(long, env = ENV_API_KEY, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Collect once, request a configuration recommendation, then exit
    #[arg(long, short = 'f', conflicts_with = "event")]
    pub first_run: bool,

    /// Send a single event with collected metrics, then exit
    #[arg(long, short = 'e', env = ENV_EVENT)]
    pub event: Option<String>,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub debug: bool,
    pub api_key: Option<String>,
    pub first_run: bool,
    pub event: Option<String>,
}

impl CliConfig {
    /// Process mode selected by the flags
    pub fn mode(&self) -> Mode {
        if self.first_run {
            Mode::first_run()
        } else if let Some(ref event) = self.event {
            Mode::event(event)
        } else {
            Mode::periodic()
        }
    }
}

/// Parse CLI arguments
pub fn parse() -> CliConfig {
    let cli = Cli::parse();
    CliConfig {
        config: cli.config,
        debug: cli.debug,
        api_key: cli.api_key.filter(|k| !k.is_empty()),
        first_run: cli.first_run,
        event: cli.event.filter(|e| !e.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::worker::ModeType;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "tuning-agent",
            "--config",
            "/etc/agent.json",
            "--debug",
            "--first-run",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/agent.json")));
        assert!(cli.debug);
        assert!(cli.first_run);
    }

    #[test]
    fn test_first_run_conflicts_with_event() {
        let result = Cli::try_parse_from(["tuning-agent", "--first-run", "--event", "restart"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_default_is_periodic() {
        let mode = CliConfig::default().mode();
        assert_eq!(mode.mode_type, ModeType::Periodic);
        assert!(!mode.is_one_shot());
    }

    #[test]
    fn test_mode_first_run() {
        let cli = CliConfig {
            first_run: true,
            ..Default::default()
        };
        let mode = cli.mode();
        assert_eq!(mode.mode_type, ModeType::FirstRun);
        assert!(mode.is_one_shot());
    }

    #[test]
    fn test_mode_event() {
        let cli = CliConfig {
            event: Some("restart".to_string()),
            ..Default::default()
        };
        let mode = cli.mode();
        assert_eq!(mode.name, "Events");
        assert_eq!(mode.mode_type, ModeType::Events);
        assert_eq!(mode.event.as_deref(), Some("restart"));
        assert!(mode.is_one_shot());
    }
}
