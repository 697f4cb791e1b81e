//! Agent application shell

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::cli::{self, CliConfig};
use crate::core::config::{
    AgentConfig, ConfigOverrides, FileConfig, FileConfigLoader, resolve_config_path,
};
use crate::core::constants::{
    AGENT_VERSION, API_REQUEST_TIMEOUT_SECS, APP_NAME, APP_NAME_LOWER, ENV_LOG, GROUP_CONFIGURATIONS,
    GROUP_EVENTS, GROUP_METRICS,
};
use crate::core::shutdown::ShutdownService;
use crate::data::gatherers::{
    AgentInfoGatherer, CloudWatchGatherer, CloudWatchSource, Gatherer, MysqlStatusGatherer,
    MysqlVariablesGatherer, QueryLatencyGatherer,
};
use crate::data::mysql::{MysqlService, SqlSource};
use crate::data::repeaters::{ApiRepeater, LogRepeater, Repeater, RepeaterGroups};
use crate::domain::worker::{Mode, Worker, WorkerExit};

pub struct AgentApp {
    pub shutdown: ShutdownService,
    pub config: AgentConfig,
    pub config_path: PathBuf,
    pub overrides: ConfigOverrides,
    pub mode: Mode,
    pub mysql: MysqlService,
}

impl AgentApp {
    /// Run the agent with CLI argument parsing
    pub async fn run() -> Result<WorkerExit> {
        dotenvy::dotenv().ok();

        let cli_config = cli::parse();
        let app = Self::init(&cli_config)?;
        app.start().await
    }

    /// Load the initial configuration and set up logging
    ///
    /// Unlike a reload, a failure here is fatal.
    fn init(cli: &CliConfig) -> Result<Self> {
        let config_path = resolve_config_path(cli);
        let overrides = ConfigOverrides::from(cli);

        let file_config = FileConfig::load_from_file(&config_path)?;
        Self::init_logging(overrides.debug || file_config.debug.unwrap_or(false));
        file_config.warn_unknown_fields();

        let config = AgentConfig::from_file_config(file_config, &overrides)?;
        tracing::debug!(config = ?config, "Configuration loaded");

        let mysql = MysqlService::connect_lazy(&config.mysql);

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            config_path,
            overrides,
            mode: cli.mode(),
            mysql,
        })
    }

    fn init_logging(debug: bool) {
        let level = if debug { "debug" } else { "info" };
        let default_filter = format!("{level},{APP_NAME_LOWER}={level}");

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start(self) -> Result<WorkerExit> {
        // Install signal handlers before the first cycle
        self.shutdown.install_signal_handlers();

        tracing::info!(
            version = AGENT_VERSION,
            mode = %self.mode.mode_type,
            event = self.mode.event.as_deref().unwrap_or(""),
            config = %self.config_path.display(),
            "{} started",
            APP_NAME
        );

        let source: Arc<dyn SqlSource> = Arc::new(self.mysql.pool().clone());
        let gatherers = self.base_gatherers(Arc::clone(&source)).await;
        let configuration_gatherers: Vec<Arc<dyn Gatherer>> =
            vec![Arc::new(MysqlVariablesGatherer::new(source)) as Arc<dyn Gatherer>];
        let repeaters = self.repeater_groups()?;

        let mut worker = Worker::new(
            self.config.clone(),
            Box::new(FileConfigLoader::new(self.overrides.clone())),
            self.config_path.clone(),
            self.mode.clone(),
        )
        .with_gatherers(gatherers)
        .with_configuration_gatherers(configuration_gatherers)
        .with_repeaters(repeaters);

        let exit = worker.run(self.shutdown.wait()).await;

        self.mysql.close().await;
        tracing::debug!(exit = ?exit, "Worker stopped");
        Ok(exit)
    }

    async fn base_gatherers(&self, source: Arc<dyn SqlSource>) -> Vec<Arc<dyn Gatherer>> {
        let mut gatherers: Vec<Arc<dyn Gatherer>> =
            vec![Arc::new(AgentInfoGatherer::new(self.config.hostname.clone())) as Arc<dyn Gatherer>];

        if let Some(ref db) = self.config.aws_rds_db {
            let cloudwatch = CloudWatchSource::new(self.config.aws_region.clone()).await;
            gatherers.push(Arc::new(CloudWatchGatherer::new(Arc::new(cloudwatch), db)));
        } else {
            tracing::debug!("No RDS instance configured, CloudWatch gatherer disabled");
        }

        gatherers.push(Arc::new(QueryLatencyGatherer::new(Arc::clone(&source))));
        gatherers.push(Arc::new(MysqlStatusGatherer::new(source)));
        gatherers
    }

    fn repeater_groups(&self) -> Result<RepeaterGroups> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(API_REQUEST_TIMEOUT_SECS))
            .user_agent(format!("{}/{}", APP_NAME_LOWER, AGENT_VERSION))
            .build()
            .context("Failed to build HTTP client")?;

        let api = |path: &str| -> Vec<Arc<dyn Repeater>> {
            vec![Arc::new(ApiRepeater::new(client.clone(), path)) as Arc<dyn Repeater>]
        };

        let mut groups = RepeaterGroups::new()
            .with_group(GROUP_METRICS, api("metrics"))
            .with_group(GROUP_CONFIGURATIONS, api("configurations"))
            .with_group(GROUP_EVENTS, api("events"));

        if self.config.debug {
            groups.push_all(Arc::new(LogRepeater));
        }

        Ok(groups)
    }
}
