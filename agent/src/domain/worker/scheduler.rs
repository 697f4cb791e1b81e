//! Timer-driven worker loop
//!
//! One task waits on the termination signal and three timers:
//! - collection: base gatherers, dispatched to the `Metrics` group
//! - config reload: replaces the configuration wholesale on success
//! - generate: base + configuration gatherers, dispatched to the mode's group
//!
//! Every timer reset reads its period from the live configuration.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use super::mode::Mode;
use crate::core::config::{AgentConfig, ConfigLoader};
use crate::core::constants::{FIRST_COLLECTION_DELAY_SECS, GROUP_METRICS};
use crate::data::gatherers::Gatherer;
use crate::data::repeaters::RepeaterGroups;
use crate::domain::metrics::{Metrics, collect_metrics, dispatch_metrics};

/// Why the worker loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Termination signal received
    Terminated,
    /// The single generate cycle of a one-shot mode finished
    OneShotComplete,
}

pub struct Worker {
    gatherers: Vec<Arc<dyn Gatherer>>,
    configuration_gatherers: Vec<Arc<dyn Gatherer>>,
    repeaters: RepeaterGroups,
    config: AgentConfig,
    loader: Box<dyn ConfigLoader>,
    config_location: PathBuf,
    mode: Mode,
}

impl Worker {
    pub fn new(
        config: AgentConfig,
        loader: Box<dyn ConfigLoader>,
        config_location: PathBuf,
        mode: Mode,
    ) -> Self {
        Self {
            gatherers: Vec::new(),
            configuration_gatherers: Vec::new(),
            repeaters: RepeaterGroups::new(),
            config,
            loader,
            config_location,
            mode,
        }
    }

    /// Base gatherer set, used by every cycle
    pub fn with_gatherers(mut self, gatherers: Vec<Arc<dyn Gatherer>>) -> Self {
        self.gatherers = gatherers;
        self
    }

    /// Configuration-discovery gatherers, appended for generate cycles only
    pub fn with_configuration_gatherers(mut self, gatherers: Vec<Arc<dyn Gatherer>>) -> Self {
        self.configuration_gatherers = gatherers;
        self
    }

    pub fn with_repeaters(mut self, repeaters: RepeaterGroups) -> Self {
        self.repeaters = repeaters;
        self
    }

    /// The configuration currently in effect
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run until `shutdown` resolves or a one-shot generate cycle completes
    ///
    /// The termination signal is always checked before any timer. A cycle
    /// already in progress is not interrupted by it.
    pub async fn run<F>(&mut self, shutdown: F) -> WorkerExit
    where
        F: Future<Output = ()>,
    {
        let start = Instant::now();
        let first_generate = if self.mode.is_one_shot() {
            start
        } else {
            start + self.config.generate_period()
        };

        let collect = sleep_until(start + Duration::from_secs(FIRST_COLLECTION_DELAY_SECS));
        let reload = sleep_until(start + self.config.read_config_period());
        let generate = sleep_until(first_generate);
        tokio::pin!(shutdown, collect, reload, generate);

        tracing::info!(
            mode = %self.mode.mode_type,
            group = %self.mode.name,
            interval_secs = self.config.interval_seconds,
            "Worker started"
        );

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    tracing::info!("Exiting");
                    return WorkerExit::Terminated;
                }
                _ = &mut collect => {
                    collect.as_mut().reset(Instant::now() + self.config.collection_period());
                    self.run_collection_cycle().await;
                }
                _ = &mut reload => {
                    reload.as_mut().reset(Instant::now() + self.config.read_config_period());
                    self.reload_config();
                }
                _ = &mut generate => {
                    self.run_generate_cycle().await;
                    if self.mode.is_one_shot() {
                        return WorkerExit::OneShotComplete;
                    }
                    generate.as_mut().reset(Instant::now() + self.config.generate_period());
                }
            }
        }
    }

    async fn run_collection_cycle(&self) {
        match collect_metrics(&self.gatherers, self.config.call_timeout()).await {
            Ok(metrics) => self.dispatch(GROUP_METRICS, &metrics).await,
            Err(e) => tracing::warn!(error = %e, "Skipping dispatch, collection failed"),
        }
    }

    async fn run_generate_cycle(&self) {
        tracing::info!("Collecting metrics to recommend a config");

        let gatherers: Vec<Arc<dyn Gatherer>> = self
            .gatherers
            .iter()
            .chain(&self.configuration_gatherers)
            .cloned()
            .collect();

        match collect_metrics(&gatherers, self.config.call_timeout()).await {
            Ok(metrics) => self.dispatch(&self.mode.name, &metrics).await,
            Err(e) => tracing::warn!(error = %e, "Skipping dispatch, collection failed"),
        }
    }

    async fn dispatch(&self, group: &str, metrics: &Metrics) {
        if !self.repeaters.contains(group) {
            tracing::warn!(group, "No repeaters registered for group");
        }

        let report = dispatch_metrics(
            metrics,
            self.repeaters.get(group),
            &self.config,
            self.config.call_timeout(),
        )
        .await;

        tracing::debug!(
            group,
            attempted = report.attempted(),
            delivered = report.delivered,
            failed = report.failed,
            "Dispatch complete"
        );
    }

    fn reload_config(&mut self) {
        match self.loader.load(&self.config_location) {
            Ok(config) => {
                tracing::debug!(
                    path = %self.config_location.display(),
                    api_key = %config.masked_api_key(),
                    "Configuration reloaded"
                );
                self.config = config;
            }
            Err(e) => {
                tracing::error!(
                    path = %self.config_location.display(),
                    error = %e,
                    "Failed to reload configuration"
                );
            }
        }
    }
}
