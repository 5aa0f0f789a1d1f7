use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::errors::{AppError, AppResult};
use crate::reconcile::ReconcileSettings;
use crate::types::MatchCriterion;

/// Upper bound for `--polling-interval` and `--grace-seconds`.
pub const MAX_WAIT_SECS: u64 = 86_400;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Human,
    Json,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub namespace: String,
    pub criterion: MatchCriterion,
    pub dry_run: bool,

    pub polling_interval: Duration,
    pub grace_window: Duration,
    pub concurrency: usize,
    pub max_cycles: Option<u64>,

    pub kubeconfig: Option<PathBuf>,
    pub dev_mode: bool,
    pub log_format: LogFormat,
}

impl Config {
    pub fn reconcile_settings(&self) -> ReconcileSettings {
        ReconcileSettings {
            namespace: self.namespace.clone(),
            criterion: self.criterion.clone(),
            dry_run: self.dry_run,
            polling_interval: self.polling_interval,
            grace_window: self.grace_window,
            concurrency: self.concurrency,
            max_cycles: self.max_cycles,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = AppError;

    fn try_from(cli: Cli) -> AppResult<Self> {
        // An empty substring would match every Event with the reason.
        if cli.error_message.is_empty() {
            return Err(AppError::Cli("--error-message must not be empty".to_string()));
        }
        if cli.reason.is_empty() {
            return Err(AppError::Cli("--reason must not be empty".to_string()));
        }
        if cli.polling_interval == 0 {
            return Err(AppError::Cli(
                "--polling-interval must be at least 1 second".to_string(),
            ));
        }
        if cli.polling_interval > MAX_WAIT_SECS {
            return Err(AppError::Cli(format!(
                "--polling-interval must be at most {MAX_WAIT_SECS} seconds"
            )));
        }
        if cli.grace_seconds > MAX_WAIT_SECS {
            return Err(AppError::Cli(format!(
                "--grace-seconds must be at most {MAX_WAIT_SECS} seconds"
            )));
        }
        if cli.concurrency == 0 {
            return Err(AppError::Cli("--concurrency must be at least 1".to_string()));
        }

        Ok(Self {
            namespace: cli.namespace.trim().to_string(),
            criterion: MatchCriterion::new(cli.reason, cli.error_message),
            dry_run: cli.dry_run,

            polling_interval: Duration::from_secs(cli.polling_interval),
            grace_window: Duration::from_secs(cli.grace_seconds),
            concurrency: cli.concurrency,
            max_cycles: (cli.cycles > 0).then_some(cli.cycles),

            kubeconfig: cli.kubeconfig,
            dev_mode: cli.dev,
            log_format: cli.log_format.into(),
        })
    }
}
