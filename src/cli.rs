use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::LogFormat;
use crate::reconcile::DEFAULT_GRACE_WINDOW;

#[derive(Debug, Parser)]
#[command(
    name = "pod-restarter",
    version,
    about = "Deletes Pods stuck in Pending on a known sandbox error so their controller recreates them"
)]
pub struct Cli {
    /// Namespace to watch (empty = all namespaces)
    #[arg(short = 'n', long = "namespace", env = "POD_RESTARTER_NAMESPACE", default_value = "")]
    pub namespace: String,

    /// Seconds between cycle starts
    #[arg(long = "polling-interval", env = "POD_RESTARTER_POLLING_INTERVAL", default_value_t = 10)]
    pub polling_interval: u64,

    /// Event reason to match
    #[arg(long = "reason", env = "POD_RESTARTER_REASON", default_value = "FailedCreatePodSandBox")]
    pub reason: String,

    /// Substring to match within the Event message
    #[arg(
        long = "error-message",
        env = "POD_RESTARTER_ERROR_MESSAGE",
        default_value = "container veth name provided (eth0) already exists"
    )]
    pub error_message: String,

    /// Log what would be deleted without deleting anything
    #[arg(long = "dry-run", env = "POD_RESTARTER_DRY_RUN", default_value_t = false)]
    pub dry_run: bool,

    /// Path to a kubeconfig, used when not running inside a cluster
    #[arg(long = "kubeconfig")]
    pub kubeconfig: Option<PathBuf>,

    /// Seconds to let candidates self heal before re-checking them
    #[arg(
        long = "grace-seconds",
        env = "POD_RESTARTER_GRACE_SECONDS",
        default_value_t = DEFAULT_GRACE_WINDOW.as_secs()
    )]
    pub grace_seconds: u64,

    /// Maximum in-flight API lookups per cycle
    #[arg(long = "concurrency", env = "POD_RESTARTER_CONCURRENCY", default_value_t = 8)]
    pub concurrency: usize,

    /// Stop after this many cycles (0 = run forever)
    #[arg(long = "cycles", env = "POD_RESTARTER_CYCLES", default_value_t = 0)]
    pub cycles: u64,

    /// Log format: human or json
    #[arg(
        long = "log-format",
        env = "POD_RESTARTER_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormatArg::Human
    )]
    pub log_format: LogFormatArg,

    /// Dev mode: simulated cluster, no credentials needed
    #[arg(long = "dev", default_value_t = false)]
    pub dev: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum LogFormatArg {
    Human,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(v: LogFormatArg) -> Self {
        match v {
            LogFormatArg::Human => LogFormat::Human,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
