//! The polling loop.
//!
//! Two states: `Idle` between cycles and `Running` while one cycle is in
//! progress. A cycle is select, grace window, remediate. Cycle starts are
//! spaced by the polling interval; when a cycle takes longer than that, the
//! next one starts immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::cluster::ClusterDirectory;
use crate::remediate::{remediate, OutcomeTally, Outcomes};
use crate::selector::select_candidates;
use crate::types::MatchCriterion;

pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_secs(5);

/// Stand-in deadline when `now + interval` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Clone, Debug)]
pub struct ReconcileSettings {
    /// Empty means all namespaces.
    pub namespace: String,
    pub criterion: MatchCriterion,
    pub dry_run: bool,
    pub polling_interval: Duration,
    pub grace_window: Duration,
    /// Bound on in-flight directory lookups within one cycle.
    pub concurrency: usize,
    /// Stop after this many completed cycles. `None` runs until cancelled.
    pub max_cycles: Option<u64>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Result of one cycle.
#[derive(Clone, Debug, Default)]
pub struct CycleReport {
    pub candidates: usize,
    pub outcomes: Outcomes,
    pub tally: OutcomeTally,
    /// The Pending list could not be read; nothing else happened.
    pub listing_failed: bool,
    /// Shutdown arrived during the grace window; remediation was skipped.
    pub aborted: bool,
}

pub struct Reconciler {
    directory: Arc<dyn ClusterDirectory>,
    settings: ReconcileSettings,
    shutdown: CancellationToken,
}

impl Reconciler {
    pub fn new(
        directory: Arc<dyn ClusterDirectory>,
        settings: ReconcileSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            directory,
            settings,
            shutdown,
        }
    }

    /// Runs cycles until cancelled or `max_cycles` is reached. Returns the
    /// number of cycles that ran to completion.
    pub async fn run(&self) -> u64 {
        let interval = self.settings.polling_interval;
        tracing::info!(
            polling_interval_secs = interval.as_secs(),
            grace_secs = self.settings.grace_window.as_secs(),
            dry_run = self.settings.dry_run,
            namespace = %display_namespace(&self.settings.namespace),
            "running every {} seconds",
            interval.as_secs()
        );
        if interval < self.settings.grace_window {
            tracing::warn!(
                "polling interval is shorter than the grace window; cycles will run back-to-back"
            );
        }

        let mut state = LoopState::Idle;
        let mut next_start = Instant::now();
        let mut completed: u64 = 0;

        loop {
            match state {
                LoopState::Idle => {
                    if self.settings.max_cycles.is_some_and(|max| completed >= max) {
                        break;
                    }
                    let idle = next_start.saturating_duration_since(Instant::now());
                    if !sleep_or_cancel(idle, &self.shutdown).await {
                        break;
                    }
                    state = LoopState::Running;
                }
                LoopState::Running => {
                    next_start = deadline_after(interval);
                    let cycle = completed + 1;

                    let report = self
                        .run_cycle()
                        .instrument(tracing::info_span!("cycle", n = cycle))
                        .await;
                    if report.aborted {
                        break;
                    }
                    completed = cycle;

                    if Instant::now() >= next_start {
                        tracing::debug!(cycle, "cycle overran the polling interval");
                    }
                    state = LoopState::Idle;
                }
            }
        }

        completed
    }

    /// One select, wait, remediate pass. Per-pod failures are logged and
    /// counted; they never fail the cycle.
    pub async fn run_cycle(&self) -> CycleReport {
        let settings = &self.settings;

        let candidates = match select_candidates(
            self.directory.as_ref(),
            &settings.namespace,
            &settings.criterion,
            settings.concurrency,
        )
        .await
        {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::error!(error = %err, "could not get a list of Pending pods");
                return CycleReport {
                    listing_failed: true,
                    ..Default::default()
                };
            }
        };

        tracing::debug!(
            candidates = candidates.len(),
            grace_secs = settings.grace_window.as_secs(),
            "allowing pending pods time to self heal"
        );
        if !sleep_or_cancel(settings.grace_window, &self.shutdown).await {
            tracing::info!(
                candidates = candidates.len(),
                "shutdown during grace window; abandoning cycle"
            );
            return CycleReport {
                candidates: candidates.len(),
                aborted: true,
                ..Default::default()
            };
        }
        if !candidates.is_empty() {
            tracing::info!(
                candidates = candidates.len(),
                outcome = "grace-waited",
                "grace window elapsed; re-checking candidates"
            );
        }

        let outcomes = remediate(
            self.directory.as_ref(),
            &candidates,
            settings.dry_run,
            settings.concurrency,
        )
        .await;
        let tally = OutcomeTally::from_outcomes(&outcomes);

        tracing::info!(
            candidates = candidates.len(),
            deleted = tally.deleted,
            would_delete = tally.would_delete,
            skipped_no_owner = tally.skipped_no_owner,
            state_changed = tally.state_changed,
            vanished = tally.vanished,
            failed = tally.failures(),
            "cycle complete"
        );

        CycleReport {
            candidates: candidates.len(),
            outcomes,
            tally,
            listing_failed: false,
            aborted: false,
        }
    }
}

/// Sleeps for `d` unless cancelled first. Returns false on cancellation.
async fn sleep_or_cancel(d: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = sleep(d) => true,
    }
}

fn deadline_after(d: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(d)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

fn display_namespace(namespace: &str) -> &str {
    if namespace.is_empty() {
        "<all>"
    } else {
        namespace
    }
}
