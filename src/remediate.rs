//! Re-checks each candidate after the grace window and decides its fate.
//!
//! Rules, applied to a fresh snapshot:
//!
//! 1. gone: `Vanished`
//! 2. no longer `Pending`: `StateChanged`
//! 3. `Pending` without an owner reference: `SkippedNoOwner`, always
//! 4. otherwise delete (`WouldDelete` in dry-run)
//!
//! Candidates are independent. A failure on one never stops the others, and a
//! failed delete is picked up again by the next cycle.

use std::collections::BTreeMap;

use futures::{stream, StreamExt};
use time::OffsetDateTime;

use crate::cluster::ClusterDirectory;
use crate::errors::DirectoryError;
use crate::types::{CandidateSet, Outcome, PodPhase, PodRef};

pub type Outcomes = BTreeMap<PodRef, Outcome>;

pub async fn remediate(
    directory: &dyn ClusterDirectory,
    candidates: &CandidateSet,
    dry_run: bool,
    concurrency: usize,
) -> Outcomes {
    stream::iter(candidates.keys().cloned())
        .map(|pod| async move {
            let outcome = remediate_one(directory, &pod, dry_run).await;
            (pod, outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

async fn remediate_one(directory: &dyn ClusterDirectory, pod: &PodRef, dry_run: bool) -> Outcome {
    let snapshot = match directory.get_pod(pod).await {
        Ok(snapshot) => snapshot,
        Err(DirectoryError::NotFound(_)) => {
            tracing::info!(
                namespace = %pod.namespace,
                pod = %pod.name,
                outcome = "vanished",
                "pod does not exist anymore"
            );
            return Outcome::Vanished;
        }
        Err(err) => {
            tracing::warn!(
                namespace = %pod.namespace,
                pod = %pod.name,
                outcome = "lookup-failed",
                error = %err,
                "cannot re-check pod; leaving it for the next cycle"
            );
            return Outcome::LookupFailed(err.to_string());
        }
    };

    if snapshot.phase != PodPhase::Pending {
        tracing::info!(
            namespace = %pod.namespace,
            pod = %pod.name,
            outcome = "state-changed",
            phase = %snapshot.phase,
            "pod has a new state"
        );
        return Outcome::StateChanged(snapshot.phase);
    }

    if !snapshot.has_owner_reference {
        tracing::info!(
            namespace = %pod.namespace,
            pod = %pod.name,
            outcome = "skipped-no-owner",
            owners = %snapshot.owner_summary,
            "pod has no owner/controller and cannot be deleted"
        );
        return Outcome::SkippedNoOwner;
    }

    let age_secs = snapshot.age_secs(OffsetDateTime::now_utc());

    if dry_run {
        tracing::info!(
            namespace = %pod.namespace,
            pod = %pod.name,
            outcome = "would-delete",
            owners = %snapshot.owner_summary,
            age_secs = ?age_secs,
            "dry run: pod still Pending and would be deleted"
        );
        return Outcome::WouldDelete;
    }

    match directory.delete_pod(pod).await {
        Ok(()) => {
            tracing::info!(
                namespace = %pod.namespace,
                pod = %pod.name,
                outcome = "deleted",
                owners = %snapshot.owner_summary,
                age_secs = ?age_secs,
                "deleted pod"
            );
            Outcome::Deleted
        }
        Err(err) => {
            tracing::error!(
                namespace = %pod.namespace,
                pod = %pod.name,
                outcome = "delete-failed",
                error = %err,
                "pod deletion failed"
            );
            Outcome::DeleteFailed(err.to_string())
        }
    }
}

/// Per-outcome counts for one cycle.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OutcomeTally {
    pub deleted: usize,
    pub would_delete: usize,
    pub skipped_no_owner: usize,
    pub state_changed: usize,
    pub vanished: usize,
    pub delete_failed: usize,
    pub lookup_failed: usize,
}

impl OutcomeTally {
    pub fn from_outcomes(outcomes: &Outcomes) -> Self {
        let mut tally = Self::default();
        for outcome in outcomes.values() {
            tally.record(outcome);
        }
        tally
    }

    pub fn record(&mut self, outcome: &Outcome) {
        let slot = match outcome {
            Outcome::Deleted => &mut self.deleted,
            Outcome::WouldDelete => &mut self.would_delete,
            Outcome::SkippedNoOwner => &mut self.skipped_no_owner,
            Outcome::StateChanged(_) => &mut self.state_changed,
            Outcome::Vanished => &mut self.vanished,
            Outcome::DeleteFailed(_) => &mut self.delete_failed,
            Outcome::LookupFailed(_) => &mut self.lookup_failed,
        };
        *slot += 1;
    }

    pub fn failures(&self) -> usize {
        self.delete_failed + self.lookup_failed
    }
}
