use time::{Duration, OffsetDateTime};

use crate::dev::directory::{SimPod, SimulatedDirectory};
use crate::types::{MatchCriterion, PodPhase};

/// A small cluster exercising every remediation path. Matching Events are
/// built from `criterion` so the flow shows up whatever the flags say.
pub fn demo_cluster(namespace: &str, criterion: &MatchCriterion) -> SimulatedDirectory {
    let ns = if namespace.is_empty() {
        "default"
    } else {
        namespace
    };

    let sandbox_error = format!(
        "Failed to create pod sandbox: rpc error: code = Unknown desc = \
         failed to setup network for sandbox: {}",
        criterion.message_substring
    );
    let reason = criterion.reason.as_str();
    let created = OffsetDateTime::now_utc() - Duration::minutes(3);

    tracing::info!(namespace = %ns, "seeding dev-mode cluster");

    SimulatedDirectory::new()
        // Wedged and owned: deleted.
        .with_pod(
            ns,
            "web-5f7c9-x2k4p",
            SimPod::pending()
                .owned_by("ReplicaSet/web-5f7c9")
                .created_at(created)
                .event("Scheduled", "Successfully assigned pod to node-1")
                .event(reason, sandbox_error.as_str()),
        )
        // Wedged but nothing would recreate it: skipped.
        .with_pod(
            ns,
            "debug-shell",
            SimPod::pending().event(reason, sandbox_error.as_str()),
        )
        // Recovers during the grace window.
        .with_pod(
            ns,
            "api-6b8d4-q9m2z",
            SimPod::pending()
                .owned_by("ReplicaSet/api-6b8d4")
                .event(reason, sandbox_error.as_str())
                .then_phase(PodPhase::Running),
        )
        // Removed by its controller before re-check.
        .with_pod(
            ns,
            "batch-28461-7xk2l",
            SimPod::pending()
                .owned_by("Job/batch-28461")
                .event(reason, sandbox_error.as_str())
                .then_vanish(),
        )
        // Pending for an unrelated reason.
        .with_pod(
            ns,
            "cache-0",
            SimPod::pending()
                .owned_by("StatefulSet/cache")
                .event("FailedScheduling", "0/3 nodes are available: 3 Insufficient memory."),
        )
        // Not Pending, so never listed.
        .with_pod(
            ns,
            "worker-9c7d2-r5t8w",
            SimPod::new(PodPhase::Running)
                .owned_by("ReplicaSet/worker-9c7d2")
                .event(reason, sandbox_error.as_str()),
        )
}
