use futures::{stream, StreamExt};

use crate::cluster::ClusterDirectory;
use crate::errors::DirectoryError;
use crate::matcher::first_match;
use crate::types::{CandidateSet, MatchCriterion};

/// Pending Pods in `namespace` with at least one Event matching `criterion`.
///
/// Fails only when the Pending list itself cannot be read. A Pod whose Event
/// lookup fails is left out of this cycle; a failed lookup is not a match.
pub async fn select_candidates(
    directory: &dyn ClusterDirectory,
    namespace: &str,
    criterion: &MatchCriterion,
    concurrency: usize,
) -> Result<CandidateSet, DirectoryError> {
    let pending = directory.list_pending_pods(namespace).await?;
    let total = pending.len();
    tracing::info!(pending = total, "{total} pods in Pending state");

    for pod in &pending {
        tracing::info!(
            namespace = %pod.namespace,
            pod = %pod.name,
            "pod is in Pending state"
        );
    }

    let candidates: CandidateSet = stream::iter(pending)
        .map(|pod| async move {
            match directory.list_events(&pod).await {
                Ok(events) => {
                    let Some(hit) = first_match(&events, criterion).cloned() else {
                        return None;
                    };
                    tracing::info!(
                        namespace = %pod.namespace,
                        pod = %pod.name,
                        outcome = "selected",
                        event_reason = %hit.reason,
                        event_message = %hit.message,
                        "pod matched error criterion"
                    );
                    Some((pod, hit))
                }
                Err(err) => {
                    tracing::warn!(
                        namespace = %pod.namespace,
                        pod = %pod.name,
                        error = %err,
                        "event lookup failed; skipping pod this cycle"
                    );
                    None
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter_map(|hit| async move { hit })
        .collect()
        .await;

    tracing::info!(
        matched = candidates.len(),
        pending = total,
        reason = %criterion.reason,
        error_message = %criterion.message_substring,
        "{}/{} pending pods matched error criterion",
        candidates.len(),
        total
    );

    Ok(candidates)
}
