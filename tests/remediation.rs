use std::sync::Arc;

use pod_restarter::cluster::ClusterDirectory;
use pod_restarter::dev::{SimPod, SimulatedDirectory};
use pod_restarter::remediate::remediate;
use pod_restarter::selector::select_candidates;
use pod_restarter::types::{MatchCriterion, Outcome, PodPhase, PodRef};

const REASON: &str = "FailedCreatePodSandBox";
const VETH: &str = "container veth name provided (eth0) already exists";

fn criterion() -> MatchCriterion {
    MatchCriterion::new(REASON, VETH)
}

fn wedged() -> SimPod {
    SimPod::pending().event(REASON, VETH)
}

/// Select then remediate, with no grace window in between.
async fn cycle(dir: &SimulatedDirectory, dry_run: bool) -> Vec<(PodRef, Outcome)> {
    let candidates = select_candidates(dir, "", &criterion(), 4).await.unwrap();
    remediate(dir, &candidates, dry_run, 4)
        .await
        .into_iter()
        .collect()
}

#[tokio::test]
async fn scenario_a_owned_pending_pod_is_deleted() {
    let dir = SimulatedDirectory::new().with_pod("ns1", "p1", wedged().owned_by("ReplicaSet/web"));
    let p1 = PodRef::new("ns1", "p1");

    let outcomes = cycle(&dir, false).await;

    assert_eq!(outcomes, vec![(p1.clone(), Outcome::Deleted)]);
    assert_eq!(dir.delete_calls().await, vec![p1.clone()]);
    assert!(!dir.contains(&p1).await);
}

#[tokio::test]
async fn scenario_b_unowned_pod_is_never_deleted() {
    let dir = SimulatedDirectory::new().with_pod("ns1", "p2", wedged());

    for dry_run in [false, true] {
        let outcomes = cycle(&dir, dry_run).await;
        assert_eq!(
            outcomes,
            vec![(PodRef::new("ns1", "p2"), Outcome::SkippedNoOwner)]
        );
    }
    assert!(dir.delete_calls().await.is_empty());
}

#[tokio::test]
async fn scenario_c_recovered_pod_reports_new_state() {
    let dir = SimulatedDirectory::new().with_pod(
        "ns1",
        "p3",
        wedged()
            .owned_by("ReplicaSet/web")
            .then_phase(PodPhase::Running),
    );

    let outcomes = cycle(&dir, false).await;

    assert_eq!(
        outcomes,
        vec![(
            PodRef::new("ns1", "p3"),
            Outcome::StateChanged(PodPhase::Running)
        )]
    );
    assert!(dir.delete_calls().await.is_empty());
}

#[tokio::test]
async fn scenario_d_vanished_pod_needs_no_action() {
    let dir = SimulatedDirectory::new().with_pod(
        "ns1",
        "p4",
        wedged().owned_by("Job/batch").then_vanish(),
    );

    let outcomes = cycle(&dir, false).await;

    assert_eq!(outcomes, vec![(PodRef::new("ns1", "p4"), Outcome::Vanished)]);
    assert!(dir.delete_calls().await.is_empty());
}

#[tokio::test]
async fn scenario_e_dry_run_never_deletes() {
    let dir = SimulatedDirectory::new().with_pod("ns1", "p5", wedged().owned_by("ReplicaSet/web"));
    let p5 = PodRef::new("ns1", "p5");

    let outcomes = cycle(&dir, true).await;

    assert_eq!(outcomes, vec![(p5.clone(), Outcome::WouldDelete)]);
    assert!(dir.delete_calls().await.is_empty());
    assert!(dir.contains(&p5).await);
}

#[tokio::test]
async fn phase_change_after_selection_blocks_delete() {
    let dir = SimulatedDirectory::new().with_pod("ns1", "p3", wedged().owned_by("ReplicaSet/web"));
    let p3 = PodRef::new("ns1", "p3");

    let candidates = select_candidates(&dir, "", &criterion(), 1).await.unwrap();
    assert!(candidates.contains_key(&p3));

    dir.set_phase(&p3, PodPhase::Running).await;
    let outcomes = remediate(&dir, &candidates, false, 1).await;

    assert_eq!(outcomes.get(&p3), Some(&Outcome::StateChanged(PodPhase::Running)));
    assert!(dir.delete_calls().await.is_empty());
}

#[tokio::test]
async fn selection_excludes_pods_that_are_not_pending() {
    let dir = SimulatedDirectory::new()
        .with_pod(
            "ns1",
            "running",
            SimPod::new(PodPhase::Running)
                .owned_by("ReplicaSet/web")
                .event(REASON, VETH),
        )
        .with_pod(
            "ns1",
            "failed",
            SimPod::new(PodPhase::Failed).event(REASON, VETH),
        );

    let candidates = select_candidates(&dir, "", &criterion(), 2).await.unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn selection_records_triggering_event_and_ignores_unrelated_pods() {
    let dir = SimulatedDirectory::new()
        .with_pod("ns1", "p1", wedged().owned_by("ReplicaSet/web"))
        .with_pod(
            "ns1",
            "cache-0",
            SimPod::pending().event("FailedScheduling", "0/3 nodes are available"),
        )
        .with_pod("ns1", "quiet", SimPod::pending());

    let candidates = select_candidates(&dir, "", &criterion(), 2).await.unwrap();

    assert_eq!(candidates.len(), 1);
    let event = &candidates[&PodRef::new("ns1", "p1")];
    assert_eq!(event.reason, REASON);
    assert_eq!(event.involved_object_name, "p1");
}

#[tokio::test]
async fn selection_is_scoped_to_namespace() {
    let dir = SimulatedDirectory::new()
        .with_pod("ns1", "p1", wedged().owned_by("ReplicaSet/web"))
        .with_pod("ns2", "p1", wedged().owned_by("ReplicaSet/web"));

    let scoped = select_candidates(&dir, "ns2", &criterion(), 2).await.unwrap();
    let all = select_candidates(&dir, "", &criterion(), 2).await.unwrap();

    assert_eq!(scoped.keys().collect::<Vec<_>>(), vec![&PodRef::new("ns2", "p1")]);
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn failed_event_lookup_is_not_a_match() {
    let dir = SimulatedDirectory::new()
        .with_pod(
            "ns1",
            "flaky",
            wedged().owned_by("ReplicaSet/web").events_unavailable(),
        )
        .with_pod("ns1", "p1", wedged().owned_by("ReplicaSet/web"));

    let candidates = select_candidates(&dir, "", &criterion(), 2).await.unwrap();

    assert_eq!(candidates.keys().collect::<Vec<_>>(), vec![&PodRef::new("ns1", "p1")]);
}

#[tokio::test]
async fn listing_failure_fails_selection() {
    let dir = SimulatedDirectory::new()
        .with_pod("ns1", "p1", wedged().owned_by("ReplicaSet/web"))
        .listing_unavailable();

    assert!(select_candidates(&dir, "", &criterion(), 2).await.is_err());
}

#[tokio::test]
async fn one_failed_delete_does_not_stop_the_others() {
    let dir = SimulatedDirectory::new()
        .with_pod("ns1", "a", wedged().owned_by("ReplicaSet/web").delete_fails())
        .with_pod("ns1", "b", wedged().owned_by("ReplicaSet/web"))
        .with_pod("ns1", "c", wedged());

    let outcomes = cycle(&dir, false).await;

    assert!(matches!(outcomes[0], (ref pod, Outcome::DeleteFailed(_)) if pod.name == "a"));
    assert_eq!(outcomes[1], (PodRef::new("ns1", "b"), Outcome::Deleted));
    assert_eq!(outcomes[2], (PodRef::new("ns1", "c"), Outcome::SkippedNoOwner));
    assert_eq!(dir.delete_calls().await.len(), 2);
}

#[tokio::test]
async fn deleting_an_already_deleted_pod_succeeds() {
    let dir: Arc<dyn ClusterDirectory> = Arc::new(
        SimulatedDirectory::new().with_pod("ns1", "p1", wedged().owned_by("ReplicaSet/web")),
    );
    let p1 = PodRef::new("ns1", "p1");

    assert!(dir.delete_pod(&p1).await.is_ok());
    assert!(dir.delete_pod(&p1).await.is_ok());
}

#[tokio::test]
async fn pod_gone_after_selection_is_vanished_not_an_error() {
    let dir = SimulatedDirectory::new().with_pod("ns1", "p4", wedged().owned_by("ReplicaSet/web"));
    let p4 = PodRef::new("ns1", "p4");

    let candidates = select_candidates(&dir, "", &criterion(), 1).await.unwrap();
    dir.remove(&p4).await;
    let outcomes = remediate(&dir, &candidates, false, 1).await;

    assert_eq!(outcomes.get(&p4), Some(&Outcome::Vanished));
}
