use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::cluster::ClusterDirectory;
use crate::errors::DirectoryError;
use crate::types::{EventRecord, PodPhase, PodRef, PodSnapshot};

/// Change applied the first time a Pod is re-fetched with `get_pod`.
#[derive(Clone, Copy, Debug)]
enum Recheck {
    Phase(PodPhase),
    Vanish,
}

/// A Pod in the simulated cluster.
#[derive(Clone, Debug)]
pub struct SimPod {
    phase: PodPhase,
    owners: Vec<String>,
    events: Vec<(String, String)>,
    created: Option<OffsetDateTime>,
    on_recheck: Option<Recheck>,
    events_unavailable: bool,
    delete_fails: bool,
}

impl SimPod {
    pub fn new(phase: PodPhase) -> Self {
        Self {
            phase,
            owners: Vec::new(),
            events: Vec::new(),
            created: None,
            on_recheck: None,
            events_unavailable: false,
            delete_fails: false,
        }
    }

    pub fn pending() -> Self {
        Self::new(PodPhase::Pending)
    }

    /// Adds an owner reference, rendered as `Kind/name`.
    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owners.push(owner.into());
        self
    }

    pub fn event(mut self, reason: impl Into<String>, message: impl Into<String>) -> Self {
        self.events.push((reason.into(), message.into()));
        self
    }

    pub fn created_at(mut self, ts: OffsetDateTime) -> Self {
        self.created = Some(ts);
        self
    }

    /// Phase reported from the first re-fetch onwards.
    pub fn then_phase(mut self, phase: PodPhase) -> Self {
        self.on_recheck = Some(Recheck::Phase(phase));
        self
    }

    /// Pod disappears before it is re-fetched.
    pub fn then_vanish(mut self) -> Self {
        self.on_recheck = Some(Recheck::Vanish);
        self
    }

    pub fn events_unavailable(mut self) -> Self {
        self.events_unavailable = true;
        self
    }

    pub fn delete_fails(mut self) -> Self {
        self.delete_fails = true;
        self
    }
}

#[derive(Default)]
struct SimState {
    pods: BTreeMap<PodRef, SimPod>,
    delete_calls: Vec<PodRef>,
    listing_unavailable: bool,
}

/// In-memory [`ClusterDirectory`]. Records every delete call it receives.
#[derive(Default)]
pub struct SimulatedDirectory {
    state: Mutex<SimState>,
}

impl SimulatedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pod(mut self, namespace: &str, name: &str, pod: SimPod) -> Self {
        self.state
            .get_mut()
            .pods
            .insert(PodRef::new(namespace, name), pod);
        self
    }

    /// Every `list_pending_pods` call fails.
    pub fn listing_unavailable(mut self) -> Self {
        self.state.get_mut().listing_unavailable = true;
        self
    }

    pub async fn delete_calls(&self) -> Vec<PodRef> {
        self.state.lock().await.delete_calls.clone()
    }

    pub async fn contains(&self, pod: &PodRef) -> bool {
        self.state.lock().await.pods.contains_key(pod)
    }

    pub async fn set_phase(&self, pod: &PodRef, phase: PodPhase) {
        if let Some(sim) = self.state.lock().await.pods.get_mut(pod) {
            sim.phase = phase;
        }
    }

    pub async fn remove(&self, pod: &PodRef) {
        self.state.lock().await.pods.remove(pod);
    }
}

#[async_trait]
impl ClusterDirectory for SimulatedDirectory {
    async fn list_pending_pods(&self, namespace: &str) -> Result<BTreeSet<PodRef>, DirectoryError> {
        let state = self.state.lock().await;
        if state.listing_unavailable {
            return Err(DirectoryError::unavailable(
                "list pending pods",
                "simulated API outage",
            ));
        }

        Ok(state
            .pods
            .iter()
            .filter(|(pod, sim)| {
                sim.phase == PodPhase::Pending
                    && (namespace.is_empty() || pod.namespace == namespace)
            })
            .map(|(pod, _)| pod.clone())
            .collect())
    }

    async fn list_events(&self, pod: &PodRef) -> Result<Vec<EventRecord>, DirectoryError> {
        let state = self.state.lock().await;
        let Some(sim) = state.pods.get(pod) else {
            return Ok(Vec::new());
        };
        if sim.events_unavailable {
            return Err(DirectoryError::unavailable(
                "list events",
                "simulated API outage",
            ));
        }

        Ok(sim
            .events
            .iter()
            .map(|(reason, message)| EventRecord {
                involved_object_name: pod.name.clone(),
                reason: reason.clone(),
                message: message.clone(),
            })
            .collect())
    }

    async fn get_pod(&self, pod: &PodRef) -> Result<PodSnapshot, DirectoryError> {
        let mut state = self.state.lock().await;
        let recheck = state
            .pods
            .get_mut(pod)
            .ok_or_else(|| DirectoryError::NotFound(pod.clone()))?
            .on_recheck
            .take();

        if matches!(recheck, Some(Recheck::Vanish)) {
            state.pods.remove(pod);
            return Err(DirectoryError::NotFound(pod.clone()));
        }

        let Some(sim) = state.pods.get_mut(pod) else {
            return Err(DirectoryError::NotFound(pod.clone()));
        };
        if let Some(Recheck::Phase(phase)) = recheck {
            sim.phase = phase;
        }

        Ok(PodSnapshot {
            pod: pod.clone(),
            phase: sim.phase,
            has_owner_reference: !sim.owners.is_empty(),
            owner_summary: sim.owners.join(", "),
            creation_timestamp: sim.created,
        })
    }

    async fn delete_pod(&self, pod: &PodRef) -> Result<(), DirectoryError> {
        let mut state = self.state.lock().await;
        state.delete_calls.push(pod.clone());

        if state.pods.get(pod).is_some_and(|sim| sim.delete_fails) {
            return Err(DirectoryError::unavailable(
                "delete pod",
                "simulated API outage",
            ));
        }
        state.pods.remove(pod);
        Ok(())
    }
}
