use std::collections::BTreeSet;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Event, Pod};
use kube::api::{DeleteParams, ListParams};
use kube::{Api, Client, ResourceExt};
use time::OffsetDateTime;

use crate::cluster::ClusterDirectory;
use crate::errors::DirectoryError;
use crate::types::{EventRecord, PodPhase, PodRef, PodSnapshot};

/// [`ClusterDirectory`] over the Kubernetes API. `kube::Client` is a shared
/// connection pool, so one instance serves concurrent lookups.
#[derive(Clone)]
pub struct KubeDirectory {
    client: Client,
}

impl KubeDirectory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        if namespace.is_empty() {
            Api::all(self.client.clone())
        } else {
            Api::namespaced(self.client.clone(), namespace)
        }
    }
}

#[async_trait]
impl ClusterDirectory for KubeDirectory {
    async fn list_pending_pods(&self, namespace: &str) -> Result<BTreeSet<PodRef>, DirectoryError> {
        let lp = ListParams::default().fields("status.phase=Pending");
        let pods = self
            .pods(namespace)
            .list(&lp)
            .await
            .map_err(|e| DirectoryError::unavailable("list pending pods", e))?;

        Ok(pods
            .items
            .iter()
            .map(|pod| pod_ref(pod, namespace))
            .collect())
    }

    async fn list_events(&self, pod: &PodRef) -> Result<Vec<EventRecord>, DirectoryError> {
        let api: Api<Event> = Api::namespaced(self.client.clone(), &pod.namespace);
        let lp = ListParams::default().fields(&format!(
            "involvedObject.kind=Pod,involvedObject.name={}",
            pod.name
        ));

        let events = api
            .list(&lp)
            .await
            .map_err(|e| DirectoryError::unavailable("list events", e))?;

        Ok(events.items.iter().map(event_record).collect())
    }

    async fn get_pod(&self, pod: &PodRef) -> Result<PodSnapshot, DirectoryError> {
        let api = self.pods(&pod.namespace);
        match api.get(&pod.name).await {
            Ok(obj) => Ok(snapshot(&obj, pod)),
            Err(e) if is_not_found(&e) => Err(DirectoryError::NotFound(pod.clone())),
            Err(e) => Err(DirectoryError::unavailable("get pod", e)),
        }
    }

    async fn delete_pod(&self, pod: &PodRef) -> Result<(), DirectoryError> {
        let api = self.pods(&pod.namespace);
        map_delete(api.delete(&pod.name, &DeleteParams::default()).await)
    }
}

/// Already gone counts as deleted: the remediation goal is met.
fn map_delete<T>(result: Result<T, kube::Error>) -> Result<(), DirectoryError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if is_not_found(&e) => Ok(()),
        Err(e) => Err(DirectoryError::unavailable("delete pod", e)),
    }
}

fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 404)
}

fn pod_ref(pod: &Pod, fallback_namespace: &str) -> PodRef {
    PodRef {
        namespace: pod
            .namespace()
            .unwrap_or_else(|| fallback_namespace.to_string()),
        name: pod.name_any(),
    }
}

fn event_record(ev: &Event) -> EventRecord {
    EventRecord {
        involved_object_name: ev.involved_object.name.clone().unwrap_or_default(),
        reason: ev.reason.clone().unwrap_or_default(),
        message: ev.message.clone().unwrap_or_default(),
    }
}

fn snapshot(pod: &Pod, requested: &PodRef) -> PodSnapshot {
    let phase = PodPhase::from_status(pod.status.as_ref().and_then(|s| s.phase.as_deref()));

    let owners = pod.owner_references();
    let owner_summary = owners
        .iter()
        .map(|o| format!("{}/{}", o.kind, o.name))
        .collect::<Vec<_>>()
        .join(", ");

    let creation_timestamp = pod
        .metadata
        .creation_timestamp
        .as_ref()
        .and_then(|t| OffsetDateTime::from_unix_timestamp(t.0.timestamp()).ok());

    PodSnapshot {
        pod: pod_ref(pod, &requested.namespace),
        phase,
        has_owner_reference: !owners.is_empty(),
        owner_summary,
        creation_timestamp,
    }
}
