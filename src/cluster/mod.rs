//! Access to the cluster's Pods and Events.
//!
//! [`ClusterDirectory`] is a thin passthrough: it lists, reads and deletes, and
//! never decides anything. Implementations must be safe for concurrent calls
//! since the selector and the remediation policy fan out over it.

pub mod api;
pub mod client;

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::errors::DirectoryError;
use crate::types::{EventRecord, PodRef, PodSnapshot};

#[async_trait]
pub trait ClusterDirectory: Send + Sync {
    /// Pods currently in phase `Pending`. An empty namespace means all namespaces.
    async fn list_pending_pods(&self, namespace: &str) -> Result<BTreeSet<PodRef>, DirectoryError>;

    /// Events whose involved object is `pod`. No Events is `Ok(vec![])`.
    async fn list_events(&self, pod: &PodRef) -> Result<Vec<EventRecord>, DirectoryError>;

    /// Fresh snapshot. `NotFound` once the Pod is gone.
    async fn get_pod(&self, pod: &PodRef) -> Result<PodSnapshot, DirectoryError>;

    /// Deletes `pod`. A Pod that is already gone counts as deleted.
    async fn delete_pod(&self, pod: &PodRef) -> Result<(), DirectoryError>;
}
