pub mod cli;
pub mod cluster;
pub mod config;
pub mod dev;
pub mod errors;
pub mod logging;
pub mod matcher;
pub mod reconcile;
pub mod remediate;
pub mod selector;
pub mod shutdown;
pub mod types;

use std::sync::Arc;

use crate::cluster::api::KubeDirectory;
use crate::cluster::client::make_client;
use crate::cluster::ClusterDirectory;
use crate::config::Config;
use crate::errors::AppResult;
use crate::reconcile::Reconciler;
use crate::shutdown::{wait_for_signal, Shutdown};

pub async fn run(config: Config) -> AppResult<()> {
    // Credential failure here is the only fatal error.
    let directory: Arc<dyn ClusterDirectory> = if config.dev_mode {
        tracing::info!("dev mode: using a simulated cluster");
        Arc::new(dev::pods::demo_cluster(&config.namespace, &config.criterion))
    } else {
        let (client, source) = make_client(config.kubeconfig.as_deref()).await?;
        if source.is_in_cluster() {
            tracing::info!("running from INSIDE the cluster");
        } else {
            tracing::info!(source = ?source, "running from OUTSIDE the cluster");
        }
        Arc::new(KubeDirectory::new(client))
    };

    let shutdown = Shutdown::new();
    let signals = shutdown.clone();
    let signal_task = tokio::spawn(async move {
        let reason = wait_for_signal(&signals).await;
        tracing::info!(reason = ?reason, "shutdown requested");
    });

    let reconciler = Reconciler::new(directory, config.reconcile_settings(), shutdown.token());
    let cycles = reconciler.run().await;

    signal_task.abort();
    tracing::info!(cycles, "pod restarter stopped");
    Ok(())
}
