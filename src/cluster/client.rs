use std::path::Path;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::errors::{AppError, AppResult};

/// Where the client's credentials came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CredentialSource {
    InCluster,
    Kubeconfig,
    Inferred,
}

impl CredentialSource {
    pub fn is_in_cluster(&self) -> bool {
        matches!(self, Self::InCluster)
    }
}

/// In-cluster service account first; otherwise the given kubeconfig, or
/// whatever kube infers (`KUBECONFIG`, `~/.kube/config`).
pub async fn make_client(kubeconfig: Option<&Path>) -> AppResult<(Client, CredentialSource)> {
    let (config, source) = match Config::incluster() {
        Ok(config) => (config, CredentialSource::InCluster),
        Err(err) => {
            tracing::debug!(error = %err, "in-cluster config unavailable");
            match kubeconfig {
                Some(path) => {
                    let kc = Kubeconfig::read_from(path).map_err(|e| {
                        AppError::Credentials(format!(
                            "kubeconfig {} cannot be loaded: {e}",
                            path.display()
                        ))
                    })?;
                    let config = Config::from_custom_kubeconfig(kc, &KubeConfigOptions::default())
                        .await
                        .map_err(|e| AppError::Credentials(format!("invalid kubeconfig: {e}")))?;
                    (config, CredentialSource::Kubeconfig)
                }
                None => {
                    let config = Config::infer()
                        .await
                        .map_err(|e| AppError::Credentials(e.to_string()))?;
                    (config, CredentialSource::Inferred)
                }
            }
        }
    };

    let client = Client::try_from(config)
        .map_err(|e| AppError::Credentials(format!("client cannot be created: {e}")))?;

    Ok((client, source))
}
