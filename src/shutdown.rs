use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShutdownReason {
    CtrlC,
    Sigterm,
}

/// Shared stop flag for the reconcile loop. Clones observe the same token.
#[derive(Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Marks shutdown as requested and returns `reason` for logging.
    pub fn request(&self, reason: ShutdownReason) -> ShutdownReason {
        self.token.cancel();
        reason
    }
}

/// Resolves on the first of Ctrl+C or SIGTERM and requests shutdown.
/// SIGTERM is what the kubelet sends when the Pod is stopped.
pub async fn wait_for_signal(shutdown: &Shutdown) -> ShutdownReason {
    let reason = tokio::select! {
        _ = ctrl_c() => ShutdownReason::CtrlC,
        _ = sigterm() => ShutdownReason::Sigterm,
    };
    shutdown.request(reason)
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            term.recv().await;
        }
        Err(err) => {
            tracing::warn!(error = %err, "cannot install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn sigterm() {
    std::future::pending::<()>().await;
}
