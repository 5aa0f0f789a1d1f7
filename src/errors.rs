use thiserror::Error;

use crate::types::PodRef;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Cli(String),

    #[error("cluster credentials: {0}")]
    Credentials(String),
}

/// Failures surfaced by a [`crate::cluster::ClusterDirectory`].
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("{operation} failed: {reason}")]
    Unavailable {
        operation: &'static str,
        reason: String,
    },

    #[error("pod {0} not found")]
    NotFound(PodRef),
}

impl DirectoryError {
    pub fn unavailable(operation: &'static str, reason: impl ToString) -> Self {
        Self::Unavailable {
            operation,
            reason: reason.to_string(),
        }
    }
}
