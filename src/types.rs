use std::collections::BTreeMap;
use std::fmt;

use time::OffsetDateTime;

/// Pod identity. Unique per cluster.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
}

impl PodRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Maps `status.phase`; anything missing or unrecognised is `Unknown`.
    pub fn from_status(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => Self::Pending,
            Some("Running") => Self::Running,
            Some("Succeeded") => Self::Succeeded,
            Some("Failed") => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time read of a Pod. Never cached beyond one decision.
#[derive(Clone, Debug)]
pub struct PodSnapshot {
    pub pod: PodRef,
    pub phase: PodPhase,
    pub has_owner_reference: bool,
    /// Rendered owner references, for logs only.
    pub owner_summary: String,
    pub creation_timestamp: Option<OffsetDateTime>,
}

impl PodSnapshot {
    /// Seconds since creation, if the timestamp is known.
    pub fn age_secs(&self, now: OffsetDateTime) -> Option<i64> {
        self.creation_timestamp
            .map(|created| (now - created).whole_seconds())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EventRecord {
    pub involved_object_name: String,
    pub reason: String,
    pub message: String,
}

/// Reason + message substring identifying the failure to remediate.
#[derive(Clone, Debug)]
pub struct MatchCriterion {
    pub reason: String,
    pub message_substring: String,
}

/// Pods selected this cycle, keyed to the Event that qualified them.
pub type CandidateSet = BTreeMap<PodRef, EventRecord>;

/// What the remediation policy did with one candidate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Pod no longer exists at re-check.
    Vanished,
    /// Pod left `Pending` between selection and re-check.
    StateChanged(PodPhase),
    /// Pending but nothing would recreate it.
    SkippedNoOwner,
    WouldDelete,
    Deleted,
    DeleteFailed(String),
    /// Re-check could not be performed; the next cycle starts over.
    LookupFailed(String),
}
