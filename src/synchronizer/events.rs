use crate::form::InitError;
use crate::resources::DependentSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreReason {
    ScopeCleared,
    FetchFailed(String),
}

/// Diagnostics emitted by the synchronizer. Nothing reads these for
/// control flow; dropping the receiver changes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    InitFailed(InitError),
    FieldsReady {
        attempts: u32,
    },
    SnapshotsCaptured {
        counts: DependentSet<usize>,
    },
    ChangeStarted {
        sequence: u64,
        scope: Option<String>,
    },
    RequestSent {
        sequence: u64,
        url: String,
    },
    OptionsApplied {
        sequence: u64,
        counts: DependentSet<usize>,
    },
    Restored {
        sequence: u64,
        reason: RestoreReason,
    },
    Superseded {
        sequence: u64,
        latest: u64,
    },
}

/// Result of running the change protocol once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Scope cleared, snapshots restored without a request.
    Restored,
    /// Response applied; record counts per category.
    Applied(DependentSet<usize>),
    /// Request failed, snapshots restored.
    RestoredAfterFailure,
    /// A newer change was issued before this one resolved.
    Superseded,
}
