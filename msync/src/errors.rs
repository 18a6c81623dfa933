//! Fatal error taxonomy
//!
//! Startup errors are raised before any copy is dispatched; `CopyFailed` and
//! `PlannerStalled` abort an in-progress synchronization. All of them exit
//! the process with a nonzero status.

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("required executable {path:?} does not exist")]
    MissingExecutable { path: String },

    #[error("source path {path:?} is not a file or directory")]
    SourcePathInvalid { path: String },

    #[error("destination host list is empty")]
    EmptyDestinations,

    #[error("copy from {source_host:?} to {dest_host:?} failed, aborting synchronization")]
    CopyFailed {
        source_host: String,
        dest_host: String,
    },

    #[error("scheduler stalled: {synced} of {total} hosts synced but no copies planned")]
    PlannerStalled { synced: usize, total: usize },
}
