//! Unified error type for the core library.

use thiserror::Error;

pub type TripMeshResult<T> = Result<T, TripMeshError>;

#[derive(Debug, Error)]
pub enum TripMeshError {
    /// Registration-time: a declared task type already belongs to another
    /// enabled agent. Fatal to that registration, all-or-nothing.
    #[error("Capability conflict: {0}")]
    CapabilityConflict(String),

    /// An agent was invoked outside its declared task set.
    #[error("Unsupported task: {0}")]
    UnsupportedTask(String),

    /// Mutation targeted a locked node without an explicit unlock.
    #[error("Node locked: {0}")]
    NodeLocked(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Day not found: {0}")]
    DayNotFound(u32),

    /// Revision persistence failed before commit; the plan is unchanged.
    #[error("Revision persist failure: {0}")]
    RevisionPersistFailure(String),

    /// Wraps classifier/generator/third-party failures.
    #[error("External service failure: {0}")]
    ExternalService(String),

    /// Model output could not be parsed into structured operations.
    /// Recoverable: callers may regenerate before surfacing.
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Agent body panicked; caught at the execution-contract boundary.
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
