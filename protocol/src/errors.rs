//! Protocol-wide error types.

use thiserror::Error;

use crate::types::ProjectId;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A required field is missing or zero-valued, or a recomputed deadline
    /// already lies in the past.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The identifier is absent from the store.
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// A status string that is not one of the recognised values.
    #[error("unrecognised status: {0:?}")]
    InvalidStatus(String),

    /// Contribution attempted against a terminal or deadline-passed project.
    #[error("project is no longer accepting contributions")]
    ProjectExpired,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("record codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Unexpected internal failure, e.g. identifier-space exhaustion.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
