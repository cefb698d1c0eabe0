//! # Types
//!
//! Shared data structures used across the protocol crate.
//!
//! ## Status as a Finite-State Machine
//!
//! [`ProjectStatus`] models the project lifecycle:
//!
//! ```text
//! Funding ──(contribution while open)──► Funding
//! Funding ──(deadline passed, detected on a contribution attempt)──► Expired
//! Funding ──(explicit status write)──► Successful | Expired
//! ```
//!
//! `Successful` and `Expired` are terminal for the contribution path: both
//! reject further contributions. An explicit status write is unconditional
//! and may reassign any status, including moving a project back out of a
//! terminal state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

/// Opaque unique project identifier: 32 lowercase hex characters encoding
/// 128 bits of randomness. Immutable once assigned.
pub type ProjectId = String;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    /// Accepting contributions until the deadline.
    Funding,
    /// Marked successful by an explicit status write.
    Successful,
    /// Deadline passed, or cancelled.
    Expired,
}

impl ProjectStatus {
    /// Parse an external status string into the closed enum.
    /// Returns `None` for anything but the three recognised values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Funding" => Some(Self::Funding),
            "Successful" => Some(Self::Successful),
            "Expired" => Some(Self::Expired),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Funding => "Funding",
            Self::Successful => "Successful",
            Self::Expired => "Expired",
        }
    }

    /// Terminal states reject further contributions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Successful | Self::Expired)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A crowdfunding project record.
///
/// The store owns the record; the engine re-reads it before every mutation
/// and writes the whole record back under the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier, primary key of the store.
    pub id: ProjectId,
    /// Who created the project.
    pub creator: String,
    pub title: String,
    pub description: String,
    /// Target amount. Informational: contributions are not capped by it.
    pub goal_amount: u64,
    /// Running total of all contributions. Never decreases.
    pub raised_amount: u64,
    /// Unix seconds, fixed at creation.
    pub start_time: u64,
    /// Unix seconds; `start_time + duration`, recomputed on detail update.
    pub deadline: u64,
    /// Append-only contribution log, one entry per accepted contribution.
    /// Names repeat for repeat contributors; amounts are only tracked in
    /// aggregate via `raised_amount`.
    pub contributors: Vec<String>,
    pub status: ProjectStatus,
}

/// Creation / detail-update payload.
///
/// Every field is required and must be non-empty / non-zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub goal_amount: u64,
    /// Funding window in seconds, measured from `start_time`.
    pub duration: u64,
    pub creator: String,
}

impl ProjectDraft {
    /// Field-presence validation shared by creation and detail update.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.title.is_empty() {
            return Err(ProtocolError::InvalidPayload("missing field: title".into()));
        }
        if self.description.is_empty() {
            return Err(ProtocolError::InvalidPayload(
                "missing field: description".into(),
            ));
        }
        if self.creator.is_empty() {
            return Err(ProtocolError::InvalidPayload(
                "missing field: creator".into(),
            ));
        }
        if self.goal_amount == 0 {
            return Err(ProtocolError::InvalidPayload(
                "goal_amount must be non-zero".into(),
            ));
        }
        if self.duration == 0 {
            return Err(ProtocolError::InvalidPayload(
                "duration must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
