//! # Registry
//!
//! The project lifecycle engine. Every public operation reads at most one
//! record from the store, applies the lifecycle rules (consulting the clock
//! where deadlines matter), and writes back at most one record. There is no
//! cross-record coordination, and the engine never keeps a record across
//! calls: each operation re-reads before mutating.
//!
//! Expiry is lazy: a project whose deadline has passed stays `Funding` in
//! storage until the next contribution attempt touches it. Nothing is
//! scheduled.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::clock::Clock;
use crate::errors::{ProtocolError, Result};
use crate::ident;
use crate::store::ProjectStore;
use crate::types::{Project, ProjectDraft, ProjectStatus};

/// The lifecycle engine.
///
/// Mutating operations serialize on one internal lock, so each executes as
/// an atomic read-modify-write unit even under a concurrent caller. Reads
/// go straight to the store.
pub struct ProjectRegistry {
    store: ProjectStore,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl ProjectRegistry {
    pub fn new(store: ProjectStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a project from a validated draft.
    ///
    /// Allocates a fresh identifier, stamps `start_time = now` and
    /// `deadline = now + duration`, and inserts the record. On failure the
    /// store is untouched.
    pub async fn create_project(&self, draft: ProjectDraft) -> Result<Project> {
        draft.validate()?;

        let _guard = self.write_lock.lock().await;
        let id = ident::allocate(&self.store).await?;
        let now = self.clock.now();
        let deadline = now.checked_add(draft.duration).ok_or_else(|| {
            ProtocolError::InvalidPayload("duration overflows deadline".into())
        })?;

        let project = Project {
            id,
            creator: draft.creator,
            title: draft.title,
            description: draft.description,
            goal_amount: draft.goal_amount,
            raised_amount: 0,
            start_time: now,
            deadline,
            contributors: Vec::new(),
            status: ProjectStatus::Funding,
        };

        self.store.insert(&project).await?;
        info!("project {} created by {}", project.id, project.creator);
        Ok(project)
    }

    /// Apply a contribution.
    ///
    /// Ordered checks, first match wins: unknown id fails `NotFound`; a
    /// terminal status fails `ProjectExpired`; a passed deadline writes
    /// `Expired` back to the store and still fails `ProjectExpired` (the
    /// transition persists even though the call does not). Otherwise the
    /// amount is added and the contributor appended.
    pub async fn contribute(
        &self,
        id: &str,
        contributor: &str,
        amount: u64,
    ) -> Result<Project> {
        if contributor.is_empty() {
            return Err(ProtocolError::InvalidPayload(
                "missing field: contributor".into(),
            ));
        }
        if amount == 0 {
            return Err(ProtocolError::InvalidPayload(
                "amount must be non-zero".into(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut project = self.lookup(id).await?;

        if project.status.is_terminal() {
            return Err(ProtocolError::ProjectExpired);
        }

        if self.clock.now() >= project.deadline {
            project.status = ProjectStatus::Expired;
            self.store.insert(&project).await?;
            info!("project {} expired on contribution attempt", project.id);
            return Err(ProtocolError::ProjectExpired);
        }

        project.raised_amount = project.raised_amount.checked_add(amount).ok_or_else(|| {
            ProtocolError::InvalidPayload("amount overflows raised total".into())
        })?;
        project.contributors.push(contributor.to_string());
        self.store.insert(&project).await?;
        info!(
            "project {} received {} from {}",
            project.id, amount, contributor
        );
        Ok(project)
    }

    /// Enumerate all projects, optionally narrowed to one status.
    ///
    /// Trusts stored status: a past-deadline project nobody has touched
    /// since its deadline still enumerates as `Funding`.
    pub async fn get_projects(&self, status: Option<ProjectStatus>) -> Result<Vec<Project>> {
        let mut projects = self.store.values().await?;
        if let Some(status) = status {
            projects.retain(|p| p.status == status);
        }
        Ok(projects)
    }

    /// Point lookup. Pure: never triggers the lazy expiry transition.
    pub async fn get_project(&self, id: &str) -> Result<Project> {
        self.lookup(id).await
    }

    /// The contribution log of one project, in call order.
    pub async fn get_contributors(&self, id: &str) -> Result<Vec<String>> {
        Ok(self.lookup(id).await?.contributors)
    }

    /// Overwrite a project's status with a parsed external status string.
    ///
    /// The overwrite is unconditional: it may move a project back out of a
    /// terminal state.
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Project> {
        let _guard = self.write_lock.lock().await;
        let mut project = self.lookup(id).await?;

        let status = ProjectStatus::parse(status)
            .ok_or_else(|| ProtocolError::InvalidStatus(status.to_string()))?;

        project.status = status;
        self.store.insert(&project).await?;
        info!("project {} status set to {}", project.id, status);
        Ok(project)
    }

    /// Cancel: a status write to `Expired`.
    pub async fn cancel_project(&self, id: &str) -> Result<Project> {
        let _guard = self.write_lock.lock().await;
        let mut project = self.lookup(id).await?;

        project.status = ProjectStatus::Expired;
        self.store.insert(&project).await?;
        info!("project {} cancelled", project.id);
        Ok(project)
    }

    /// Overwrite a project's details from a full draft.
    ///
    /// Recomputes `deadline = start_time + duration` and rejects a deadline
    /// already in the past. `id`, `raised_amount`, `start_time`,
    /// `contributors`, and `status` are preserved. This path skips the lazy
    /// expiry check: a longer duration can resurrect a project whose
    /// original deadline had passed.
    pub async fn update_project(&self, id: &str, draft: ProjectDraft) -> Result<Project> {
        draft.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut project = self.lookup(id).await?;

        let deadline = project
            .start_time
            .checked_add(draft.duration)
            .ok_or_else(|| {
                ProtocolError::InvalidPayload("duration overflows deadline".into())
            })?;
        if self.clock.now() >= deadline {
            return Err(ProtocolError::InvalidPayload("invalid duration".into()));
        }

        project.title = draft.title;
        project.description = draft.description;
        project.goal_amount = draft.goal_amount;
        project.creator = draft.creator;
        project.deadline = deadline;
        self.store.insert(&project).await?;
        info!("project {} details updated", project.id);
        Ok(project)
    }

    async fn lookup(&self, id: &str) -> Result<Project> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ProtocolError::NotFound(id.to_string()))
    }
}
