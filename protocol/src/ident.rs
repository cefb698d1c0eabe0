//! # Identifier allocation
//!
//! Produces collision-free keys for new projects: 16 random bytes (128 bits
//! of entropy) hex-encoded into a 32-character identifier. A candidate that
//! already exists in the store is discarded and regenerated. The retry loop
//! is bounded so a pathological randomness source cannot spin forever; at
//! 128 bits the bound is unreachable in practice.

use rand::RngCore;

use crate::errors::{ProtocolError, Result};
use crate::store::ProjectStore;
use crate::types::ProjectId;

/// Identifier width in bytes.
const ID_BYTES: usize = 16;

/// Retry bound for the allocation loop.
const MAX_ATTEMPTS: u32 = 64;

/// Allocate an identifier not currently present in `store`.
///
/// No side effect: the identifier is only reserved once the caller inserts
/// a record under it.
pub async fn allocate(store: &ProjectStore) -> Result<ProjectId> {
    allocate_with(store, random_id).await
}

async fn allocate_with<F>(store: &ProjectStore, mut candidate: F) -> Result<ProjectId>
where
    F: FnMut() -> ProjectId,
{
    for _ in 0..MAX_ATTEMPTS {
        let id = candidate();
        if !store.contains(&id).await? {
            return Ok(id);
        }
    }
    Err(ProtocolError::Internal(format!(
        "no unused identifier after {MAX_ATTEMPTS} attempts"
    )))
}

fn random_id() -> ProjectId {
    let mut buf = [0u8; ID_BYTES];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Project, ProjectStatus};

    fn occupy(id: &str) -> Project {
        Project {
            id: id.to_string(),
            creator: "alice".into(),
            title: "t".into(),
            description: "d".into(),
            goal_amount: 1,
            raised_amount: 0,
            start_time: 0,
            deadline: 1,
            contributors: Vec::new(),
            status: ProjectStatus::Funding,
        }
    }

    #[test]
    fn random_id_shape() {
        let id = random_id();
        assert_eq!(id.len(), 2 * ID_BYTES);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn allocate_returns_unused_identifier() {
        let store = ProjectStore::in_memory().await.unwrap();
        let id = allocate(&store).await.unwrap();
        assert!(!store.contains(&id).await.unwrap());
    }

    #[tokio::test]
    async fn allocate_skips_occupied_candidates() {
        let store = ProjectStore::in_memory().await.unwrap();
        store.insert(&occupy("taken")).await.unwrap();

        let mut candidates = vec!["fresh".to_string(), "taken".to_string()];
        let id = allocate_with(&store, move || candidates.pop().unwrap())
            .await
            .unwrap();
        assert_eq!(id, "fresh");
    }

    #[tokio::test]
    async fn allocate_fails_once_bound_is_exhausted() {
        let store = ProjectStore::in_memory().await.unwrap();
        store.insert(&occupy("taken")).await.unwrap();

        let err = allocate_with(&store, || "taken".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Internal(_)));
    }
}
