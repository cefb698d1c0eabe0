//! Lazy-expiry behavior: the deadline check runs on contribution attempts,
//! never on reads, and its `Expired` write persists even though the
//! triggering call fails.

use std::sync::Arc;

use crate::clock::testutil::ManualClock;
use crate::invariants;
use crate::{ProjectDraft, ProjectRegistry, ProjectStatus, ProjectStore, ProtocolError};

const T0: u64 = 1_700_000_000;

async fn setup() -> (Arc<ManualClock>, ProjectRegistry) {
    let store = ProjectStore::in_memory().await.unwrap();
    let clock = Arc::new(ManualClock::new(T0));
    let registry = ProjectRegistry::new(store, clock.clone());
    (clock, registry)
}

fn draft() -> ProjectDraft {
    ProjectDraft {
        title: "Solar farm".into(),
        description: "Community solar array".into(),
        goal_amount: 500,
        duration: 1_000,
        creator: "alice".into(),
    }
}

#[tokio::test]
async fn contribution_past_deadline_expires_and_fails() {
    let (clock, registry) = setup().await;
    let project = registry.create_project(draft()).await.unwrap();

    // Within the window: accepted.
    clock.set(T0 + 10);
    let funded = registry.contribute(&project.id, "bob", 300).await.unwrap();
    assert_eq!(funded.raised_amount, 300);

    // Past the deadline: rejected, but the expiry write sticks.
    clock.set(T0 + 1_500);
    let err = registry
        .contribute(&project.id, "carol", 400)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::ProjectExpired));

    let stored = registry.get_project(&project.id).await.unwrap();
    assert_eq!(stored.status, ProjectStatus::Expired);
    assert_eq!(stored.raised_amount, 300);
    assert_eq!(stored.contributors, vec!["bob".to_string()]);
    invariants::assert_valid_lazy_transition(funded.status, stored.status);
}

#[tokio::test]
async fn deadline_instant_is_closed() {
    let (clock, registry) = setup().await;
    let project = registry.create_project(draft()).await.unwrap();

    clock.set(project.deadline);
    let err = registry
        .contribute(&project.id, "bob", 100)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::ProjectExpired));

    let stored = registry.get_project(&project.id).await.unwrap();
    assert_eq!(stored.status, ProjectStatus::Expired);
}

#[tokio::test]
async fn reads_never_trigger_the_expiry_transition() {
    let (clock, registry) = setup().await;
    let project = registry.create_project(draft()).await.unwrap();

    clock.set(T0 + 2_000);

    // Every read path leaves the stale Funding status in place.
    assert_eq!(
        registry.get_project(&project.id).await.unwrap().status,
        ProjectStatus::Funding
    );
    registry.get_contributors(&project.id).await.unwrap();
    let funding = registry
        .get_projects(Some(ProjectStatus::Funding))
        .await
        .unwrap();
    assert_eq!(funding.len(), 1);

    assert_eq!(
        registry.get_project(&project.id).await.unwrap().status,
        ProjectStatus::Funding
    );
}

#[tokio::test]
async fn lazily_expired_project_stays_expired() {
    let (clock, registry) = setup().await;
    let project = registry.create_project(draft()).await.unwrap();

    clock.set(T0 + 1_100);
    registry
        .contribute(&project.id, "bob", 100)
        .await
        .unwrap_err();
    let first = registry.get_project(&project.id).await.unwrap();

    // Follow-up attempts hit the terminal check; the record is untouched.
    let err = registry
        .contribute(&project.id, "carol", 50)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::ProjectExpired));
    assert_eq!(registry.get_project(&project.id).await.unwrap(), first);
}

#[tokio::test]
async fn longer_duration_resurrects_an_untouched_project() {
    let (clock, registry) = setup().await;
    let project = registry.create_project(draft()).await.unwrap();

    // Deadline passes with nobody contributing: still Funding in storage.
    clock.set(T0 + 3_000);
    let mut update = draft();
    update.duration = 10_000;
    let updated = registry.update_project(&project.id, update).await.unwrap();
    assert_eq!(updated.deadline, T0 + 10_000);
    assert_eq!(updated.status, ProjectStatus::Funding);

    let funded = registry.contribute(&project.id, "bob", 40).await.unwrap();
    assert_eq!(funded.raised_amount, 40);
}

#[tokio::test]
async fn detail_update_does_not_clear_an_expired_status() {
    let (clock, registry) = setup().await;
    let project = registry.create_project(draft()).await.unwrap();

    // Lazy transition first, then a detail update with a fresh window.
    clock.set(T0 + 1_100);
    registry
        .contribute(&project.id, "bob", 10)
        .await
        .unwrap_err();

    let mut update = draft();
    update.duration = 10_000;
    let updated = registry.update_project(&project.id, update).await.unwrap();
    assert_eq!(updated.status, ProjectStatus::Expired);

    let err = registry
        .contribute(&project.id, "bob", 10)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::ProjectExpired));
}
