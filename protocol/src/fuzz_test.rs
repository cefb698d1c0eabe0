//! Stress and randomized-sequence tests.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::clock::testutil::ManualClock;
use crate::invariants;
use crate::{Project, ProjectDraft, ProjectRegistry, ProjectStatus, ProjectStore, ProtocolError};

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
        duration: 1_000_000,
        creator: "alice".into(),
    }
}

#[tokio::test]
async fn identifier_uniqueness_over_sequential_creations() {
    let (_clock, registry) = setup().await;

    let mut seen = HashSet::new();
    for _ in 0..1_000 {
        let project = registry.create_project(draft()).await.unwrap();
        assert_eq!(project.id.len(), 32);
        assert!(
            seen.insert(project.id.clone()),
            "identifier {} allocated twice",
            project.id
        );
    }
    assert_eq!(registry.get_projects(None).await.unwrap().len(), 1_000);
}

#[tokio::test]
async fn randomized_contribution_sequences_match_a_model() {
    let (clock, registry) = setup().await;
    let mut rng = rand::thread_rng();

    let mut projects: Vec<Project> = Vec::new();
    for _ in 0..3 {
        projects.push(registry.create_project(draft()).await.unwrap());
    }
    let contributors = ["bob", "carol", "dana", "erin"];

    for _ in 0..200 {
        let slot = rng.gen_range(0..projects.len());
        let before = projects[slot].clone();
        let who = *contributors.choose(&mut rng).unwrap();
        let amount = rng.gen_range(1..=1_000u64);
        clock.advance(rng.gen_range(0..10));

        let after = registry.contribute(&before.id, who, amount).await.unwrap();

        invariants::assert_contribution_delta(&before, &after, amount);
        invariants::assert_contribution_preserves_identity(&before, &after);
        invariants::assert_raised_monotonic(before.raised_amount, after.raised_amount);
        invariants::assert_contributors_append_only(&before.contributors, &after.contributors);
        assert_eq!(after.contributors.last().map(String::as_str), Some(who));
        projects[slot] = after;
    }

    // The store agrees with the in-test model record for record.
    for expected in &projects {
        let stored = registry.get_project(&expected.id).await.unwrap();
        assert_eq!(&stored, expected);
        invariants::assert_all_project_invariants(&stored);
    }
}

#[tokio::test]
async fn randomized_status_churn_matches_a_model() {
    let (_clock, registry) = setup().await;
    let mut rng = rand::thread_rng();

    let project = registry.create_project(draft()).await.unwrap();
    let mut expected = project.status;

    for _ in 0..100 {
        let roll = rng.gen_range(0..4);
        match roll {
            0 => {
                registry.update_status(&project.id, "Funding").await.unwrap();
                expected = ProjectStatus::Funding;
            }
            1 => {
                registry
                    .update_status(&project.id, "Successful")
                    .await
                    .unwrap();
                expected = ProjectStatus::Successful;
            }
            2 => {
                registry.update_status(&project.id, "Expired").await.unwrap();
                expected = ProjectStatus::Expired;
            }
            _ => {
                // Unrecognised values never move the stored status.
                let err = registry
                    .update_status(&project.id, "Paused")
                    .await
                    .unwrap_err();
                assert!(matches!(err, ProtocolError::InvalidStatus(_)));
            }
        }
        let stored = registry.get_project(&project.id).await.unwrap();
        assert_eq!(stored.status, expected);
    }
}
