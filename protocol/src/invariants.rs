#![allow(dead_code)]

//! Invariant assertions shared by the test modules.

use crate::types::{Project, ProjectStatus};

/// INV-1: goal_amount must always be non-zero.
pub fn assert_goal_non_zero(project: &Project) {
    assert!(
        project.goal_amount > 0,
        "INV-1 violated: project {} has zero goal_amount",
        project.id
    );
}

/// INV-2: start_time must never exceed deadline.
pub fn assert_deadline_not_before_start(project: &Project) {
    assert!(
        project.start_time <= project.deadline,
        "INV-2 violated: project {} has start_time {} after deadline {}",
        project.id,
        project.start_time,
        project.deadline
    );
}

/// INV-3: contribution delta — after a contribution of `amount`,
/// raised_amount grows by exactly `amount` and the contributor log by
/// exactly one entry.
pub fn assert_contribution_delta(before: &Project, after: &Project, amount: u64) {
    assert_eq!(
        after.raised_amount,
        before.raised_amount + amount,
        "INV-3 violated: {} + {} != {}",
        before.raised_amount,
        amount,
        after.raised_amount
    );
    assert_eq!(
        after.contributors.len(),
        before.contributors.len() + 1,
        "INV-3 violated: contributor log did not grow by one"
    );
}

/// INV-4: raised_amount must never decrease.
pub fn assert_raised_monotonic(before: u64, after: u64) {
    assert!(
        after >= before,
        "INV-4 violated: raised_amount decreased from {before} to {after}"
    );
}

/// INV-5: the contributor log is append-only — the earlier log is always a
/// prefix of the later one.
pub fn assert_contributors_append_only(before: &[String], after: &[String]) {
    assert!(
        after.len() >= before.len() && after[..before.len()] == *before,
        "INV-5 violated: contributor log was rewritten: {before:?} -> {after:?}"
    );
}

/// INV-6: lazy transition validity. The contribution path may only move
/// Funding to Expired; every other stored transition it performs keeps the
/// status unchanged.
pub fn assert_valid_lazy_transition(from: ProjectStatus, to: ProjectStatus) {
    let valid = from == to || (from == ProjectStatus::Funding && to == ProjectStatus::Expired);
    assert!(
        valid,
        "INV-6 violated: contribution path moved status {from} to {to}"
    );
}

/// INV-7: contribution identity — fields a contribution must never touch
/// (everything but raised_amount, contributors, status) remain unchanged.
pub fn assert_contribution_preserves_identity(original: &Project, current: &Project) {
    assert_eq!(original.id, current.id, "INV-7 violated: id changed");
    assert_eq!(
        original.creator, current.creator,
        "INV-7 violated: creator changed"
    );
    assert_eq!(
        original.title, current.title,
        "INV-7 violated: title changed"
    );
    assert_eq!(
        original.description, current.description,
        "INV-7 violated: description changed"
    );
    assert_eq!(
        original.goal_amount, current.goal_amount,
        "INV-7 violated: goal_amount changed"
    );
    assert_eq!(
        original.start_time, current.start_time,
        "INV-7 violated: start_time changed"
    );
    assert_eq!(
        original.deadline, current.deadline,
        "INV-7 violated: deadline changed"
    );
}

/// Run all stateless project invariants.
pub fn assert_all_project_invariants(project: &Project) {
    assert_goal_non_zero(project);
    assert_deadline_not_before_start(project);
}
