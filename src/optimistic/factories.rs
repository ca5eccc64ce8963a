//! Ready-made descriptors for the common mutation shapes
//!
//! Conveniences over the [`Mutation`](super::update::Mutation) contract,
//! not separate behavior: replace-field-by-id, prepend-item, remove-by-id
//! and mark-submitted, each with a default user-facing notification wired
//! in. Every factory appends a UUID to the descriptor id so rapid repeats
//! on the same record stay unique while in flight.

use std::future::Future;

use uuid::Uuid;

use crate::error::Result;
use crate::types::{Assignment, AssignmentStatus, JobApplication, Keyed, PipelineStage};

use super::update::OptimisticUpdate;

fn unique_id(kind: &str, key: &str) -> String {
    format!("{kind}:{key}:{}", Uuid::new_v4())
}

/// Replace the status of one assignment by id.
pub fn update_assignment_status<R, Fut>(
    assignment_id: &str,
    new_status: AssignmentStatus,
    previous_status: AssignmentStatus,
    remote: R,
) -> OptimisticUpdate<Vec<Assignment>>
where
    R: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<Assignment>>> + Send + 'static,
{
    let id = unique_id("assignment-status", assignment_id);
    let apply_id = assignment_id.to_string();
    let rollback_id = assignment_id.to_string();
    OptimisticUpdate::new(
        id,
        move |mut items: Vec<Assignment>| {
            for item in &mut items {
                if item.id == apply_id {
                    item.status = new_status;
                }
            }
            items
        },
        remote,
        move |mut items: Vec<Assignment>| {
            for item in &mut items {
                if item.id == rollback_id {
                    item.status = previous_status;
                }
            }
            items
        },
    )
    .with_success_message("Assignment status updated")
    .with_error_message("Could not update assignment status; changes reverted")
}

/// Move one job application to another pipeline stage.
pub fn update_pipeline_stage<R, Fut>(
    application_id: &str,
    new_stage: PipelineStage,
    previous_stage: PipelineStage,
    remote: R,
) -> OptimisticUpdate<Vec<JobApplication>>
where
    R: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<JobApplication>>> + Send + 'static,
{
    let id = unique_id("pipeline-stage", application_id);
    let apply_id = application_id.to_string();
    let rollback_id = application_id.to_string();
    OptimisticUpdate::new(
        id,
        move |mut items: Vec<JobApplication>| {
            for item in &mut items {
                if item.id == apply_id {
                    item.stage = new_stage;
                }
            }
            items
        },
        remote,
        move |mut items: Vec<JobApplication>| {
            for item in &mut items {
                if item.id == rollback_id {
                    item.stage = previous_stage;
                }
            }
            items
        },
    )
    .with_success_message("Application moved")
    .with_error_message("Could not move the application; changes reverted")
}

/// Prepend a new item; rollback removes it by key.
pub fn add_item<T, R, Fut>(item: T, remote: R) -> OptimisticUpdate<Vec<T>>
where
    T: Keyed + Clone + Send + Sync + 'static,
    R: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    let id = unique_id("add", item.key());
    let key = item.key().to_string();
    let inserted = item;
    OptimisticUpdate::new(
        id,
        move |mut items: Vec<T>| {
            items.insert(0, inserted.clone());
            items
        },
        remote,
        move |items: Vec<T>| {
            items
                .into_iter()
                .filter(|existing| existing.key() != key)
                .collect()
        },
    )
    .with_success_message("Added")
    .with_error_message("Could not add the item; changes reverted")
}

/// Remove an item by key; rollback restores the captured copy.
///
/// The rollback prepends rather than restoring the original position;
/// ordering is the server's to settle on the next successful fetch.
pub fn delete_item<T, R, Fut>(item: T, remote: R) -> OptimisticUpdate<Vec<T>>
where
    T: Keyed + Clone + Send + Sync + 'static,
    R: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    let id = unique_id("delete", item.key());
    let key = item.key().to_string();
    let restored = item;
    OptimisticUpdate::new(
        id,
        move |items: Vec<T>| {
            items
                .into_iter()
                .filter(|existing| existing.key() != key)
                .collect()
        },
        remote,
        move |mut items: Vec<T>| {
            items.insert(0, restored.clone());
            items
        },
    )
    .with_success_message("Removed")
    .with_error_message("Could not remove the item; changes reverted")
}

/// Mark an assignment's evidence as submitted and advance its status;
/// rollback restores the previous status and clears the flag.
pub fn submit_evidence<R, Fut>(
    assignment_id: &str,
    previous_status: AssignmentStatus,
    remote: R,
) -> OptimisticUpdate<Vec<Assignment>>
where
    R: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<Assignment>>> + Send + 'static,
{
    let id = unique_id("submit-evidence", assignment_id);
    let apply_id = assignment_id.to_string();
    let rollback_id = assignment_id.to_string();
    OptimisticUpdate::new(
        id,
        move |mut items: Vec<Assignment>| {
            for item in &mut items {
                if item.id == apply_id {
                    item.evidence_submitted = true;
                    item.status = AssignmentStatus::Submitted;
                }
            }
            items
        },
        remote,
        move |mut items: Vec<Assignment>| {
            for item in &mut items {
                if item.id == rollback_id {
                    item.evidence_submitted = false;
                    item.status = previous_status;
                }
            }
            items
        },
    )
    .with_success_message("Evidence submitted")
    .with_error_message("Could not submit evidence; changes reverted")
}
