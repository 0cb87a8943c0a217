//! Persistence contract for tasks.
//!
//! Two implementations exist: [`postgres::PgTaskStore`] for production and
//! [`memory::MemoryTaskStore`] for tests and demo runs. Both enforce the
//! same validation rules and the soft-delete filter, and both publish a
//! post-commit [`events::TaskEvent`] for every successful write.

pub mod events;
pub mod memory;
pub mod postgres;

use crate::model::{NewTask, Task, TaskChanges, ValidationErrors};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Task persistence contract. Soft-deleted rows are invisible through every
/// method here; ids of deleted rows are never reassigned.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns all non-deleted tasks, ordered by id.
    async fn list(&self) -> StoreResult<Vec<Task>>;

    /// Validates and persists a new task with `status = pending` and both
    /// timestamps set to now.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when title or description violate
    /// their bounds; nothing is persisted in that case.
    async fn create(&self, input: NewTask) -> StoreResult<Task>;

    /// Applies a partial update and returns the reloaded row with a bumped
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when a changed field violates its
    /// bounds, or [`StoreError::NotFound`] when no non-deleted row has `id`.
    async fn update(&self, id: i32, changes: TaskChanges) -> StoreResult<Task>;

    /// Soft-deletes the row by setting `deleted_at`; the row is retained.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no non-deleted row has `id`.
    /// The API layer decides whether to surface that to callers.
    async fn delete(&self, id: i32) -> StoreResult<()>;
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// One or more field constraints were violated.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// No non-deleted task with the given id exists.
    #[error("task {0} not found")]
    NotFound(i32),

    /// The underlying table is unreachable or a query failed.
    #[error("store unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a connectivity or query failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
