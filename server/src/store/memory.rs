//! In-memory task store for tests and demo runs.
//!
//! Implements the same contract as the PostgreSQL store, including soft
//! deletion: deleted rows stay in the map with `deleted_at` set, and the id
//! counter only moves forward so a deleted id is never reassigned.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::events::{EventSink, LogSink, TaskEvent};
use super::{StoreError, StoreResult, TaskStore};
use crate::model::{NewTask, Task, TaskChanges, TaskStatus};

/// Thread-safe in-memory task store.
#[derive(Clone)]
pub struct MemoryTaskStore {
    state: Arc<RwLock<MemoryState>>,
    events: Arc<dyn EventSink>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i32,
    rows: BTreeMap<i32, StoredTask>,
}

#[derive(Debug, Clone)]
struct StoredTask {
    task: Task,
    deleted_at: Option<DateTime<Utc>>,
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTaskStore {
    /// Creates an empty store that logs lifecycle events.
    pub fn new() -> Self {
        Self::with_events(Arc::new(LogSink))
    }

    /// Creates an empty store publishing to the given sink.
    pub fn with_events(events: Arc<dyn EventSink>) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            events,
        }
    }

    /// Total rows retained, soft-deleted ones included.
    pub async fn row_count_including_deleted(&self) -> usize {
        self.state.read().await.rows.len()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list(&self) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|row| row.deleted_at.is_none())
            .map(|row| row.task.clone())
            .collect())
    }

    async fn create(&self, input: NewTask) -> StoreResult<Task> {
        let valid = input.validated()?;
        let now = Utc::now();

        let mut state = self.state.write().await;
        state.next_id += 1;
        let task = Task {
            id: state.next_id,
            title: valid.title,
            description: valid.description,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(
            task.id,
            StoredTask {
                task: task.clone(),
                deleted_at: None,
            },
        );
        drop(state);

        self.events.publish(TaskEvent::created(&task));
        Ok(task)
    }

    async fn update(&self, id: i32, changes: TaskChanges) -> StoreResult<Task> {
        let valid = changes.validated()?;

        let mut state = self.state.write().await;
        let row = state
            .rows
            .get_mut(&id)
            .filter(|row| row.deleted_at.is_none())
            .ok_or(StoreError::NotFound(id))?;
        if let Some(title) = valid.title {
            row.task.title = title;
        }
        if let Some(description) = valid.description {
            row.task.description = description;
        }
        if let Some(status) = valid.status {
            row.task.status = status;
        }
        row.task.updated_at = Utc::now();
        let task = row.task.clone();
        drop(state);

        self.events.publish(TaskEvent::updated(&task));
        Ok(task)
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let row = state
            .rows
            .get_mut(&id)
            .filter(|row| row.deleted_at.is_none())
            .ok_or(StoreError::NotFound(id))?;
        row.deleted_at = Some(Utc::now());
        let task = row.task.clone();
        drop(state);

        self.events.publish(TaskEvent::deleted(&task));
        Ok(())
    }
}
