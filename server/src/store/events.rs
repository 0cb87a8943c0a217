//! Post-commit lifecycle events.
//!
//! Stores publish a [`TaskEvent`] after a write has committed, never before,
//! so a failed write leaves no trace here. The sink is injected at store
//! construction; production wires up [`LogSink`], tests can record events.

use crate::model::Task;

/// A successful store write, described for observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Created { id: i32, title: String },
    Updated { id: i32, title: String },
    Deleted { id: i32, title: String },
}

impl TaskEvent {
    pub fn created(task: &Task) -> Self {
        Self::Created {
            id: task.id,
            title: task.title.clone(),
        }
    }

    pub fn updated(task: &Task) -> Self {
        Self::Updated {
            id: task.id,
            title: task.title.clone(),
        }
    }

    pub fn deleted(task: &Task) -> Self {
        Self::Deleted {
            id: task.id,
            title: task.title.clone(),
        }
    }
}

/// Consumer of post-commit events.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: TaskEvent);
}

/// Emits one log line per lifecycle action, naming the task title.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: TaskEvent) {
        match event {
            TaskEvent::Created { id, title } => tracing::info!(id, %title, "task created"),
            TaskEvent::Updated { id, title } => tracing::info!(id, %title, "task updated"),
            TaskEvent::Deleted { id, title } => tracing::info!(id, %title, "task deleted"),
        }
    }
}
