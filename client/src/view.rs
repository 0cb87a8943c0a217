//! State model for the single task page.
//!
//! # Design
//! The page never mutates its list optimistically: every create, toggle,
//! and delete is followed by a fresh fetch of the authoritative list, and
//! the result lands here through [`TaskView::apply_fetch`]. The view owns
//! the loading flag shown until the first fetch resolves either way, the
//! create-form draft, and the single error banner; statistics are derived
//! from the in-memory list on demand.

use crate::error::ApiError;
use crate::types::{CreateTask, Task, TaskStatus};

/// Statistics derived from the current list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    /// `round(completed / total * 100)`; `None` when the list is empty,
    /// which hides the progress bar.
    pub percent_complete: Option<u8>,
}

/// The single page's state.
#[derive(Debug, Clone, Default)]
pub struct TaskView {
    tasks: Vec<Task>,
    loading: bool,
    banner: Option<String>,
    draft_title: String,
    draft_description: String,
}

impl TaskView {
    /// A freshly mounted view: loading, empty, no banner.
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// True until the first fetch resolves, success or failure.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The current error banner, if any request has failed since the last
    /// successful fetch.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn set_draft(&mut self, title: &str, description: &str) {
        self.draft_title = title.to_string();
        self.draft_description = description.to_string();
    }

    /// The creation payload for the current form contents.
    pub fn draft(&self) -> CreateTask {
        CreateTask {
            title: self.draft_title.clone(),
            description: self.draft_description.clone(),
        }
    }

    /// Clears the form, called after the creation round-trip succeeds.
    pub fn clear_draft(&mut self) {
        self.draft_title.clear();
        self.draft_description.clear();
    }

    /// Lands a fetch result. A failed initial fetch forces the list empty
    /// rather than showing nothing behind a stale spinner; a failed refetch
    /// keeps the current list and only raises the banner.
    pub fn apply_fetch(&mut self, result: Result<Vec<Task>, ApiError>) {
        let initial = self.loading;
        self.loading = false;
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                self.banner = None;
            }
            Err(err) => {
                if initial {
                    self.tasks.clear();
                }
                self.banner = Some(err.to_string());
            }
        }
    }

    /// Raises the banner for a failed mutation; the list is untouched
    /// because the authoritative refetch never happened.
    pub fn apply_mutation_failure(&mut self, err: &ApiError) {
        self.banner = Some(err.to_string());
    }

    pub fn stats(&self) -> Stats {
        let total = self.tasks.len();
        let completed = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let pending = total - completed;
        let percent_complete = if total == 0 {
            None
        } else {
            Some((completed as f64 / total as f64 * 100.0).round() as u8)
        };
        Stats {
            total,
            pending,
            completed,
            percent_complete,
        }
    }
}
