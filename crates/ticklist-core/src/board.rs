use std::time::Instant;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::overlay::{HideHandle, Overlay};
use crate::task::{Task, TaskId};

pub const DUPLICATE_ALERT: &str = "❌ Same item can't be added twice!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{}", DUPLICATE_ALERT)]
    DuplicateTask { text: String },
}

/// Outcome of [`Board::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    NotFound,
    /// false -> true; the overlay was armed.
    Completed(HideHandle),
    /// true -> false; pending hides are left alone.
    Reopened,
}

/// The whole to-do state: tasks newest first, the input buffer, and the
/// completion overlay.
#[derive(Debug, Clone, Default)]
pub struct Board {
    tasks: Vec<Task>,
    input: String,
    overlay: Overlay,
    last_id: u64,
}

impl Board {
    pub fn new(overlay: Overlay) -> Self {
        Self {
            tasks: Vec::new(),
            input: String::new(),
            overlay,
            last_id: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_char(&mut self) -> Option<char> {
        self.input.pop()
    }

    fn next_id(&mut self) -> TaskId {
        self.last_id += 1;
        TaskId(self.last_id)
    }

    /// Moves the input buffer into the list.
    ///
    /// Blank input is ignored (`Ok(None)`). A case-insensitive match against
    /// an existing task is rejected and the buffer is kept for correction.
    #[instrument(skip(self, now), fields(input = %self.input))]
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<Option<TaskId>, BoardError> {
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            debug!("blank input; nothing to add");
            return Ok(None);
        }

        if self.tasks.iter().any(|t| t.same_text(trimmed)) {
            warn!(text = %trimmed, "rejected duplicate task");
            return Err(BoardError::DuplicateTask {
                text: trimmed.to_string(),
            });
        }

        let text = trimmed.to_string();
        let id = self.next_id();
        info!(id = %id, text = %text, "added task");
        self.tasks.insert(0, Task::new(id, text, now));
        self.input.clear();
        Ok(Some(id))
    }

    /// Replaces the buffer with `text` and submits it.
    pub fn add(
        &mut self,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<TaskId>, BoardError> {
        self.set_input(text);
        self.submit(now)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub fn toggle(&mut self, id: TaskId, now: Instant) -> Toggle {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!("toggle on unknown task ignored");
            return Toggle::NotFound;
        };

        task.completed = !task.completed;
        if task.completed {
            info!("task completed");
            Toggle::Completed(self.overlay.arm(now))
        } else {
            info!("task reopened");
            Toggle::Reopened
        }
    }

    #[instrument(skip_all, fields(id = %id))]
    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            debug!("delete on unknown task ignored");
            return None;
        };
        let removed = self.tasks.remove(idx);
        info!(text = %removed.text, "deleted task");
        Some(removed)
    }

    /// Runs any overlay hide that has come due.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.overlay.tick(now)
    }
}
