//! In-memory to-do list shown alongside the timer.
//!
//! Nothing here is persisted; the list lives as long as the host session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::display::strike_text;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: Uuid,
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl TaskItem {
    fn new(title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            done: false,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for TaskItem {
    /// Done tasks are rendered struck through.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.done {
            f.write_str(&strike_text(&self.title))
        } else {
            f.write_str(&self.title)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskList {
    items: Vec<TaskItem>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] for a blank title.
    pub fn add(&mut self, title: &str) -> Result<&TaskItem, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".into(),
                message: "task title is empty".into(),
            });
        }
        self.items.push(TaskItem::new(title.to_string()));
        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Remove the task at `index` (zero-based).
    pub fn remove(&mut self, index: usize) -> Result<TaskItem, ValidationError> {
        self.check_index(index)?;
        Ok(self.items.remove(index))
    }

    pub fn remove_by_id(&mut self, id: Uuid) -> Option<TaskItem> {
        let index = self.items.iter().position(|t| t.id == id)?;
        Some(self.items.remove(index))
    }

    /// Flip the done mark at `index`, returning the new value.
    pub fn toggle_done(&mut self, index: usize) -> Result<bool, ValidationError> {
        self.check_index(index)?;
        let item = &mut self.items[index];
        item.done = !item.done;
        Ok(item.done)
    }

    pub fn list(&self) -> &[TaskItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|t| !t.done).count()
    }

    fn check_index(&self, index: usize) -> Result<(), ValidationError> {
        if index >= self.items.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "tasks".into(),
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }
}
