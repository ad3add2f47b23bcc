//! Tasks and the per-user task list.
//!
//! The list is a plain in-memory collection; the tracker writes it through
//! to the key-value store after each mutation. Missing ids are reported as
//! `None`/`false`, never as errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("expected low, medium or high, got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form schedule label such as "Now", "Today" or "10:30 AM".
    #[serde(default)]
    pub time: Option<String>,
    /// Planned duration in minutes.
    pub duration: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// User input for a new task. The id is assigned on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub time: Option<String>,
    pub duration: u32,
    pub priority: Priority,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, duration: u32) -> Self {
        Self {
            title: title.into(),
            duration,
            ..Self::default()
        }
    }

    pub fn into_task(self, id: String) -> Task {
        Task {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            time: self.time,
            duration: self.duration,
            priority: self.priority,
            completed: false,
            tags: self.tags,
        }
    }
}

/// Partial update; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time: Option<String>,
    pub duration: Option<u32>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl TaskUpdate {
    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = Some(description);
        }
        if let Some(time) = self.time {
            task.time = Some(time);
        }
        if let Some(duration) = self.duration {
            task.duration = duration;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a task.
    ///
    /// # Errors
    /// Rejects a blank title or a zero duration.
    pub fn add(&mut self, new_task: NewTask, id: String) -> Result<&Task, ValidationError> {
        if new_task.title.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".into(),
                message: "must not be empty".into(),
            });
        }
        if new_task.duration == 0 {
            return Err(ValidationError::NotPositive {
                field: "duration",
                value: 0.0,
            });
        }
        self.tasks.push(new_task.into_task(id));
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn update(&mut self, id: &str, update: TaskUpdate) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        update.apply(task);
        Some(&*task)
    }

    /// Mark a task done. Returns `Some(true)` if it was not done before.
    pub fn complete(&mut self, id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        let changed = !task.completed;
        task.completed = true;
        Some(changed)
    }

    /// Flip the completed flag. Returns the new flag.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        Some(task.completed)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with(ids: &[&str]) -> TaskList {
        let mut list = TaskList::default();
        for id in ids {
            list.add(NewTask::new(format!("Task {id}"), 25), id.to_string())
                .unwrap();
        }
        list
    }

    #[test]
    fn add_assigns_id_and_starts_incomplete() {
        let list = list_with(&["a"]);
        let task = list.get("a").unwrap();
        assert_eq!(task.title, "Task a");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn add_rejects_blank_title_and_zero_duration() {
        let mut list = TaskList::default();
        assert!(list.add(NewTask::new("   ", 25), "x".into()).is_err());
        assert!(list.add(NewTask::new("Read", 0), "y".into()).is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn complete_reports_first_transition_only() {
        let mut list = list_with(&["a"]);
        assert_eq!(list.complete("a"), Some(true));
        assert_eq!(list.complete("a"), Some(false));
        assert_eq!(list.complete("missing"), None);
        assert_eq!(list.completed_count(), 1);
    }

    #[test]
    fn toggle_flips_flag() {
        let mut list = list_with(&["a"]);
        assert_eq!(list.toggle("a"), Some(true));
        assert_eq!(list.toggle("a"), Some(false));
    }

    #[test]
    fn update_applies_only_given_fields() {
        let mut list = list_with(&["a"]);
        let updated = list
            .update(
                "a",
                TaskUpdate {
                    priority: Some(Priority::High),
                    time: Some("Today".into()),
                    ..TaskUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.time.as_deref(), Some("Today"));
        assert_eq!(updated.duration, 25);
        assert!(list.update("missing", TaskUpdate::default()).is_none());
    }

    #[test]
    fn remove_and_clear() {
        let mut list = list_with(&["a", "b"]);
        assert!(list.remove("a"));
        assert!(!list.remove("a"));
        assert_eq!(list.len(), 1);
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::Low.to_string(), "low");
    }

    #[test]
    fn list_serializes_as_plain_array() {
        let list = list_with(&["a"]);
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["priority"], "medium");
    }
}
