//! Welcome tasks for first-run users.
//!
//! Seeding is a one-shot concern kept apart from the task list itself: the
//! tracker asks [`should_seed`] once when it opens a user and, if so, stores
//! [`welcome_tasks`] and clears the user's new-user flag.

use crate::accounts::User;
use crate::task::{Priority, Task, TaskList};

pub const WELCOME_TAGS: [&str; 2] = ["welcome", "tutorial"];

/// True for a new user whose task list is still empty.
pub fn should_seed(user: &User, tasks: &TaskList) -> bool {
    user.is_new_user && tasks.is_empty()
}

pub fn welcome_tasks() -> Vec<Task> {
    [
        (
            "welcome-1",
            "Welcome to FocusFlow!",
            "Add your first task to get started",
            "Now",
            5,
            Priority::Low,
        ),
        (
            "welcome-2",
            "Try the focus timer",
            "Select a task and start a focus session",
            "Today",
            25,
            Priority::Medium,
        ),
        (
            "welcome-3",
            "Set your weekly goal",
            "Aim for 20-30 hours of focused work per week",
            "This week",
            60,
            Priority::Medium,
        ),
    ]
    .into_iter()
    .map(|(id, title, description, time, duration, priority)| Task {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        time: Some(time.to_string()),
        duration,
        priority,
        completed: false,
        tags: WELCOME_TAGS.iter().map(|t| t.to_string()).collect(),
    })
    .collect()
}
