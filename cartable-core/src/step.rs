//! Step model: a milestone within a project, optionally split into tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task};

/// Display label pointing back at the owning project.
///
/// Ownership is array containment (`Project::steps`). This label is a cached
/// copy and is not re-synced when the project is renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLabel {
    pub project_id: String,
    pub project_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    #[serde(flatten)]
    pub project: ProjectLabel,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// 0-100, derived. See `progress::step_progress`.
    #[serde(default)]
    pub progress: u8,
}

impl Step {
    pub fn new(id: impl Into<String>, project: ProjectLabel, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project,
            title: title.into(),
            description: None,
            completed: false,
            completed_at: None,
            due_date: None,
            priority: Priority::Medium,
            tasks: Vec::new(),
            progress: 0,
        }
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Flip the manual completion flag, stamping or clearing `completed_at`.
    ///
    /// For steps with tasks the next recalculation re-derives the flag.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = self.completed.then_some(now);
    }
}

/// Caller-supplied fields for `add_step`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStep {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
}

impl NewStep {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn into_step(self, id: impl Into<String>, project: ProjectLabel) -> Step {
        Step {
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            ..Step::new(id, project, self.title)
        }
    }
}
