//! Project model: a top-level trackable goal containing steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::step::{ProjectLabel, Step};
use crate::task::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Career,
    Learning,
    Health,
    Personal,
    Financial,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Career => "career",
            Category::Learning => "learning",
            Category::Health => "health",
            Category::Personal => "personal",
            Category::Financial => "financial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "career" => Some(Category::Career),
            "learning" => Some(Category::Learning),
            "health" => Some(Category::Health),
            "personal" => Some(Category::Personal),
            "financial" | "finance" => Some(Category::Financial),
            _ => None,
        }
    }
}

/// Derived project state. See `progress::project_status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Overdue,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "not-started",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    pub target_date: DateTime<Utc>,
    #[serde(default)]
    pub status: ProjectStatus,
    /// 0-100, derived. See `progress::project_progress`.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Label copied into each step this project owns.
    pub fn label(&self) -> ProjectLabel {
        ProjectLabel {
            project_id: self.id.clone(),
            project_title: self.title.clone(),
        }
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn task_count(&self) -> usize {
        self.steps.iter().map(|s| s.tasks.len()).sum()
    }

    /// True when any step or task carries its own completion flag.
    pub fn has_any_completion(&self) -> bool {
        self.steps
            .iter()
            .any(|s| s.completed || s.tasks.iter().any(|t| t.completed))
    }
}

/// Caller-supplied fields for `create_project`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    pub target_date: DateTime<Utc>,
}

impl NewProject {
    pub fn new(title: impl Into<String>, category: Category, target_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category,
            priority: Priority::Medium,
            target_date,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Build an empty, not-yet-recalculated project.
    pub fn into_project(self, id: impl Into<String>, created_at: DateTime<Utc>) -> Project {
        Project {
            id: id.into(),
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            target_date: self.target_date,
            status: ProjectStatus::NotStarted,
            progress: 0,
            steps: Vec::new(),
            created_at,
        }
    }
}
