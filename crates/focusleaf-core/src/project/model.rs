use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        })
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// A user-defined unit of planned work.
///
/// Fields added after the first release carry `#[serde(default)]` so older
/// stored collections still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Opaque display token.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub priority: Priority,
    /// Minutes per task.
    #[serde(default)]
    pub estimated_time_per_task: u32,
    #[serde(default)]
    pub task_count: u32,
    /// Minutes. Normally `estimated_time_per_task * task_count`.
    #[serde(default)]
    pub total_estimated_time: u32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_completed: bool,
    /// Planned number of focus sessions.
    #[serde(default)]
    pub estimated_sessions: u32,
    /// May exceed `estimated_sessions`.
    #[serde(default)]
    pub completed_sessions: u32,
    #[serde(default)]
    pub total_focus_minutes: u32,
}

impl Project {
    /// `estimated_time_per_task * task_count`, saturating.
    pub fn computed_total(&self) -> u32 {
        self.estimated_time_per_task.saturating_mul(self.task_count)
    }

    /// Total estimated minutes, falling back to the per-task product for
    /// records stored before the total existed.
    pub fn effective_total_minutes(&self) -> u32 {
        if self.total_estimated_time > 0 {
            self.total_estimated_time
        } else {
            self.computed_total()
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_completed
    }
}

/// User-entered data for a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInput {
    pub name: String,
    pub color: String,
    pub priority: Priority,
    pub estimated_time_per_task: u32,
    pub task_count: u32,
    /// Defaults to `estimated_time_per_task * task_count`.
    pub total_estimated_time: Option<u32>,
    pub estimated_sessions: u32,
}

impl ProjectInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: String::new(),
            priority: Priority::Medium,
            estimated_time_per_task: 25,
            task_count: 1,
            total_estimated_time: None,
            estimated_sessions: 0,
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn tasks(mut self, task_count: u32, minutes_per_task: u32) -> Self {
        self.task_count = task_count;
        self.estimated_time_per_task = minutes_per_task;
        self
    }

    pub fn total_minutes(mut self, total: u32) -> Self {
        self.total_estimated_time = Some(total);
        self
    }

    pub fn sessions(mut self, estimated_sessions: u32) -> Self {
        self.estimated_sessions = estimated_sessions;
        self
    }

    /// Build the stored record under a fresh identity.
    pub(crate) fn into_project(
        self,
        id: String,
        created_at: DateTime<Utc>,
    ) -> Result<Project, ValidationError> {
        let name = validate_name(&self.name)?;
        let mut project = Project {
            id,
            name,
            color: self.color,
            priority: self.priority,
            estimated_time_per_task: self.estimated_time_per_task,
            task_count: self.task_count,
            total_estimated_time: 0,
            created_at,
            is_completed: false,
            estimated_sessions: self.estimated_sessions,
            completed_sessions: 0,
            total_focus_minutes: 0,
        };
        project.total_estimated_time = self
            .total_estimated_time
            .unwrap_or_else(|| project.computed_total());
        Ok(project)
    }
}

/// Partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub priority: Option<Priority>,
    pub estimated_time_per_task: Option<u32>,
    pub task_count: Option<u32>,
    pub total_estimated_time: Option<u32>,
    pub is_completed: Option<bool>,
    pub estimated_sessions: Option<u32>,
    pub completed_sessions: Option<u32>,
    pub total_focus_minutes: Option<u32>,
}

impl ProjectPatch {
    pub fn completion(completed: bool) -> Self {
        Self {
            is_completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply onto `project`. Validation happens before any field changes.
    ///
    /// If per-task time or task count changes and the patch leaves the total
    /// alone, the total follows the product unless it had been overridden.
    pub(crate) fn apply_to(&self, project: &mut Project) -> Result<(), ValidationError> {
        let name = self.name.as_deref().map(validate_name).transpose()?;

        let total_tracked = project.total_estimated_time == project.computed_total();

        if let Some(name) = name {
            project.name = name;
        }
        if let Some(color) = &self.color {
            project.color = color.clone();
        }
        if let Some(priority) = self.priority {
            project.priority = priority;
        }
        if let Some(v) = self.estimated_time_per_task {
            project.estimated_time_per_task = v;
        }
        if let Some(v) = self.task_count {
            project.task_count = v;
        }
        match self.total_estimated_time {
            Some(total) => project.total_estimated_time = total,
            None if total_tracked => project.total_estimated_time = project.computed_total(),
            None => {}
        }
        if let Some(v) = self.is_completed {
            project.is_completed = v;
        }
        if let Some(v) = self.estimated_sessions {
            project.estimated_sessions = v;
        }
        if let Some(v) = self.completed_sessions {
            project.completed_sessions = v;
        }
        if let Some(v) = self.total_focus_minutes {
            project.total_focus_minutes = v;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}
