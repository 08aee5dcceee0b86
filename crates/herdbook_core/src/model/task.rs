//! Farm to-do items assigned to back-office users.

use crate::model::entity::{Entity, EntityId, EntityKind, EntityMeta};
use crate::model::validation::{require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    Canceled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

/// Actionable item. `completed_at` is set exactly when the task is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub due_at: i64,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assigned_to: Option<EntityId>,
    pub completed_at: Option<i64>,
}

impl Task {
    pub fn new(title: impl Into<String>, due_at: i64) -> Self {
        Self {
            meta: EntityMeta::new(),
            title: title.into(),
            description: String::new(),
            due_at,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            assigned_to: None,
            completed_at: None,
        }
    }

    pub fn assigned_to(mut self, user_id: EntityId) -> Self {
        self.assigned_to = Some(user_id);
        self
    }

    /// Marks the task done at `completed_at`.
    pub fn complete(&mut self, completed_at: i64) {
        self.status = TaskStatus::Done;
        self.completed_at = Some(completed_at);
    }
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("task title", &self.title)?;
        if (self.status == TaskStatus::Done) != self.completed_at.is_some() {
            return Err(ValidationError::new(
                "invalid_completion",
                "Only done tasks carry a completion time.",
            ));
        }
        Ok(())
    }
}
