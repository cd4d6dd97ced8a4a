use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

pub type TaskId = i64;

/// Id carried by a task that has not been written to a store yet.
pub const UNSAVED_ID: TaskId = 0;

/// Priority levels. Lower weight sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    /// Name used when persisting.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            other => Err(anyhow!("unknown priority {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    /// Milliseconds since the unix epoch.
    pub due_date: i64,
    pub is_completed: bool,
}

impl Task {
    /// A task that is ready to be inserted. The store assigns the id.
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        priority: Priority,
        due_date: i64,
    ) -> Self {
        Self {
            id: UNSAVED_ID,
            title: title.into(),
            description,
            priority,
            due_date,
            is_completed: false,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_ID
    }

    pub fn is_overdue(&self, now_ms: i64) -> bool {
        !self.is_completed && self.due_date < now_ms
    }

    pub fn with_completed(&self, is_completed: bool) -> Self {
        Self {
            is_completed,
            ..self.clone()
        }
    }

    /// Field equality ignoring the store-assigned id.
    pub fn same_content(&self, other: &Task) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.priority == other.priority
            && self.due_date == other.due_date
            && self.is_completed == other.is_completed
    }
}
