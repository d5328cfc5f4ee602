use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::TodoError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl FromStr for TodoId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(TodoId)
            .map_err(|_| TodoError::validation("id", format!("{s:?} is not an integer")))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status { Created, Processing, Done }

impl Status {
    pub const ALL: [Status; 3] = [Status::Created, Status::Processing, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Created => "created",
            Status::Processing => "processing",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Status {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TodoError::validation("status", format!("{s:?} is not one of created, processing, done")))
    }
}

/// Urgency of a todo, serialized as its integer level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "i64", into = "i64")]
pub enum Priority { Low = 1, Medium = 2, High = 3 }

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn level(self) -> i64 { self as i64 }
}

impl TryFrom<i64> for Priority {
    type Error = TodoError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.level() == value)
            .ok_or_else(|| TodoError::validation("priority", format!("{value} is not one of 1, 2, 3")))
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self { priority.level() }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Todo {
    #[serde(rename = "ID")]
    pub id: TodoId,
    pub task: String,
    pub status: Status,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Applies a validated patch; fields the patch leaves unset keep their stored value.
    pub fn merge(self, patch: TodoPatch) -> Todo {
        Todo {
            task: patch.task.unwrap_or(self.task),
            status: patch.status.unwrap_or(self.status),
            priority: patch.priority.unwrap_or(self.priority),
            ..self
        }
    }
}

/// Raw creation request. Unknown fields, `status` included, are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
}

impl CreateTodo {
    pub fn validate(self) -> Result<NewTodo, TodoError> {
        let task = match self.task {
            Some(task) if !task.is_empty() => task,
            _ => return Err(TodoError::validation("task", "is required")),
        };
        let priority = match self.priority {
            None | Some(0) => return Err(TodoError::validation("priority", "is required")),
            Some(level) => Priority::try_from(level)?,
        };
        Ok(NewTodo { task, priority })
    }
}

/// A validated todo ready to be persisted. Status always starts as `created`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
    pub priority: Priority,
}

impl NewTodo {
    pub fn status(&self) -> Status { Status::Created }
}

/// Raw update request. Absent, null and zero values all mean "keep the stored value".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
}

impl UpdateTodo {
    pub fn validate(self) -> Result<TodoPatch, TodoError> {
        let task = self.task.filter(|t| !t.is_empty());
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(s) => Some(s.parse::<Status>()?),
        };
        let priority = match self.priority {
            None | Some(0) => None,
            Some(level) => Some(Priority::try_from(level)?),
        };
        Ok(TodoPatch { task, status, priority })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub task: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
}

/// List filter: `task` is a substring match, `status` an exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub task: Option<String>,
    pub status: Option<String>,
}

impl TodoFilter {
    /// Builds a filter from decoded query pairs. The first value of a repeated key wins;
    /// unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> TodoFilter
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut filter = TodoFilter::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "task" => &mut filter.task,
                "status" => &mut filter.status,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        filter
    }

    /// Drops empty parameters so `?task=` behaves like no filter at all.
    pub fn normalized(self) -> TodoFilter {
        TodoFilter {
            task: self.task.filter(|t| !t.is_empty()),
            status: self.status.filter(|s| !s.is_empty()),
        }
    }
}
