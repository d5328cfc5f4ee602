use thiserror::Error;

use super::todo::TodoId;

#[derive(Debug, Error)]
pub enum TodoError {
    /// Input rejected before touching storage.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("todo {0} not found")]
    NotFound(TodoId),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl TodoError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation { field, reason: reason.into() }
    }
}

pub type TodoResult<T> = Result<T, TodoError>;
