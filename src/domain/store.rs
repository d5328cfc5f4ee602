use async_trait::async_trait;

use super::todo::{NewTodo, Todo, TodoFilter, TodoId};

/// Durable storage of todos. Absence is reported through `Option`/`bool`,
/// never as an error, so callers can tell "not found" from a storage failure.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    async fn create(&self, input: NewTodo) -> anyhow::Result<Todo>;
    async fn find(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    /// Ordered by priority descending, then most recently created first.
    async fn find_all(&self, filter: &TodoFilter) -> anyhow::Result<Vec<Todo>>;
    /// Overwrites every mutable field of the row with `todo`'s values.
    async fn update(&self, todo: Todo) -> anyhow::Result<Option<Todo>>;
    async fn delete(&self, id: TodoId) -> anyhow::Result<bool>;
}
