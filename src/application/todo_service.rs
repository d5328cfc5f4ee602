use async_trait::async_trait;

use crate::domain::error::{TodoError, TodoResult};
use crate::domain::store::TodoStore;
use crate::domain::todo::{CreateTodo, Todo, TodoFilter, TodoId, UpdateTodo};

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn create(&self, input: CreateTodo) -> TodoResult<Todo>;
    async fn find(&self, id: TodoId) -> TodoResult<Todo>;
    async fn find_all(&self, filter: TodoFilter) -> TodoResult<Vec<Todo>>;
    async fn update(&self, id: TodoId, input: UpdateTodo) -> TodoResult<Todo>;
    async fn delete(&self, id: TodoId) -> TodoResult<()>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<S: TodoStore> {
    store: S,
}

impl<S: TodoStore> TodoServiceImpl<S> {
    pub fn new(store: S) -> Self { Self { store } }
}

#[async_trait]
impl<S: TodoStore> TodoService for TodoServiceImpl<S> {
    async fn create(&self, input: CreateTodo) -> TodoResult<Todo> {
        let new = input.validate()?;
        let todo = self.store.create(new).await?;
        tracing::info!(id = %todo.id, "created todo");
        Ok(todo)
    }

    async fn find(&self, id: TodoId) -> TodoResult<Todo> {
        self.store.find(id).await?.ok_or(TodoError::NotFound(id))
    }

    async fn find_all(&self, filter: TodoFilter) -> TodoResult<Vec<Todo>> {
        Ok(self.store.find_all(&filter.normalized()).await?)
    }

    /// Read, merge, write. Not atomic: concurrent updates to one id are last-writer-wins.
    async fn update(&self, id: TodoId, input: UpdateTodo) -> TodoResult<Todo> {
        let patch = input.validate()?;
        let current = self.find(id).await?;
        let updated = self
            .store
            .update(current.merge(patch))
            .await?
            .ok_or(TodoError::NotFound(id))?;
        tracing::info!(id = %id, "updated todo");
        Ok(updated)
    }

    async fn delete(&self, id: TodoId) -> TodoResult<()> {
        if !self.store.delete(id).await? {
            return Err(TodoError::NotFound(id));
        }
        tracing::info!(id = %id, "deleted todo");
        Ok(())
    }
}
