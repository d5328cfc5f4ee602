use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::{
    Pool, QueryBuilder, Row, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};

use crate::domain::{
    store::TodoStore,
    todo::{NewTodo, Priority, Status, Todo, TodoFilter, TodoId},
};

const COLUMNS: &str = "id, task, status, priority, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteTodoStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url {database_url}"))?
            .create_if_missing(true);
        // Every connection to `:memory:` opens its own database, so keep exactly one alive.
        let pool = if is_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await?
        };
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn init(&self) -> Result<()> {
        // AUTOINCREMENT keeps ids of deleted rows from being handed out again.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('created', 'processing', 'done')),
                priority INTEGER NOT NULL CHECK (priority IN (1, 2, 3)),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS todos_priority_created_at ON todos (priority DESC, created_at DESC)")
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn create(&self, input: NewTodo) -> Result<Todo> {
        let now = now();
        let status = input.status();
        let result = sqlx::query(
            "INSERT INTO todos (task, status, priority, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&input.task)
        .bind(status.as_str())
        .bind(input.priority.level())
        .bind(format_timestamp(now))
        .bind(format_timestamp(now))
        .execute(&*self.pool)
        .await?;
        Ok(Todo {
            id: TodoId(result.last_insert_rowid()),
            task: input.task,
            status,
            priority: input.priority,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM todos WHERE id = ?1"))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        row.map(row_to_todo).transpose()
    }

    async fn find_all(&self, filter: &TodoFilter) -> Result<Vec<Todo>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM todos WHERE 1 = 1"));
        if let Some(task) = &filter.task {
            query
                .push(" AND task LIKE ")
                .push_bind(format!("%{}%", escape_like(task)))
                .push(" ESCAPE '\\'");
        }
        if let Some(status) = &filter.status {
            query.push(" AND status = ").push_bind(status.clone());
        }
        query.push(" ORDER BY priority DESC, created_at DESC, id DESC");

        let rows = query.build().fetch_all(&*self.pool).await?;
        rows.into_iter().map(row_to_todo).collect()
    }

    async fn update(&self, mut todo: Todo) -> Result<Option<Todo>> {
        todo.updated_at = now();
        let result = sqlx::query("UPDATE todos SET task = ?2, status = ?3, priority = ?4, updated_at = ?5 WHERE id = ?1")
            .bind(todo.id.0)
            .bind(&todo.task)
            .bind(todo.status.as_str())
            .bind(todo.priority.level())
            .bind(format_timestamp(todo.updated_at))
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(todo))
    }

    async fn delete(&self, id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn is_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

/// Truncated to what `format_timestamp` keeps, so returned values equal stored ones.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so text ordering in SQL matches chronological ordering.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid timestamp {raw:?}"))?
        .with_timezone(&Utc))
}

fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn row_to_todo(row: SqliteRow) -> Result<Todo> {
    let id: i64 = row.try_get("id")?;
    let task: String = row.try_get("task")?;
    let status: String = row.try_get("status")?;
    let priority: i64 = row.try_get("priority")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let status = status.parse::<Status>().map_err(|e| anyhow!("row {id}: {e}"))?;
    let priority = Priority::try_from(priority).map_err(|e| anyhow!("row {id}: {e}"))?;

    Ok(Todo {
        id: TodoId(id),
        task,
        status,
        priority,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
