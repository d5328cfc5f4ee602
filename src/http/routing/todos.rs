use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::{routing::get, Json, Router};
use http::StatusCode;

use crate::application::todo_service::TodoService;
use crate::domain::todo::{CreateTodo, Todo, TodoFilter, TodoId, UpdateTodo};
use crate::http::types::{ApiError, Data};

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/todos", get(find_all_todos::<S>).post(create_todo::<S>))
        .route("/todos/:id", get(find_todo::<S>).put(update_todo::<S>).delete(delete_todo::<S>))
        .with_state(state)
}

type ApiResult<T> = Result<T, ApiError>;

async fn create_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Data<Todo>>)> {
    let Json(input) = payload?;
    let todo = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(Data { data: todo })))
}

async fn find_all_todos<S: TodoService>(
    State(state): State<AppState<S>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Data<Vec<Todo>>>> {
    let todos = state.service.find_all(TodoFilter::from_pairs(params)).await?;
    Ok(Json(Data { data: todos }))
}

async fn find_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<Json<Data<Todo>>> {
    let id: TodoId = id.parse()?;
    let todo = state.service.find(id).await?;
    Ok(Json(Data { data: todo }))
}

async fn update_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Data<Todo>>> {
    // The id is checked before the body so a bad id never reaches the store.
    let id: TodoId = id.parse()?;
    // An empty body changes nothing, same as `{}`.
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        UpdateTodo::default()
    } else {
        Json::<UpdateTodo>::from_bytes(&body)?.0
    };
    let todo = state.service.update(id, input).await?;
    Ok(Json(Data { data: todo }))
}

async fn delete_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id: TodoId = id.parse()?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
