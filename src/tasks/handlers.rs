use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateTaskRequest, ListQuery, UpdateTaskRequest},
    repo_types::Task,
    services,
};
use crate::{auth::AuthUser, error::AppResult, state::AppState};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

#[instrument(skip(state, query))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Task>>> {
    let Query(query) = query?;
    let tasks = services::list(&state, user_id, query.into_filter()).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<Task>)> {
    let Json(payload) = payload?;
    let task = services::create(&state, user_id, payload.validate()?).await?;
    let location = format!("/api/v1/tasks/{}", task.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(task)))
}

#[instrument(skip(state, id))]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Task>> {
    let Path(id) = id?;
    Ok(Json(services::get(&state, user_id, id).await?))
}

#[instrument(skip(state, id, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> AppResult<Json<Task>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let task = services::update(&state, user_id, id, payload.validate()?).await?;
    Ok(Json(task))
}

#[instrument(skip(state, id))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    services::delete(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
