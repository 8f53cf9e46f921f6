use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    repo,
    repo_types::{NewTask, Task, TaskFilter, TaskPatch},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

fn not_found() -> AppError {
    AppError::NotFound("task not found".into())
}

/// Loads a task and checks that `owner_id` owns it. A foreign task is
/// `Authorization`, or `NotFound` when the config conceals foreign tasks.
async fn load_owned(st: &AppState, owner_id: Uuid, task_id: Uuid) -> AppResult<Task> {
    match repo::find_by_id(&st.db, task_id).await? {
        Some(task) if task.user_id == owner_id => Ok(task),
        Some(task) => {
            warn!(%owner_id, %task_id, real_owner = %task.user_id, "access to foreign task");
            if st.config.conceal_foreign_tasks {
                Err(not_found())
            } else {
                Err(AppError::Authorization("task belongs to another user".into()))
            }
        }
        None => Err(not_found()),
    }
}

pub async fn create(st: &AppState, owner_id: Uuid, new: NewTask) -> AppResult<Task> {
    let task = repo::insert(&st.db, owner_id, &new).await.map_err(|e| match e {
        // token subject no longer exists
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            warn!(%owner_id, "task owner does not exist");
            AppError::Authentication("user not found".into())
        }
        other => AppError::Database(other),
    })?;
    info!(%owner_id, task_id = %task.id, "task created");
    Ok(task)
}

pub async fn list(st: &AppState, owner_id: Uuid, filter: TaskFilter) -> AppResult<Vec<Task>> {
    Ok(repo::list_by_owner(&st.db, owner_id, &filter).await?)
}

pub async fn get(st: &AppState, owner_id: Uuid, task_id: Uuid) -> AppResult<Task> {
    load_owned(st, owner_id, task_id).await
}

pub async fn update(
    st: &AppState,
    owner_id: Uuid,
    task_id: Uuid,
    patch: TaskPatch,
) -> AppResult<Task> {
    let mut task = load_owned(st, owner_id, task_id).await?;
    patch.apply(&mut task);
    task.updated_at = OffsetDateTime::now_utc();

    // Deleted between the load and the write.
    let task = repo::update(&st.db, &task).await?.ok_or_else(not_found)?;
    info!(%owner_id, %task_id, "task updated");
    Ok(task)
}

pub async fn delete(st: &AppState, owner_id: Uuid, task_id: Uuid) -> AppResult<()> {
    load_owned(st, owner_id, task_id).await?;
    if !repo::delete(&st.db, owner_id, task_id).await? {
        return Err(not_found());
    }
    info!(%owner_id, %task_id, "task deleted");
    Ok(())
}
