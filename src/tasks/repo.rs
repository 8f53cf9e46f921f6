use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewTask, Task, TaskFilter};

const TASK_COLUMNS: &str =
    "id, user_id, title, description, priority, completed, created_at, updated_at";

pub async fn insert(db: &SqlitePool, owner_id: Uuid, new: &NewTask) -> sqlx::Result<Task> {
    let now = OffsetDateTime::now_utc();
    sqlx::query_as::<_, Task>(&format!(
        r#"
        INSERT INTO tasks (id, user_id, title, description, priority, completed, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        RETURNING {TASK_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.priority)
    .bind(new.completed)
    .bind(now)
    .fetch_one(db)
    .await
}

/// Tasks owned by `owner_id`, in insertion (rowid) order.
pub async fn list_by_owner(
    db: &SqlitePool,
    owner_id: Uuid,
    filter: &TaskFilter,
) -> sqlx::Result<Vec<Task>> {
    sqlx::query_as::<_, Task>(&format!(
        r#"
        SELECT {TASK_COLUMNS}
        FROM tasks
        WHERE user_id = ?1
          AND (?2 IS NULL OR completed = ?2)
        ORDER BY rowid ASC
        LIMIT ?3 OFFSET ?4
        "#
    ))
    .bind(owner_id)
    .bind(filter.completed)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(db)
    .await
}

/// Unscoped lookup; callers must check ownership.
pub async fn find_by_id(db: &SqlitePool, task_id: Uuid) -> sqlx::Result<Option<Task>> {
    sqlx::query_as::<_, Task>(&format!(
        r#"
        SELECT {TASK_COLUMNS}
        FROM tasks
        WHERE id = ?1
        "#
    ))
    .bind(task_id)
    .fetch_optional(db)
    .await
}

/// Writes the mutable fields back. `None` if the row vanished or changed owner.
pub async fn update(db: &SqlitePool, task: &Task) -> sqlx::Result<Option<Task>> {
    sqlx::query_as::<_, Task>(&format!(
        r#"
        UPDATE tasks
           SET title = ?3, description = ?4, priority = ?5, completed = ?6, updated_at = ?7
         WHERE id = ?1 AND user_id = ?2
        RETURNING {TASK_COLUMNS}
        "#
    ))
    .bind(task.id)
    .bind(task.user_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.priority)
    .bind(task.completed)
    .bind(task.updated_at)
    .fetch_optional(db)
    .await
}

/// Returns whether a row owned by `owner_id` was removed.
pub async fn delete(db: &SqlitePool, owner_id: Uuid, task_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?1 AND user_id = ?2")
        .bind(task_id)
        .bind(owner_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
