use serde::Deserialize;

pub use super::repo_types::Priority;
use super::repo_types::{NewTask, TaskFilter, TaskPatch};
use crate::error::{AppError, AppResult};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub completed: Option<bool>,
}
fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn clean_title(raw: &str) -> AppResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

fn clean_description(raw: &str) -> AppResult<String> {
    let description = raw.trim();
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "description must be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(description.to_string())
}

impl CreateTaskRequest {
    pub fn validate(self) -> AppResult<NewTask> {
        Ok(NewTask {
            title: clean_title(&self.title)?,
            description: clean_description(&self.description)?,
            priority: self.priority,
            completed: self.completed,
        })
    }
}

impl UpdateTaskRequest {
    pub fn validate(self) -> AppResult<TaskPatch> {
        let patch = TaskPatch {
            title: self.title.as_deref().map(clean_title).transpose()?,
            description: self.description.as_deref().map(clean_description).transpose()?,
            priority: self.priority,
            completed: self.completed,
        };
        if patch.is_empty() {
            return Err(AppError::Validation("no fields to update".into()));
        }
        Ok(patch)
    }
}

impl ListQuery {
    pub fn into_filter(self) -> TaskFilter {
        TaskFilter {
            completed: self.completed,
            limit: self.limit.clamp(1, MAX_LIMIT),
            offset: self.offset.max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            completed: false,
        }
    }

    #[test]
    fn create_defaults_and_trims() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title":"  buy milk "}"#).unwrap();
        let new = req.validate().expect("valid");
        assert_eq!(new.title, "buy milk");
        assert_eq!(new.description, "");
        assert_eq!(new.priority, Priority::Medium);
        assert!(!new.completed);
    }

    #[test]
    fn create_rejects_blank_or_long_title() {
        assert!(matches!(create("   ").validate(), Err(AppError::Validation(_))));
        let long = "x".repeat(TITLE_MAX_CHARS + 1);
        assert!(matches!(create(&long).validate(), Err(AppError::Validation(_))));
        assert!(create(&"x".repeat(TITLE_MAX_CHARS)).validate().is_ok());
    }

    #[test]
    fn unknown_priority_is_a_parse_error() {
        let res = serde_json::from_str::<CreateTaskRequest>(r#"{"title":"a","priority":"urgent"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn empty_update_is_rejected() {
        let err = UpdateTaskRequest::default().validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "no fields to update"));
    }

    #[test]
    fn update_keeps_only_given_fields() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        let patch = req.validate().expect("valid");
        assert_eq!(patch.completed, Some(true));
        assert!(patch.title.is_none());
        assert!(patch.priority.is_none());
    }

    #[test]
    fn list_query_is_clamped() {
        let q = ListQuery { limit: 10_000, offset: -5, completed: None }.into_filter();
        assert_eq!(q.limit, MAX_LIMIT);
        assert_eq!(q.offset, 0);
        let q = ListQuery { limit: 0, offset: 3, completed: Some(true) }.into_filter();
        assert_eq!(q.limit, 1);
        assert_eq!(q.offset, 3);
        assert_eq!(q.completed, Some(true));
    }
}
