//! Task model
//!
//! A task belongs to exactly one user (`userId`). Ownership is fixed at
//! creation: the dispatcher strips `id` and `userId` from every update payload
//! before merging, so neither can change afterwards.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "id": "2f0c...",
//!   "userId": "9a1b...",
//!   "title": "Buy milk",
//!   "description": "",
//!   "category": "personal",
//!   "priority": "normal",
//!   "dueDate": "2024-06-01",
//!   "completed": false,
//!   "createdAt": "2024-05-30T12:00:00Z"
//! }
//! ```

use crate::store::Record;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Category given to tasks created without one
pub const DEFAULT_CATEGORY: &str = "personal";

/// Priority given to tasks created without one
pub const DEFAULT_PRIORITY: &str = "normal";

/// Stored task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier assigned by the store
    #[serde(default)]
    pub id: String,

    /// Owning user; immutable after creation
    pub user_id: String,

    /// Title, never blank
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Category label (e.g. "personal", "work")
    #[serde(default = "default_category")]
    pub category: String,

    /// Priority label (e.g. "low", "normal", "high")
    #[serde(default = "default_priority")]
    pub priority: String,

    /// Optional due date
    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<NaiveDate>,

    /// Completion flag
    #[serde(default)]
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task
///
/// Optional fields fall back to the defaults above. Blank strings count as
/// missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<NaiveDate>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

/// Accepts `null`, `""` or a `YYYY-MM-DD` string
///
/// Forms submit an empty string when no date is picked.
pub fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl NewTask {
    /// Input with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

impl Task {
    /// Builds an unsaved task owned by `user_id`
    ///
    /// `completed` always starts false.
    pub fn from_new(user_id: impl Into<String>, data: NewTask) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.into(),
            title: data.title.trim().to_string(),
            description: data.description.map(|d| d.trim().to_string()).unwrap_or_default(),
            category: non_blank(data.category).unwrap_or_else(default_category),
            priority: non_blank(data.priority).unwrap_or_else(default_priority),
            due_date: data.due_date,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Whether `user_id` owns this task
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

impl Record for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_new_applies_defaults() {
        let task = Task::from_new("u1", NewTask::titled("  Buy milk "));

        assert_eq!(task.user_id, "u1");
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "");
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert_eq!(task.priority, DEFAULT_PRIORITY);
        assert!(task.due_date.is_none());
        assert!(!task.completed);
    }

    #[test]
    fn test_blank_optional_fields_fall_back() {
        let task = Task::from_new(
            "u1",
            NewTask {
                title: "t".to_string(),
                category: Some("  ".to_string()),
                priority: Some("high".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(task.category, "personal");
        assert_eq!(task.priority, "high");
    }

    #[test]
    fn test_new_task_from_json() {
        let new: NewTask = serde_json::from_value(json!({
            "title": "Report",
            "category": "work",
            "dueDate": "2024-06-01"
        }))
        .unwrap();

        assert_eq!(new.category.as_deref(), Some("work"));
        assert_eq!(new.due_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn test_empty_due_date_is_none() {
        let new: NewTask = serde_json::from_value(json!({ "title": "x", "dueDate": "" })).unwrap();
        assert!(new.due_date.is_none());

        let bad = serde_json::from_value::<NewTask>(json!({ "title": "x", "dueDate": "tomorrow" }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_task_json_shape() {
        let mut task = Task::from_new("u1", NewTask::titled("x"));
        task.id = "t1".to_string();

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["completed"], false);
        assert_eq!(json["dueDate"], serde_json::Value::Null);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_is_owned_by() {
        let task = Task::from_new("u1", NewTask::titled("x"));
        assert!(task.is_owned_by("u1"));
        assert!(!task.is_owned_by("u2"));
    }
}
