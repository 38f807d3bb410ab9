//! Task endpoints
//!
//! Every handler runs after authentication and receives the caller's user id.
//! Tasks are only ever visible to, and mutable by, their owner.
//!
//! # Endpoints
//!
//! - `GET /tasks` - List the caller's tasks
//! - `POST /tasks` - Create a task
//! - `GET /tasks/{id}` - Fetch one task
//! - `PUT /tasks/{id}` - Partially update a task
//! - `DELETE /tasks/{id}` - Delete a task

use super::decode_body;
use crate::{
    envelope::Envelope,
    error::{ApiError, ApiResult},
    server::TaskpadServer,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use taskpad_shared::{
    auth::service::validation_message,
    models::task::{deserialize_due_date, NewTask, Task, DEFAULT_CATEGORY, DEFAULT_PRIORITY},
};
use tracing::{info, warn};
use validator::Validate;

/// Fields a client may never set through an update
const IMMUTABLE_FIELDS: [&str; 2] = ["id", "userId"];

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Title (required, non-blank)
    #[serde(default)]
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Defaults to "personal"
    #[serde(default)]
    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: Option<String>,

    /// Defaults to "normal"
    #[serde(default)]
    #[validate(length(max = 50, message = "Priority must be at most 50 characters"))]
    pub priority: Option<String>,

    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<NaiveDate>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        NewTask {
            title: req.title,
            description: req.description,
            category: req.category,
            priority: req.priority,
            due_date: req.due_date,
        }
    }
}

/// String fields of an update patch, checked with the same limits as creation
///
/// Fields absent from the patch are `None` and skip validation; other patch
/// keys are ignored here and type-checked by the store merge.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct TaskPatchFields {
    #[serde(default)]
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    title: Option<String>,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    description: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    category: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "Priority must be at most 50 characters"))]
    priority: Option<String>,
}

/// Loads a task the caller owns
///
/// 404 if the task does not exist, 403 if someone else owns it.
fn load_owned(server: &TaskpadServer, user_id: &str, task_id: &str) -> ApiResult<Task> {
    let task = server
        .tasks()
        .get_by_id(task_id)?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if !task.is_owned_by(user_id) {
        warn!(user_id, task_id, "Rejected access to another user's task");
        return Err(ApiError::Forbidden(
            "You do not have permission to access this task".to_string(),
        ));
    }

    Ok(task)
}

/// List the caller's tasks, in creation order
pub fn list_tasks(server: &TaskpadServer, user_id: &str) -> ApiResult<Envelope> {
    let tasks = server.tasks().filter(|task| task.is_owned_by(user_id))?;

    Ok(Envelope::ok(
        "Tasks retrieved successfully",
        serde_json::to_value(tasks)?,
    ))
}

/// Create a task owned by the caller
///
/// # Request
///
/// ```json
/// { "title": "Buy milk", "category": "errands", "priority": "high", "dueDate": "2024-06-01" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing/blank title or malformed fields
pub fn create_task(
    server: &TaskpadServer,
    user_id: &str,
    body: Option<JsonValue>,
) -> ApiResult<Envelope> {
    let req: CreateTaskRequest = decode_body(body)?;

    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    req.validate()
        .map_err(|e| ApiError::BadRequest(validation_message(&e)))?;

    let task = server
        .tasks()
        .insert(Task::from_new(user_id, NewTask::from(req)))?;

    info!(user_id, task_id = %task.id, "Task created");
    Ok(Envelope::created(
        "Task created successfully",
        serde_json::to_value(task)?,
    ))
}

/// Fetch one of the caller's tasks
pub fn get_task(server: &TaskpadServer, user_id: &str, task_id: &str) -> ApiResult<Envelope> {
    let task = load_owned(server, user_id, task_id)?;

    Ok(Envelope::ok(
        "Task retrieved successfully",
        serde_json::to_value(task)?,
    ))
}

/// Partially update one of the caller's tasks
///
/// The body is shallow-merged into the stored task after `id` and `userId`
/// are removed from it.
///
/// # Errors
///
/// - `400 Bad Request`: body is not an object, title is blank, or a field has
///   the wrong type
/// - `403 Forbidden`: task belongs to another user
/// - `404 Not Found`: task does not exist
pub fn update_task(
    server: &TaskpadServer,
    user_id: &str,
    task_id: &str,
    body: Option<JsonValue>,
) -> ApiResult<Envelope> {
    load_owned(server, user_id, task_id)?;

    let mut patch = match body {
        Some(JsonValue::Object(map)) => map,
        None => Default::default(),
        Some(_) => {
            return Err(ApiError::BadRequest(
                "Request body must be a JSON object".to_string(),
            ))
        }
    };

    for field in IMMUTABLE_FIELDS {
        patch.remove(field);
    }

    if let Some(title) = patch.get("title") {
        let trimmed = title
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Title cannot be empty".to_string()))?
            .to_string();
        patch.insert("title".to_string(), JsonValue::String(trimmed));
    }

    // Blank labels fall back to the creation defaults
    for (field, default) in [("category", DEFAULT_CATEGORY), ("priority", DEFAULT_PRIORITY)] {
        let normalized = match patch.get(field) {
            Some(JsonValue::String(label)) if label.trim().is_empty() => default.to_string(),
            Some(JsonValue::String(label)) => label.trim().to_string(),
            _ => continue,
        };
        patch.insert(field.to_string(), JsonValue::String(normalized));
    }

    let fields: TaskPatchFields = serde_json::from_value(JsonValue::Object(patch.clone()))
        .map_err(|e| ApiError::BadRequest(format!("Invalid fields: {}", e)))?;
    fields
        .validate()
        .map_err(|e| ApiError::BadRequest(validation_message(&e)))?;

    let task = server
        .tasks()
        .update(task_id, patch)?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    info!(user_id, task_id, "Task updated");
    Ok(Envelope::ok(
        "Task updated successfully",
        serde_json::to_value(task)?,
    ))
}

/// Delete one of the caller's tasks
///
/// # Errors
///
/// - `403 Forbidden`: task belongs to another user
/// - `404 Not Found`: task does not exist
/// - `500 Internal Server Error`: the store removed nothing after the task was
///   found (not reachable with a single writer)
pub fn delete_task(server: &TaskpadServer, user_id: &str, task_id: &str) -> ApiResult<Envelope> {
    load_owned(server, user_id, task_id)?;

    if !server.tasks().delete(task_id)? {
        return Err(ApiError::InternalError(format!(
            "Task {} vanished between lookup and delete",
            task_id
        )));
    }

    info!(user_id, task_id, "Task deleted");
    Ok(Envelope::ok("Task deleted successfully", json!({ "id": task_id })))
}
