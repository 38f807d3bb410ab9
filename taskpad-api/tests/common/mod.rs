//! Common test utilities for integration tests
//!
//! - Fresh servers over memory or file storage
//! - Registered-and-logged-in test users
//! - Dispatch helpers that return the envelope as JSON
#![allow(dead_code)]

use axum::http::Method;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use taskpad_api::{
    envelope::Envelope,
    server::{ApiRequest, TaskpadServer},
};
use taskpad_shared::storage::{FileStorage, MemoryStorage};
use tempfile::TempDir;

/// A logged-in user
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Server plus (optionally) the directory backing it
pub struct TestContext {
    pub server: TaskpadServer,
    pub data_dir: Option<TempDir>,
}

impl TestContext {
    /// In-memory server
    pub fn new() -> Self {
        Self {
            server: TaskpadServer::in_memory(),
            data_dir: None,
        }
    }

    /// Server persisting its collections to a fresh temp directory
    pub fn with_file_storage() -> Self {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        Self {
            server: TaskpadServer::new(Arc::new(storage), Arc::new(MemoryStorage::new())),
            data_dir: Some(dir),
        }
    }

    pub fn dispatch(&self, request: ApiRequest) -> Envelope {
        self.server.dispatch(request)
    }

    /// Registers and logs in a user named after `email`
    pub fn user(&self, email: &str) -> TestUser {
        let registered = self.dispatch(
            ApiRequest::new(Method::POST, "/api/auth/register").with_body(json!({
                "name": format!("User {}", email),
                "email": email,
                "password": "password123",
            })),
        );
        assert_eq!(registered.status, 201, "register {}: {}", email, registered.message);

        let login = self.dispatch(
            ApiRequest::new(Method::POST, "/api/auth/login")
                .with_body(json!({ "email": email, "password": "password123" })),
        );
        assert_eq!(login.status, 200, "login {}: {}", email, login.message);

        let data = login.data.expect("login returns data");
        TestUser {
            id: data["user"]["id"].as_str().unwrap().to_string(),
            email: email.to_string(),
            token: data["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a task for `user` and returns its JSON
    pub fn create_task(&self, user: &TestUser, body: JsonValue) -> JsonValue {
        let envelope = self.dispatch(
            ApiRequest::new(Method::POST, "/api/tasks")
                .with_token(&user.token)
                .with_body(body),
        );
        assert_eq!(envelope.status, 201, "create task: {}", envelope.message);
        envelope.data.expect("created task")
    }

    /// Lists `user`'s tasks
    pub fn list_tasks(&self, user: &TestUser) -> Vec<JsonValue> {
        let envelope = self.dispatch(ApiRequest::new(Method::GET, "/api/tasks").with_token(&user.token));
        assert_eq!(envelope.status, 200);
        envelope
            .data
            .and_then(|data| data.as_array().cloned())
            .expect("task array")
    }
}
