/// End-to-end tests: client shell → in-process transport → dispatcher
///
/// Two independent client shells (separate sessions) share one server, the
/// way two browser tabs with different logins would.

use serde_json::json;
use std::sync::Arc;
use taskpad_api::{server::TaskpadServer, transport::InProcessTransport};
use taskpad_client::{
    api::{ApiClient, NOT_AUTHENTICATED},
    router::{Navigation, TaskpadRouter},
    session::{ClientSession, TOKEN_KEY},
};
use taskpad_shared::{
    models::task::{NewTask, Task},
    storage::{MemoryStorage, Storage},
};

fn client_for(server: &TaskpadServer) -> ApiClient<InProcessTransport> {
    ApiClient::new(
        InProcessTransport::new(server.clone()),
        ClientSession::new(Arc::new(MemoryStorage::new())),
    )
}

#[tokio::test]
async fn test_two_users_flow() {
    let server = TaskpadServer::in_memory();
    let alice = client_for(&server);
    let bob = client_for(&server);

    assert_eq!(alice.register("Alice", "alice@example.com", "alice-pass").await.status, 201);
    assert_eq!(bob.register("Bob", "bob@example.com", "bob-pass").await.status, 201);

    let login = alice.login("alice@example.com", "alice-pass").await;
    assert!(login.ok);
    assert!(alice.session().is_logged_in());
    assert_eq!(alice.session().user().unwrap().name, "Alice");
    assert!(bob.login("bob@example.com", "bob-pass").await.ok);

    let created = alice
        .create_task(&NewTask {
            category: Some("work".to_string()),
            ..NewTask::titled("Quarterly report")
        })
        .await;
    assert_eq!(created.status, 201);
    let task: Task = created.data_as().unwrap();
    assert_eq!(task.user_id, alice.session().user().unwrap().id);
    assert!(!task.completed);

    let listed = alice.list_tasks().await;
    let tasks: Vec<Task> = listed.data_as().unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(bob.list_tasks().await.data_as::<Vec<Task>>().unwrap().is_empty());

    let foreign = bob.delete_task(&task.id).await;
    assert_eq!(foreign.status, 403);
    assert!(!foreign.ok);
    assert_eq!(
        foreign.error.as_deref(),
        Some("You do not have permission to access this task")
    );

    let toggled = alice.toggle_task(&task.id).await;
    assert!(toggled.ok);
    assert!(toggled.data_as::<Task>().unwrap().completed);

    let deleted = alice.delete_task(&task.id).await;
    assert_eq!(deleted.status, 200);
    assert_eq!(deleted.data, json!({ "id": task.id }));

    assert!(alice.list_tasks().await.data_as::<Vec<Task>>().unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_login_keeps_session_empty() {
    let server = TaskpadServer::in_memory();
    let client = client_for(&server);
    client.register("Ada", "ada@example.com", "right-pass").await;

    let response = client.login("ada@example.com", "wrong-pass").await;

    assert_eq!(response.status, 401);
    assert!(response.error.is_some());
    assert!(!client.session().is_logged_in());

    let tasks = client.list_tasks().await;
    assert_eq!(tasks.status, 401);
    assert_eq!(tasks.error.as_deref(), Some(NOT_AUTHENTICATED));
}

#[tokio::test]
async fn test_logout_invalidates_server_session() {
    let server = TaskpadServer::in_memory();
    let client = client_for(&server);
    client.register("Ada", "ada@example.com", "pass-word").await;
    client.login("ada@example.com", "pass-word").await;
    let token = client.session().token().unwrap();

    let response = client.logout().await;
    assert!(response.ok);
    assert!(!client.session().is_logged_in());
    assert!(server.auth().verify_auth(&token).unwrap().is_none());
}

#[tokio::test]
async fn test_session_restore_and_routing() {
    let server = TaskpadServer::in_memory();
    let storage = Arc::new(MemoryStorage::new());

    let client = ApiClient::new(
        InProcessTransport::new(server.clone()),
        ClientSession::new(storage.clone()),
    );
    client.register("Ada", "ada@example.com", "pass-word").await;
    client.login("ada@example.com", "pass-word").await;
    assert!(storage.get_item(TOKEN_KEY).unwrap().is_some());

    // A reloaded shell picks the session back up from storage
    let restored = ClientSession::restore(storage);
    let mut router = TaskpadRouter::standard(restored.clone());
    assert_eq!(
        router.handle_location("#/tasks"),
        Navigation::Rendered { path: "/tasks".to_string() }
    );

    let reloaded = ApiClient::new(InProcessTransport::new(server), restored);
    assert!(reloaded.current_user().await.ok);

    reloaded.logout().await;
    assert!(matches!(
        router.handle_location("#/tasks"),
        Navigation::Redirected { .. }
    ));
}
