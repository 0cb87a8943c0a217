use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use task_server::model::{NewTask, Task, TaskChanges, TaskStatus};
use task_server::store::memory::MemoryTaskStore;
use task_server::store::{StoreError, StoreResult, TaskStore};
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let store: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::new());
    task_server::app(store)
}

/// Store whose table is permanently unreachable; every operation fails the
/// way a dead connection pool would.
struct UnreachableStore;

impl UnreachableStore {
    fn error() -> StoreError {
        StoreError::unavailable(std::io::Error::other("connection refused"))
    }
}

#[async_trait::async_trait]
impl TaskStore for UnreachableStore {
    async fn list(&self) -> StoreResult<Vec<Task>> {
        Err(Self::error())
    }

    async fn create(&self, _input: NewTask) -> StoreResult<Task> {
        Err(Self::error())
    }

    async fn update(&self, _id: i32, _changes: TaskChanges) -> StoreResult<Task> {
        Err(Self::error())
    }

    async fn delete(&self, _id: i32) -> StoreResult<()> {
        Err(Self::error())
    }
}

fn failing_app() -> axum::Router {
    let store: Arc<dyn TaskStore> = Arc::new(UnreachableStore);
    task_server::app(store)
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- health ---

#[tokio::test]
async fn health_answers_200() {
    let resp = test_app().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- list ---

#[tokio::test]
async fn list_tasks_empty_is_200_with_empty_array() {
    let resp = test_app().oneshot(get_request("/api/tasks")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let tasks: Vec<Task> = body_json(resp).await;
    assert!(tasks.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_task_returns_201_and_pending_status() {
    let resp = test_app()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            r#"{"title":"Buy milk","description":"2% low fat"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let task: Task = body_json(resp).await;
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.description, "2% low fat");
    assert_eq!(task.status, TaskStatus::Pending);
}

#[tokio::test]
async fn create_task_trims_the_title() {
    let resp = test_app()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            r#"{"title":"  Buy milk  ","description":"2% low fat"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let task: Task = body_json(resp).await;
    assert_eq!(task.title, "Buy milk");
}

#[tokio::test]
async fn create_task_short_title_returns_400_naming_the_field() {
    let resp = test_app()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            r#"{"title":"A","description":"2% low fat"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("title"));
    assert_eq!(body["fields"], serde_json::json!(["title"]));
}

#[tokio::test]
async fn create_task_short_description_returns_400() {
    let resp = test_app()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            r#"{"title":"Buy milk","description":"2%"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["fields"], serde_json::json!(["description"]));
}

#[tokio::test]
async fn invalid_create_persists_no_row() {
    let app = test_app();

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            r#"{"title":"A","description":"2% low fat"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.oneshot(get_request("/api/tasks")).await.unwrap();
    let tasks: Vec<Task> = body_json(resp).await;
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn create_task_missing_field_is_rejected() {
    let resp = test_app()
        .oneshot(json_request("POST", "/api/tasks", r#"{"title":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- update ---

#[tokio::test]
async fn update_task_unknown_id_returns_404() {
    let resp = test_app()
        .oneshot(json_request(
            "PUT",
            "/api/tasks/42",
            r#"{"status":"completed"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_task_invalid_title_returns_400() {
    let app = test_app();

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            r#"{"title":"Buy milk","description":"2% low fat"}"#,
        ))
        .await
        .unwrap();
    let created: Task = body_json(resp).await;

    let resp = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/tasks/{}", created.id),
            r#"{"title":"A"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_task_bad_id_returns_400() {
    let resp = test_app()
        .oneshot(json_request(
            "PUT",
            "/api/tasks/not-a-number",
            r#"{"status":"completed"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_task_unknown_id_still_returns_204() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/tasks/42")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let body = body_bytes(resp).await;
    assert!(body.is_empty());
}

// --- store failure ---

#[tokio::test]
async fn list_with_unreachable_store_returns_500_and_error_body() {
    let resp = failing_app().oneshot(get_request("/api/tasks")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "internal server error");
}

#[tokio::test]
async fn writes_with_unreachable_store_return_500() {
    let app = failing_app();

    // A well-formed create still fails once it reaches the store.
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            r#"{"title":"Buy milk","description":"2% low fat"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/tasks/1",
            r#"{"status":"completed"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Delete swallows NotFound but never a connectivity failure.
    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/tasks/1")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "internal server error");
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = test_app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/tasks",
            r#"{"title":"Buy milk","description":"2% low fat"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Task = body_json(resp).await;
    assert_eq!(created.status, TaskStatus::Pending);
    let id = created.id;

    // toggle to completed — the full record resubmitted with flipped status
    let toggle_body = serde_json::json!({
        "title": created.title,
        "description": created.description,
        "status": created.status.toggled(),
    })
    .to_string();
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/tasks/{id}"),
            &toggle_body,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let toggled: Task = body_json(resp).await;
    assert_eq!(toggled.status, TaskStatus::Completed);
    assert_eq!(toggled.title, "Buy milk");

    // list — exactly that task
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/tasks"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let tasks: Vec<Task> = body_json(resp).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, id);
    assert_eq!(tasks[0].status, TaskStatus::Completed);

    // toggle back — returns to the original status
    let toggle_body = serde_json::json!({ "status": toggled.status.toggled() }).to_string();
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/tasks/{id}"),
            &toggle_body,
        ))
        .await
        .unwrap();
    let back: Task = body_json(resp).await;
    assert_eq!(back.status, TaskStatus::Pending);

    // delete — 204 with empty body
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/tasks/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let body = body_bytes(resp).await;
    assert!(body.is_empty());

    // delete again — idempotent at the API surface
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/tasks/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // update after delete — the row is gone from this surface
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/tasks/{id}"),
            r#"{"status":"pending"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete — empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/tasks"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let tasks: Vec<Task> = body_json(resp).await;
    assert!(tasks.is_empty());
}
