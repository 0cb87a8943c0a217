//! Stateless request builder and response parser for the task API.
//!
//! # Design
//! `TaskClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Toggling is a thin wrapper over update: the full task
//! record is resubmitted with the flipped status, exactly what the toggle
//! control on the page does.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTask, Task, UpdateTask};

/// Synchronous, stateless client for the task API.
#[derive(Debug, Clone)]
pub struct TaskClient {
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_path(&self) -> String {
        format!("{}/api/tasks", self.base_url)
    }

    fn item_path(&self, id: i32) -> String {
        format!("{}/api/tasks/{id}", self.base_url)
    }

    pub fn build_list_tasks(&self) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Get, self.collection_path())
    }

    pub fn build_create_task(&self, input: &CreateTask) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(HttpRequest::json(HttpMethod::Post, self.collection_path(), body))
    }

    pub fn build_update_task(&self, id: i32, input: &UpdateTask) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(HttpRequest::json(HttpMethod::Put, self.item_path(id), body))
    }

    /// Resubmits the full task record with the status flipped.
    pub fn build_toggle_task(&self, task: &Task) -> Result<HttpRequest, ApiError> {
        self.build_update_task(
            task.id,
            &UpdateTask {
                title: Some(task.title.clone()),
                description: Some(task.description.clone()),
                status: Some(task.status.toggled()),
            },
        )
    }

    pub fn build_delete_task(&self, id: i32) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Delete, self.item_path(id))
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, 201)?;
        from_json(&response.body)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    /// Also parses toggle responses, which are plain updates on the wire.
    pub fn parse_toggle_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        self.parse_update_task(response)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)?;
        Ok(())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound),
        400 => Err(ApiError::Validation(error_message(&response.body))),
        status => Err(ApiError::Http {
            status,
            body: response.body.clone(),
        }),
    }
}

/// Pulls the `error` field out of a JSON error body, falling back to the
/// raw body when it is not in the expected shape.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}
