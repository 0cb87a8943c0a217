//! Task-tracking REST service.
//!
//! # Overview
//! Stateless HTTP handlers over a [`store::TaskStore`] trait object. The
//! store handle is constructed by the caller and passed into [`app`];
//! nothing in this crate holds module-global state, so tests run the same
//! router against the in-memory store that production runs against
//! PostgreSQL.
//!
//! # Routes
//! - `GET /api/tasks` — list non-deleted tasks
//! - `POST /api/tasks` — create, 201
//! - `PUT /api/tasks/{id}` — partial update, 404 on unknown id
//! - `DELETE /api/tasks/{id}` — soft delete, 204 even for unknown ids
//! - `GET /health` — liveness probe

pub mod config;
pub mod error;
pub mod model;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::error::ApiError;
use crate::model::{NewTask, Task, TaskChanges};
use crate::store::{StoreError, TaskStore};

type SharedStore = Arc<dyn TaskStore>;

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .with_state(store)
}

/// Serves until the listener fails or a shutdown signal arrives.
pub async fn run(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}

#[derive(Serialize)]
struct Health {
    message: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { message: "ok" })
}

async fn list_tasks(State(store): State<SharedStore>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(store.list().await?))
}

async fn create_task(
    State(store): State<SharedStore>,
    Json(input): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = store.create(input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(store): State<SharedStore>,
    Path(id): Path<i32>,
    Json(changes): Json<TaskChanges>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(store.update(id, changes).await?))
}

/// Delete is idempotent at this surface: an id that no longer exists (or
/// never did) reports the same 204 as a live one.
async fn delete_task(
    State(store): State<SharedStore>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    match store.delete(id).await {
        Ok(()) | Err(StoreError::NotFound(_)) => Ok(StatusCode::NO_CONTENT),
        Err(err) => Err(err.into()),
    }
}
