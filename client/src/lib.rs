//! Client core for the task-tracking service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making this crate fully deterministic and
//! testable.
//!
//! # Design
//! - `TaskClient` is stateless — it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `TaskView` models the single page on top: the loading flag, the task
//!   list, the create form draft, the error banner, and the statistics
//!   derived from the in-memory list.
//! - DTOs are defined independently from the server crate; the integration
//!   test catches schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;
pub mod view;

pub use client::TaskClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTask, Task, TaskStatus, UpdateTask};
pub use view::{Stats, TaskView};
