//! PostgreSQL task store backed by Diesel and an r2d2 pool.
//!
//! Diesel queries are blocking, so every operation runs inside
//! `tokio::task::spawn_blocking` with a connection checked out from the
//! pool. Soft deletion is a `deleted_at IS NULL` filter on every statement
//! that touches live rows; update and delete return the affected row via
//! `RETURNING`, which doubles as the existence check.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

use super::events::{EventSink, TaskEvent};
use super::{StoreError, StoreResult, TaskStore};
use crate::model::{NewTask, Task, TaskChanges, TaskStatus};

/// PostgreSQL connection pool shared by the store.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

mod schema {
    diesel::table! {
        tasks (id) {
            id -> Int4,
            #[max_length = 50]
            title -> Varchar,
            #[max_length = 255]
            description -> Varchar,
            #[max_length = 20]
            status -> Varchar,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
            deleted_at -> Nullable<Timestamptz>,
        }
    }
}

use schema::tasks;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct TaskRow {
    id: i32,
    title: String,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tasks)]
struct NewTaskRow {
    title: String,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Changeset for partial updates. `None` fields are left untouched;
/// `updated_at` is always present so the set clause is never empty.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = tasks)]
struct TaskRowChanges {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    updated_at: DateTime<Utc>,
}

fn row_to_task(row: TaskRow) -> StoreResult<Task> {
    // A status outside the enum means the table was written past this code;
    // surface it as a store failure rather than inventing a value.
    let status = TaskStatus::try_from(row.status.as_str()).map_err(StoreError::unavailable)?;
    Ok(Task {
        id: row.id,
        title: row.title,
        description: row.description,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Builds the r2d2 pool for the given postgres URL.
pub fn build_pool(database_url: &str) -> StoreResult<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().build(manager).map_err(StoreError::unavailable)
}

/// PostgreSQL-backed task store.
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
    events: Arc<dyn EventSink>,
}

impl PgTaskStore {
    pub fn new(pool: PgPool, events: Arc<dyn EventSink>) -> Self {
        Self { pool, events }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::unavailable)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::unavailable)?
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list(&self) -> StoreResult<Vec<Task>> {
        self.run_blocking(|connection| {
            let rows = tasks::table
                .filter(tasks::deleted_at.is_null())
                .order(tasks::id.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(StoreError::unavailable)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn create(&self, input: NewTask) -> StoreResult<Task> {
        let valid = input.validated()?;

        let task = self
            .run_blocking(move |connection| {
                let now = Utc::now();
                let new_row = NewTaskRow {
                    title: valid.title,
                    description: valid.description,
                    status: TaskStatus::Pending.as_str().to_owned(),
                    created_at: now,
                    updated_at: now,
                };
                let row = diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(connection)
                    .map_err(StoreError::unavailable)?;
                row_to_task(row)
            })
            .await?;

        self.events.publish(TaskEvent::created(&task));
        Ok(task)
    }

    async fn update(&self, id: i32, changes: TaskChanges) -> StoreResult<Task> {
        let valid = changes.validated()?;

        let task = self
            .run_blocking(move |connection| {
                let changeset = TaskRowChanges {
                    title: valid.title,
                    description: valid.description,
                    status: valid.status.map(|s| s.as_str().to_owned()),
                    updated_at: Utc::now(),
                };
                let row = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(id))
                        .filter(tasks::deleted_at.is_null()),
                )
                .set(&changeset)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()
                .map_err(StoreError::unavailable)?
                .ok_or(StoreError::NotFound(id))?;
                row_to_task(row)
            })
            .await?;

        self.events.publish(TaskEvent::updated(&task));
        Ok(task)
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        let task = self
            .run_blocking(move |connection| {
                let row = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(id))
                        .filter(tasks::deleted_at.is_null()),
                )
                .set(tasks::deleted_at.eq(Some(Utc::now())))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()
                .map_err(StoreError::unavailable)?
                .ok_or(StoreError::NotFound(id))?;
                row_to_task(row)
            })
            .await?;

        self.events.publish(TaskEvent::deleted(&task));
        Ok(())
    }
}
