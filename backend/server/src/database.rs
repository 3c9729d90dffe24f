//! # Order Store
//!
//! One append-only table of submitted orders.
//!
//! ## Requirements
//!
//! - Insert a single order atomically, rejecting a reference that already exists
//! - Exact-match lookup by reference
//! - Full listing, newest first
//!
//! ## Backends
//!
//! Picked by the `DATABASE_URL` scheme.
//!
//! - `sqlite:` table `orders`, `UNIQUE` on `order_ref`
//! - `redis://` hash of reference to JSON order, `HSETNX` for uniqueness,
//!   `INCR` counter for ids
//!
//! Item names are stored denormalized in `items`. Keying a separate order-line
//! table by item id would be the place to go if historical orders have to
//! survive catalog renames.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub mod redis;
pub mod sqlite;

use self::{redis::RedisStore, sqlite::SqliteStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub reference: String,
    pub student_name: String,
    pub student_class: String,
    pub items_summary: String,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub reference: String,
    pub student_name: String,
    pub student_class: String,
    pub items_summary: String,
    pub total_price: i64,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Reference {0} already exists")]
    DuplicateReference(String),

    /// Carries only the scheme, the rest of the url may hold credentials.
    #[error("Unsupported database scheme: {0}")]
    UnsupportedUrl(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Corrupt order record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists one order. Fails with [`StoreError::DuplicateReference`] and
    /// writes nothing when the reference is taken.
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError>;

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Order>, StoreError>;

    /// Every order, `created_at` descending, ties by `id` descending.
    async fn list_newest_first(&self) -> Result<Vec<Order>, StoreError>;
}

pub async fn init_store(database_url: &str) -> Result<Arc<dyn OrderStore>, StoreError> {
    if database_url.starts_with("sqlite:") {
        info!("Using SQLite order store");
        return Ok(Arc::new(SqliteStore::connect(database_url).await?));
    }

    if database_url.starts_with("redis://") || database_url.starts_with("rediss://") {
        info!("Using Redis order store");
        return Ok(Arc::new(RedisStore::connect(database_url).await?));
    }

    let scheme = database_url.split(':').next().unwrap_or_default();
    Err(StoreError::UnsupportedUrl(scheme.to_string()))
}

/// Insertion timestamp, truncated to what the stores persist.
pub(crate) fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

pub(crate) fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
