use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;
use uuid::Uuid;

use crate::geo::BoundingBox;

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use models::{Restaurant, ScanRecord, User};
pub use postgres::PgStore;

/// Errors from the persistence collaborator. Store failures always
/// propagate; they are never folded into "no results".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Abstract document-store contract the engine and evaluator run against.
///
/// Kept to exactly the operations the core needs: candidate retrieval for
/// scans, entity loads for ban checks, the lazy ban-field write-back, and
/// the append-only scan log.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Restaurants whose coordinates fall inside `bounds` (pre-filter path).
    async fn restaurants_in_bounding_box(
        &self,
        bounds: BoundingBox,
    ) -> Result<Vec<Restaurant>, StoreError>;

    /// Every restaurant in the collection (exhaustive path).
    async fn all_restaurants(&self) -> Result<Vec<Restaurant>, StoreError>;

    async fn restaurant_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, StoreError>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Write-back used by the lazy ban cleanup. Idempotent: concurrent
    /// checks racing on an expired ban all write the same reset value.
    async fn set_restaurant_banned_until(
        &self,
        id: Uuid,
        value: DateTime<FixedOffset>,
    ) -> Result<(), StoreError>;

    async fn set_user_banned_until(
        &self,
        id: Uuid,
        value: DateTime<FixedOffset>,
    ) -> Result<(), StoreError>;

    /// Append one scan record. Records are never updated afterwards.
    async fn insert_scan_record(&self, record: ScanRecord) -> Result<ScanRecord, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn health_check(&self) -> Result<(), StoreError>;
}
