use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::clock::app_offset;
use crate::config;
use crate::geo::{BoundingBox, GeoPoint};
use crate::policy::Role;
use crate::store::models::{Restaurant, ScanRecord, User};
use crate::store::{EntityStore, StoreError};

const RESTAURANT_COLUMNS: &str =
    "id, name, owner_id, profile_photo, description, latitude, longitude, viewed, banned_until";

/// Postgres-backed store. Timestamps are stored as timestamptz and
/// rendered back at the application's fixed UTC-4 offset.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Build a pooled store from a connection URL, using the configured
    /// pool limits.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let db_config = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.connection_timeout))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!("Connected store pool ({} max connections)", db_config.max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RestaurantRow {
    id: Uuid,
    name: String,
    owner_id: Option<Uuid>,
    profile_photo: String,
    description: String,
    latitude: f64,
    longitude: f64,
    viewed: i64,
    banned_until: Option<DateTime<Utc>>,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Restaurant {
            id: row.id,
            name: row.name,
            owner_id: row.owner_id,
            profile_photo: row.profile_photo,
            description: row.description,
            location: GeoPoint::new(row.latitude, row.longitude),
            viewed: row.viewed,
            banned_until: row.banned_until.map(|t| t.with_timezone(&app_offset())),
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    banned_until: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: Role::parse(&row.role),
            banned_until: row.banned_until.map(|t| t.with_timezone(&app_offset())),
        }
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn restaurants_in_bounding_box(
        &self,
        bounds: BoundingBox,
    ) -> Result<Vec<Restaurant>, StoreError> {
        let rows = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {} FROM restaurants
             WHERE latitude BETWEEN $1 AND $2
               AND longitude BETWEEN $3 AND $4",
            RESTAURANT_COLUMNS
        ))
        .bind(bounds.min_latitude)
        .bind(bounds.max_latitude)
        .bind(bounds.min_longitude)
        .bind(bounds.max_longitude)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Restaurant::from).collect())
    }

    async fn all_restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        let rows = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {} FROM restaurants",
            RESTAURANT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Restaurant::from).collect())
    }

    async fn restaurant_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, StoreError> {
        let row = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {} FROM restaurants WHERE id = $1",
            RESTAURANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Restaurant::from))
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, banned_until FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn set_restaurant_banned_until(
        &self,
        id: Uuid,
        value: DateTime<FixedOffset>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE restaurants SET banned_until = $2 WHERE id = $1")
            .bind(id)
            .bind(value.with_timezone(&Utc))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_user_banned_until(
        &self,
        id: Uuid,
        value: DateTime<FixedOffset>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET banned_until = $2 WHERE id = $1")
            .bind(id)
            .bind(value.with_timezone(&Utc))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_scan_record(&self, record: ScanRecord) -> Result<ScanRecord, StoreError> {
        sqlx::query(
            "INSERT INTO scan_records
             (id, photo_ref, latitude, longitude, camera_heading_degrees,
              scanned_at, requesting_user_id, nearby_restaurant_ids)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(record.id)
        .bind(&record.photo_ref)
        .bind(record.origin.latitude)
        .bind(record.origin.longitude)
        .bind(record.camera_heading_degrees)
        .bind(record.scanned_at.with_timezone(&Utc))
        .bind(record.requesting_user_id)
        .bind(&record.nearby_restaurant_ids)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
