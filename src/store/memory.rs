use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::geo::BoundingBox;
use crate::store::models::{Restaurant, ScanRecord, User};
use crate::store::{EntityStore, StoreError};

/// In-process store used by unit and integration tests.
#[derive(Default)]
pub struct MemoryStore {
    restaurants: RwLock<HashMap<Uuid, Restaurant>>,
    users: RwLock<HashMap<Uuid, User>>,
    scan_records: RwLock<Vec<ScanRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_restaurant(&self, restaurant: Restaurant) {
        self.restaurants
            .write()
            .await
            .insert(restaurant.id, restaurant);
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Snapshot of the scan log, oldest first.
    pub async fn scan_records(&self) -> Vec<ScanRecord> {
        self.scan_records.read().await.clone()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn restaurants_in_bounding_box(
        &self,
        bounds: BoundingBox,
    ) -> Result<Vec<Restaurant>, StoreError> {
        let restaurants = self.restaurants.read().await;
        Ok(restaurants
            .values()
            .filter(|r| bounds.contains(r.location))
            .cloned()
            .collect())
    }

    async fn all_restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        let restaurants = self.restaurants.read().await;
        Ok(restaurants.values().cloned().collect())
    }

    async fn restaurant_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, StoreError> {
        Ok(self.restaurants.read().await.get(&id).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn set_restaurant_banned_until(
        &self,
        id: Uuid,
        value: DateTime<FixedOffset>,
    ) -> Result<(), StoreError> {
        let mut restaurants = self.restaurants.write().await;
        match restaurants.get_mut(&id) {
            Some(restaurant) => {
                restaurant.banned_until = Some(value);
                Ok(())
            }
            None => Err(StoreError::QueryError(format!(
                "restaurant {} does not exist",
                id
            ))),
        }
    }

    async fn set_user_banned_until(
        &self,
        id: Uuid,
        value: DateTime<FixedOffset>,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.banned_until = Some(value);
                Ok(())
            }
            None => Err(StoreError::QueryError(format!("user {} does not exist", id))),
        }
    }

    async fn insert_scan_record(&self, record: ScanRecord) -> Result<ScanRecord, StoreError> {
        self.scan_records.write().await.push(record.clone());
        Ok(record)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
