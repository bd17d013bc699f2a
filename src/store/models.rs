use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::policy::Role;

/// A restaurant listing. `banned_until` in the future means the listing is
/// suspended by moderation; absent or epoch means visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Option<Uuid>,
    pub profile_photo: String,
    pub description: String,
    pub location: GeoPoint,
    pub viewed: i64,
    pub banned_until: Option<DateTime<FixedOffset>>,
}

/// An account. Bans work the same way as for restaurants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub banned_until: Option<DateTime<FixedOffset>>,
}

/// Immutable audit entry written once per proximity scan, never mutated.
/// `nearby_restaurant_ids` holds the ids of the restaurants the scan
/// matched, possibly empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: Uuid,
    pub photo_ref: String,
    pub origin: GeoPoint,
    pub camera_heading_degrees: f64,
    pub scanned_at: DateTime<FixedOffset>,
    pub requesting_user_id: Uuid,
    pub nearby_restaurant_ids: Vec<Uuid>,
}
