use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config;
use crate::geo::{
    bearing_degrees, bearing_difference_degrees, haversine_km, BoundingBox, GeoPoint,
};
use crate::moderation::{BanDecision, EntityKind};
use crate::store::models::{Restaurant, ScanRecord};
use crate::store::{EntityStore, StoreError};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How candidates are pulled from the store before distance filtering.
///
/// `BoundingBox` is the production path: a fixed degree window trims the
/// candidate set before any trig runs. It can reject true positives where
/// longitudes wrap at the 180th meridian, so `Exhaustive` - Haversine
/// against the whole collection - remains the functional ground truth and
/// is what correctness tests run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateStrategy {
    BoundingBox,
    Exhaustive,
}

/// One scan request as the engine sees it, already stripped of transport
/// concerns.
#[derive(Debug, Clone)]
pub struct ScanQuery {
    pub origin: GeoPoint,
    pub camera_heading_degrees: f64,
    pub radius_meters: f64,
    pub requester_id: Uuid,
    pub photo_ref: String,
}

/// Result of a scan: the matched restaurants and the audit record that
/// was durably written for the request.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub matches: Vec<Restaurant>,
    pub record: ScanRecord,
}

/// Selects the restaurants within range of an observer and durably logs
/// the query.
pub struct ProximityEngine {
    store: Arc<dyn EntityStore>,
    clock: Arc<dyn Clock>,
    strategy: CandidateStrategy,
    bearing_filter: bool,
    bearing_tolerance_degrees: f64,
    bounding_window_degrees: f64,
}

impl ProximityEngine {
    /// Engine wired from the application config.
    pub fn new(store: Arc<dyn EntityStore>, clock: Arc<dyn Clock>) -> Self {
        let geo = &config::config().geo;
        Self {
            store,
            clock,
            strategy: if geo.exhaustive_scan {
                CandidateStrategy::Exhaustive
            } else {
                CandidateStrategy::BoundingBox
            },
            bearing_filter: geo.enable_bearing_filter,
            bearing_tolerance_degrees: geo.bearing_tolerance_degrees,
            bounding_window_degrees: geo.bounding_box_degrees,
        }
    }

    pub fn with_strategy(mut self, strategy: CandidateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable the legacy camera-cone filter. Off on the primary
    /// endpoint; some older clients still rely on it.
    pub fn with_bearing_filter(mut self, enabled: bool) -> Self {
        self.bearing_filter = enabled;
        self
    }

    /// Run one proximity scan.
    ///
    /// Always writes exactly one scan record, even when nothing matched -
    /// an empty result is a successful scan, not an error. Restaurants
    /// under an active ban are excluded; expired bans found along the way
    /// are lazily cleared.
    pub async fn find_nearby(&self, query: ScanQuery) -> Result<ScanOutcome, ScanError> {
        self.validate(&query)?;

        let candidates = match self.strategy {
            CandidateStrategy::BoundingBox => {
                let bounds = BoundingBox::around(query.origin, self.bounding_window_degrees);
                self.store.restaurants_in_bounding_box(bounds).await?
            }
            CandidateStrategy::Exhaustive => self.store.all_restaurants().await?,
        };
        debug!(
            "Scan by {} pulled {} candidates ({:?})",
            query.requester_id,
            candidates.len(),
            self.strategy
        );

        let radius_km = query.radius_meters / 1000.0;
        let now = self.clock.now();
        let mut matches = Vec::new();

        for mut restaurant in candidates {
            let ban = BanDecision::evaluate(
                EntityKind::Restaurant,
                restaurant.id,
                restaurant.banned_until,
                now,
            );
            if let Some(cleanup) = ban.cleanup {
                self.store
                    .set_restaurant_banned_until(cleanup.entity_id, cleanup.reset_to)
                    .await?;
                // Keep the returned value in step with the write-back
                restaurant.banned_until = Some(cleanup.reset_to);
            }
            if ban.is_banned {
                continue;
            }

            if haversine_km(query.origin, restaurant.location) > radius_km {
                continue;
            }

            if self.bearing_filter {
                let bearing = bearing_degrees(query.origin, restaurant.location);
                let difference =
                    bearing_difference_degrees(query.camera_heading_degrees, bearing);
                if difference > self.bearing_tolerance_degrees {
                    continue;
                }
            }

            matches.push(restaurant);
        }

        let record = ScanRecord {
            id: Uuid::new_v4(),
            photo_ref: query.photo_ref,
            origin: query.origin,
            camera_heading_degrees: query.camera_heading_degrees,
            scanned_at: now,
            requesting_user_id: query.requester_id,
            nearby_restaurant_ids: matches.iter().map(|r| r.id).collect(),
        };
        let record = self.store.insert_scan_record(record).await?;

        info!(
            "Scan {} matched {} restaurants within {} m",
            record.id,
            matches.len(),
            query.radius_meters
        );
        Ok(ScanOutcome { matches, record })
    }

    /// Reject malformed numeric input before it reaches the trigonometry,
    /// where a NaN would silently poison every comparison.
    fn validate(&self, query: &ScanQuery) -> Result<(), ScanError> {
        if !query.origin.is_valid() {
            return Err(ScanError::InvalidInput(format!(
                "origin out of range: ({}, {})",
                query.origin.latitude, query.origin.longitude
            )));
        }
        if !query.camera_heading_degrees.is_finite() {
            return Err(ScanError::InvalidInput(
                "camera heading must be a finite number".to_string(),
            ));
        }
        if !query.radius_meters.is_finite() || query.radius_meters <= 0.0 {
            return Err(ScanError::InvalidInput(format!(
                "radius must be a positive number of meters, got {}",
                query.radius_meters
            )));
        }
        let max_radius = config::config().api.max_scan_radius_meters;
        if query.radius_meters > max_radius {
            return Err(ScanError::InvalidInput(format!(
                "radius {} m exceeds the maximum of {} m",
                query.radius_meters, max_radius
            )));
        }
        Ok(())
    }
}
