use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use uuid::Uuid;

use foodscan_api::clock::{epoch, Clock, FixedClock};
use foodscan_api::geo::GeoPoint;
use foodscan_api::scan::{CandidateStrategy, ProximityEngine, ScanError, ScanQuery};
use foodscan_api::store::models::Restaurant;
use foodscan_api::store::{EntityStore, MemoryStore};

fn restaurant(name: &str, latitude: f64, longitude: f64) -> Restaurant {
    Restaurant {
        id: Uuid::new_v4(),
        name: name.to_string(),
        owner_id: None,
        profile_photo: String::new(),
        description: String::new(),
        location: GeoPoint::new(latitude, longitude),
        viewed: 0,
        banned_until: None,
    }
}

fn query(origin: GeoPoint, heading: f64, radius_meters: f64) -> ScanQuery {
    ScanQuery {
        origin,
        camera_heading_degrees: heading,
        radius_meters,
        requester_id: Uuid::new_v4(),
        photo_ref: "scan-001.jpg".to_string(),
    }
}

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(epoch() + Duration::days(1000)))
}

fn engine(store: &Arc<MemoryStore>, strategy: CandidateStrategy) -> ProximityEngine {
    let store_dyn: Arc<dyn EntityStore> = store.clone();
    let clock: Arc<dyn Clock> = fixed_clock();
    ProximityEngine::new(store_dyn, clock).with_strategy(strategy)
}

#[tokio::test]
async fn includes_restaurant_about_157_meters_away() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let close = restaurant("El Fogon", 10.001, 10.001);
    store.insert_restaurant(close.clone()).await;

    let engine = engine(&store, CandidateStrategy::Exhaustive);
    let outcome = engine
        .find_nearby(query(GeoPoint::new(10.0, 10.0), 0.0, 500.0))
        .await?;

    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].id, close.id);
    assert_eq!(outcome.record.nearby_restaurant_ids, vec![close.id]);
    Ok(())
}

#[tokio::test]
async fn excludes_restaurant_about_15_7_km_away() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_restaurant(restaurant("Lejania", 10.1, 10.1))
        .await;

    let engine = engine(&store, CandidateStrategy::Exhaustive);
    let outcome = engine
        .find_nearby(query(GeoPoint::new(10.0, 10.0), 0.0, 500.0))
        .await?;

    assert!(outcome.matches.is_empty());
    // Zero matches is still a successful scan with a logged record
    assert!(outcome.record.nearby_restaurant_ids.is_empty());
    assert_eq!(store.scan_records().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn every_scan_writes_exactly_one_record_matching_the_result() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let close = restaurant("La Esquina", 10.001, 10.0);
    store.insert_restaurant(close.clone()).await;

    let engine = engine(&store, CandidateStrategy::Exhaustive);
    let origin = GeoPoint::new(10.0, 10.0);

    let first = engine.find_nearby(query(origin, 90.0, 500.0)).await?;
    let second = engine.find_nearby(query(origin, 90.0, 500.0)).await?;

    let records = store.scan_records().await;
    assert_eq!(records.len(), 2);
    assert_ne!(first.record.id, second.record.id);
    for record in &records {
        assert_eq!(record.nearby_restaurant_ids, vec![close.id]);
        assert_eq!(record.origin, origin);
        assert_eq!(record.photo_ref, "scan-001.jpg");
        // Stamped by the application clock, not the wall clock
        assert_eq!(record.scanned_at, epoch() + Duration::days(1000));
    }
    Ok(())
}

#[tokio::test]
async fn banned_restaurants_are_excluded_and_expired_bans_are_cleared() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let now = epoch() + Duration::days(1000);

    let mut suspended = restaurant("Clausurado", 10.001, 10.0);
    suspended.banned_until = Some(now + Duration::hours(6));
    let mut recovered = restaurant("Rehabilitado", 10.0, 10.001);
    recovered.banned_until = Some(now - Duration::hours(6));
    store.insert_restaurant(suspended.clone()).await;
    store.insert_restaurant(recovered.clone()).await;

    let engine = engine(&store, CandidateStrategy::Exhaustive);
    let outcome = engine
        .find_nearby(query(GeoPoint::new(10.0, 10.0), 0.0, 500.0))
        .await?;

    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].id, recovered.id);
    // The returned value reflects the healed state, not the stale ban
    assert_eq!(outcome.matches[0].banned_until, Some(epoch()));

    // Lazy cleanup on the read path: the stale ban now reads as epoch
    let healed = store
        .restaurant_by_id(recovered.id)
        .await?
        .context("recovered restaurant vanished")?;
    assert_eq!(healed.banned_until, Some(epoch()));
    let still_banned = store
        .restaurant_by_id(suspended.id)
        .await?
        .context("suspended restaurant vanished")?;
    assert_eq!(still_banned.banned_until, suspended.banned_until);
    Ok(())
}

#[tokio::test]
async fn non_finite_input_fails_fast_without_logging_a_scan() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_restaurant(restaurant("Cualquiera", 10.001, 10.001))
        .await;

    let engine = engine(&store, CandidateStrategy::Exhaustive);
    let result = engine
        .find_nearby(query(GeoPoint::new(f64::NAN, 10.0), 0.0, 500.0))
        .await;

    assert!(matches!(result, Err(ScanError::InvalidInput(_))));
    assert!(store.scan_records().await.is_empty());

    let result = engine
        .find_nearby(query(GeoPoint::new(10.0, 10.0), f64::INFINITY, 500.0))
        .await;
    assert!(matches!(result, Err(ScanError::InvalidInput(_))));

    let result = engine
        .find_nearby(query(GeoPoint::new(10.0, 10.0), 0.0, -5.0))
        .await;
    assert!(matches!(result, Err(ScanError::InvalidInput(_))));
}

#[tokio::test]
async fn bounding_box_prefilter_can_miss_what_the_exhaustive_scan_finds() -> Result<()> {
    // ~1.1 km away: inside a 2 km radius but outside the 0.007 degree
    // window. The pre-filter is an optimization, not ground truth.
    let store = Arc::new(MemoryStore::new());
    let edge_case = restaurant("Al Borde", 10.01, 10.0);
    store.insert_restaurant(edge_case.clone()).await;

    let origin = GeoPoint::new(10.0, 10.0);

    let boxed = engine(&store, CandidateStrategy::BoundingBox);
    let outcome = boxed.find_nearby(query(origin, 0.0, 2000.0)).await?;
    assert!(outcome.matches.is_empty());

    let exhaustive = engine(&store, CandidateStrategy::Exhaustive);
    let outcome = exhaustive.find_nearby(query(origin, 0.0, 2000.0)).await?;
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].id, edge_case.id);
    Ok(())
}

#[tokio::test]
async fn legacy_bearing_filter_keeps_only_the_camera_cone() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let ahead = restaurant("De Frente", 10.001, 10.0); // bearing 0
    let westward = restaurant("Al Oeste", 10.0, 9.999); // bearing 270
    store.insert_restaurant(ahead.clone()).await;
    store.insert_restaurant(westward.clone()).await;

    let engine = engine(&store, CandidateStrategy::Exhaustive).with_bearing_filter(true);
    let outcome = engine
        .find_nearby(query(GeoPoint::new(10.0, 10.0), 0.0, 500.0))
        .await?;

    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].id, ahead.id);
    Ok(())
}
