use chrono::{DateTime, FixedOffset, Utc};

/// Application-wide clock offset, in hours relative to UTC.
///
/// Scan records and ban comparisons have always been stamped at UTC-4.
/// This is a deliberate application convention (a fixed offset, not a
/// timezone-aware conversion) and is reproduced exactly for compatibility
/// with existing stored timestamps.
pub const APP_UTC_OFFSET_HOURS: i32 = -4;

/// The fixed UTC-4 offset used for all application timestamps.
pub fn app_offset() -> FixedOffset {
    FixedOffset::east_opt(APP_UTC_OFFSET_HOURS * 3600).expect("UTC-4 is a valid offset")
}

/// The zero value a cleared `banned_until` field is reset to.
pub fn epoch() -> DateTime<FixedOffset> {
    DateTime::from_timestamp(0, 0)
        .expect("unix epoch is representable")
        .with_timezone(&app_offset())
}

/// Single named time source so the UTC-4 convention lives in one place
/// and can be swapped out in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// System-backed clock at the application offset.
#[derive(Debug, Default, Clone)]
pub struct AppClock;

impl Clock for AppClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&app_offset())
    }
}

/// Deterministic clock for tests and replay.
#[derive(Debug, Clone)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
