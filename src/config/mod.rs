use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::geo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub geo: GeoConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    /// Degree window of the bounding-box candidate pre-filter.
    pub bounding_box_degrees: f64,
    /// Half-angle of the camera cone for the legacy bearing filter.
    pub bearing_tolerance_degrees: f64,
    /// Apply the legacy bearing filter on scans.
    pub enable_bearing_filter: bool,
    /// Skip the bounding-box pre-filter and compute distance against the
    /// full collection.
    pub exhaustive_scan: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Upper bound on the requested scan radius.
    pub max_scan_radius_meters: f64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment defaults first, then specific env vars on top
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Geo overrides
        if let Ok(v) = env::var("GEO_BOUNDING_BOX_DEGREES") {
            self.geo.bounding_box_degrees = v.parse().unwrap_or(self.geo.bounding_box_degrees);
        }
        if let Ok(v) = env::var("GEO_BEARING_TOLERANCE_DEGREES") {
            self.geo.bearing_tolerance_degrees =
                v.parse().unwrap_or(self.geo.bearing_tolerance_degrees);
        }
        if let Ok(v) = env::var("GEO_ENABLE_BEARING_FILTER") {
            self.geo.enable_bearing_filter = v.parse().unwrap_or(self.geo.enable_bearing_filter);
        }
        if let Ok(v) = env::var("GEO_EXHAUSTIVE_SCAN") {
            self.geo.exhaustive_scan = v.parse().unwrap_or(self.geo.exhaustive_scan);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout =
                v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_MAX_SCAN_RADIUS_METERS") {
            self.api.max_scan_radius_meters =
                v.parse().unwrap_or(self.api.max_scan_radius_meters);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging =
                v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            geo: GeoConfig {
                bounding_box_degrees: geo::BOUNDING_BOX_DEGREES,
                bearing_tolerance_degrees: geo::BEARING_TOLERANCE_DEGREES,
                enable_bearing_filter: false,
                exhaustive_scan: false,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                max_scan_radius_meters: 50_000.0,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            geo: GeoConfig {
                bounding_box_degrees: geo::BOUNDING_BOX_DEGREES,
                bearing_tolerance_degrees: geo::BEARING_TOLERANCE_DEGREES,
                enable_bearing_filter: false,
                exhaustive_scan: false,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                max_scan_radius_meters: 20_000.0,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            geo: GeoConfig {
                bounding_box_degrees: geo::BOUNDING_BOX_DEGREES,
                bearing_tolerance_degrees: geo::BEARING_TOLERANCE_DEGREES,
                enable_bearing_filter: false,
                exhaustive_scan: false,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                max_scan_radius_meters: 10_000.0,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.geo.bounding_box_degrees, 0.007);
        assert_eq!(config.geo.bearing_tolerance_degrees, 45.0);
        assert!(!config.geo.enable_bearing_filter);
        assert_eq!(config.api.max_scan_radius_meters, 50_000.0);
        assert!(config.api.enable_request_logging);
        assert!(config.security.enable_cors);
    }

    #[test]
    fn production_tightens_limits() {
        let config = AppConfig::production();
        assert_eq!(config.api.max_scan_radius_meters, 10_000.0);
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.security.jwt_expiry_hours, 4);
    }
}
