use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use foodscan_api::clock::AppClock;
use foodscan_api::handlers::{self, AppState};
use foodscan_api::middleware::jwt_auth_middleware;
use foodscan_api::moderation::BanEvaluator;
use foodscan_api::scan::ProximityEngine;
use foodscan_api::store::{EntityStore, PgStore};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT secret, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = foodscan_api::config::config();
    tracing::info!("Starting FoodScan API in {:?} mode", config.environment);

    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let store: Arc<dyn EntityStore> = Arc::new(
        PgStore::connect(&database_url)
            .await
            .unwrap_or_else(|e| panic!("failed to connect store: {}", e)),
    );
    let clock = Arc::new(AppClock);

    let state = AppState {
        store: store.clone(),
        engine: Arc::new(ProximityEngine::new(store.clone(), clock.clone())),
        evaluator: Arc::new(BanEvaluator::new(store, clock)),
    };

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("FOODSCAN_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("FoodScan API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    let config = foodscan_api::config::config();

    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state.clone());

    let mut router = public
        // Protected API
        .merge(api_routes(state));

    // Global middleware, gated by config
    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn api_routes(state: AppState) -> Router {
    Router::new()
        // Proximity scan; legacy path parameter names preserved
        .route(
            "/api/restaurants/nearby/:latitud/:longitud/:anguloCamara/:distanciaRequerida",
            post(handlers::nearby_post),
        )
        // Moderation ban check
        .route(
            "/api/moderation/banned/:kind/:id",
            get(handlers::banned_get),
        )
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
        .with_state(state)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "FoodScan API (Rust)",
            "version": version,
            "description": "Restaurant proximity scanning and moderation core built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "nearby": "/api/restaurants/nearby/:latitud/:longitud/:anguloCamara/:distanciaRequerida (protected)",
                "banned": "/api/moderation/banned/:kind/:id (protected)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
