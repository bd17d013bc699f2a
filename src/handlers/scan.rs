use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::geo::GeoPoint;
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::policy::{self, Action, Decision, Resource};
use crate::scan::ScanQuery;

/// Body of a scan request. Field name kept from the original clients.
#[derive(Debug, Deserialize)]
pub struct ScanBody {
    pub foto: String,
}

/// POST /api/restaurants/nearby/:latitud/:longitud/:anguloCamara/:distanciaRequerida
///
/// Path segment names mirror the legacy route so existing mobile clients
/// keep working unchanged.
pub async fn nearby_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((latitud, longitud, angulo_camara, distancia_requerida)): Path<(f64, f64, f64, f64)>,
    Json(body): Json<ScanBody>,
) -> Result<Json<Value>, ApiError> {
    if let Decision::Deny(reason) = policy::check(
        &auth_user.actor(),
        Action::ScanNearby,
        &Resource::RestaurantCollection,
    ) {
        return Err(ApiError::forbidden(reason));
    }

    let query = ScanQuery {
        origin: GeoPoint::new(latitud, longitud),
        camera_heading_degrees: angulo_camara,
        radius_meters: distancia_requerida,
        requester_id: auth_user.user_id,
        photo_ref: body.foto,
    };

    let outcome = state.engine.find_nearby(query).await?;

    Ok(Json(json!({
        "message": "Restaurantes cercanos dentro de la distancia",
        "escaneosNear": outcome.matches,
        "escaneoId": outcome.record.id,
    })))
}
