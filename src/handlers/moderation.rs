use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::moderation::EntityKind;
use crate::policy::{self, Action, Decision, Resource};

/// GET /api/moderation/banned/:kind/:id - current suspension state.
///
/// Admins may check any entity; everyone else only their own account.
/// A missing entity is a 404, never "not banned".
pub async fn banned_get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    let kind: EntityKind = kind
        .parse()
        .map_err(|_| ApiError::bad_request("unknown entity kind, expected 'user' or 'restaurant'"))?;

    if let Decision::Deny(reason) = policy::check(
        &auth_user.actor(),
        Action::CheckBan,
        &Resource::Entity { kind, id },
    ) {
        return Err(ApiError::forbidden(reason));
    }

    let banned = state.evaluator.is_banned(id, kind).await?;

    Ok(Json(json!({
        "kind": kind.as_str(),
        "id": id,
        "banned": banned,
    })))
}
