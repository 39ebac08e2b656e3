//! Routes for the static marketing-angle catalogs.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::script::Script;
use serde::Serialize;
use services::services::angles::{
    MarketingAngle, angles_by_usage, branding_angles, content_angles, script_counts_by_angle,
};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Serialize, TS)]
pub struct AngleWithCount {
    pub title: String,
    pub description: String,
    pub script_count: usize,
}

/// GET /api/angles/content
pub async fn list_content_angles() -> ResponseJson<ApiResponse<Vec<MarketingAngle>>> {
    ResponseJson(ApiResponse::success(content_angles()))
}

/// GET /api/angles/branding
pub async fn list_branding_angles() -> ResponseJson<ApiResponse<Vec<MarketingAngle>>> {
    ResponseJson(ApiResponse::success(branding_angles()))
}

/// GET /api/clients/{id}/angles
/// The content catalog annotated with the client's saved-script counts and
/// reordered so the most-used angles come first.
pub async fn list_angles_for_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<AngleWithCount>>>, ApiError> {
    let scripts = Script::find_by_client_id(&state.pool, id).await?;
    let counts = script_counts_by_angle(&scripts);
    let annotated = angles_by_usage(&scripts)
        .into_iter()
        .map(|angle| AngleWithCount {
            script_count: counts.get(&angle.title).copied().unwrap_or(0),
            title: angle.title,
            description: angle.description,
        })
        .collect();
    Ok(ResponseJson(ApiResponse::success(annotated)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/angles/content", get(list_content_angles))
        .route("/angles/branding", get(list_branding_angles))
        .route("/clients/{id}/angles", get(list_angles_for_client))
}
