//! Routes for branding topics and topic-keyed scripts.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::branding_script::BrandingScript;
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize, TS)]
pub struct CreateBrandingScriptRequest {
    pub topic: String,
    /// Optional viral angle; only the script's opening changes with it.
    pub angle_title: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateBrandingScriptRequest {
    pub content: String,
}

/// POST /api/clients/{id}/branding/topics
/// Five AI-suggested topics; nothing is persisted.
pub async fn suggest_topics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<String>>>, ApiError> {
    let topics = state.branding_service().suggest_topics(id).await?;
    Ok(ResponseJson(ApiResponse::success(topics)))
}

/// GET /api/clients/{id}/branding/scripts
pub async fn list_branding_scripts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<BrandingScript>>>, ApiError> {
    let scripts = state.branding_service().list(id).await?;
    Ok(ResponseJson(ApiResponse::success(scripts)))
}

/// POST /api/clients/{id}/branding/scripts
/// Generate a branding script for the topic and persist it immediately.
pub async fn create_branding_script(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateBrandingScriptRequest>,
) -> Result<ResponseJson<ApiResponse<BrandingScript>>, ApiError> {
    let script = state
        .branding_service()
        .create_script(id, &payload.topic, payload.angle_title.as_deref())
        .await?;
    Ok(ResponseJson(ApiResponse::success(script)))
}

/// PUT /api/branding-scripts/{id}
pub async fn update_branding_script(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateBrandingScriptRequest>,
) -> Result<ResponseJson<ApiResponse<BrandingScript>>, ApiError> {
    let script = state
        .branding_service()
        .update_content(id, &payload.content)
        .await?;
    Ok(ResponseJson(ApiResponse::success(script)))
}

/// DELETE /api/branding-scripts/{id}
pub async fn delete_branding_script(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.branding_service().delete(id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients/{id}/branding/topics", post(suggest_topics))
        .route(
            "/clients/{id}/branding/scripts",
            get(list_branding_scripts).post(create_branding_script),
        )
        .route(
            "/branding-scripts/{id}",
            put(update_branding_script).delete(delete_branding_script),
        )
}
