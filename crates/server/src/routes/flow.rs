//! Routes for the session-scoped script creation flow.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::immersion::ImmersionData;
use db::models::script::Script;
use serde::{Deserialize, Serialize};
use services::services::flow::{FlowSnapshot, ScriptKind};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize, TS)]
pub struct SelectTypologyRequest {
    pub typology_name: String,
}

#[derive(Debug, Deserialize, TS)]
pub struct SelectAngleRequest {
    pub title: String,
}

#[derive(Debug, Deserialize, TS)]
pub struct GuidanceRequest {
    pub guidance: String,
}

#[derive(Debug, Deserialize, TS)]
pub struct GenerateRequest {
    pub kind: ScriptKind,
}

#[derive(Debug, Deserialize, TS)]
pub struct DraftRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct GeneratedScript {
    pub content: String,
}

/// POST /api/clients/{id}/flow
/// Open a new flow session for a client.
pub async fn start_flow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<FlowSnapshot>>, ApiError> {
    let snapshot = state.flow.start(id).await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

/// GET /api/flow/{session_id}
pub async fn get_flow(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<FlowSnapshot>>, ApiError> {
    let snapshot = state.flow.snapshot(session_id)?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

/// POST /api/flow/{session_id}/immersion
pub async fn generate_immersion(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ImmersionData>>, ApiError> {
    let report = state.flow.generate_immersion(session_id).await?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

/// DELETE /api/flow/{session_id}/immersion
pub async fn delete_immersion(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.flow.delete_immersion(session_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/flow/{session_id}/typology
pub async fn select_typology(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    axum::Json(payload): axum::Json<SelectTypologyRequest>,
) -> Result<ResponseJson<ApiResponse<FlowSnapshot>>, ApiError> {
    let snapshot = state
        .flow
        .select_typology(session_id, &payload.typology_name)
        .await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

/// POST /api/flow/{session_id}/angle
pub async fn select_angle(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    axum::Json(payload): axum::Json<SelectAngleRequest>,
) -> Result<ResponseJson<ApiResponse<FlowSnapshot>>, ApiError> {
    let snapshot = state.flow.select_angle(session_id, &payload.title)?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

/// PUT /api/flow/{session_id}/guidance
pub async fn set_guidance(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    axum::Json(payload): axum::Json<GuidanceRequest>,
) -> Result<ResponseJson<ApiResponse<FlowSnapshot>>, ApiError> {
    let snapshot = state.flow.set_guidance(session_id, &payload.guidance)?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

/// POST /api/flow/{session_id}/generate
/// Generate (or regenerate) a draft from the accumulated context.
pub async fn generate_script(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    axum::Json(payload): axum::Json<GenerateRequest>,
) -> Result<ResponseJson<ApiResponse<GeneratedScript>>, ApiError> {
    let content = state.flow.generate(session_id, payload.kind).await?;
    Ok(ResponseJson(ApiResponse::success(GeneratedScript {
        content,
    })))
}

/// PUT /api/flow/{session_id}/draft
pub async fn update_draft(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    axum::Json(payload): axum::Json<DraftRequest>,
) -> Result<ResponseJson<ApiResponse<FlowSnapshot>>, ApiError> {
    let snapshot = state.flow.update_draft(session_id, &payload.content)?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

/// POST /api/flow/{session_id}/edit/{script_id}
/// Load a saved script into the editable buffer, bypassing generation.
pub async fn edit_script(
    State(state): State<AppState>,
    Path((session_id, script_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<FlowSnapshot>>, ApiError> {
    let snapshot = state.flow.edit_script(session_id, script_id).await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

/// POST /api/flow/{session_id}/save
pub async fn save_script(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Script>>, ApiError> {
    let script = state.flow.save(session_id).await?;
    Ok(ResponseJson(ApiResponse::success(script)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients/{id}/flow", post(start_flow))
        .route("/flow/{session_id}", get(get_flow))
        .route(
            "/flow/{session_id}/immersion",
            post(generate_immersion).delete(delete_immersion),
        )
        .route("/flow/{session_id}/typology", post(select_typology))
        .route("/flow/{session_id}/angle", post(select_angle))
        .route("/flow/{session_id}/guidance", put(set_guidance))
        .route("/flow/{session_id}/generate", post(generate_script))
        .route("/flow/{session_id}/draft", put(update_draft))
        .route("/flow/{session_id}/edit/{script_id}", post(edit_script))
        .route("/flow/{session_id}/save", post(save_script))
}
