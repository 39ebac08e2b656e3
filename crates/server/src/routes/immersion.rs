//! Routes for the immersion research report attached to a client.

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::get,
};
use db::models::immersion::{ImmersionData, UserTypology};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// POST /api/clients/{id}/immersion
/// Generate a fresh report and persist it, replacing any previous one.
pub async fn generate_immersion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ImmersionData>>, ApiError> {
    let report = state.immersion_service().generate_and_store(id).await?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

/// GET /api/clients/{id}/immersion
pub async fn get_immersion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ImmersionData>>, ApiError> {
    let report = state.immersion_service().get(id).await?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

/// DELETE /api/clients/{id}/immersion
/// Saved scripts that reference the report's typology names are untouched.
pub async fn delete_immersion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.immersion_service().delete(id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/clients/{id}/immersion/export
/// The report as a downloadable flat text file.
pub async fn export_immersion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let report = state.immersion_service().export(id).await?;
    let headers = [
        (
            header::CONTENT_TYPE,
            "text/plain; charset=utf-8".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.filename),
        ),
    ];
    Ok((headers, report.body).into_response())
}

/// GET /api/clients/{id}/typologies
/// The buyer segments from the stored report.
pub async fn list_typologies(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<UserTypology>>>, ApiError> {
    let report = state.immersion_service().get(id).await?;
    Ok(ResponseJson(ApiResponse::success(report.user_typologies)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/clients/{id}/immersion",
            get(get_immersion)
                .post(generate_immersion)
                .delete(delete_immersion),
        )
        .route("/clients/{id}/immersion/export", get(export_immersion))
        .route("/clients/{id}/typologies", get(list_typologies))
}
