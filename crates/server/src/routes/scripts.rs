//! Routes for saved scripts.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::script::Script;
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize, TS)]
pub struct ListScriptsQuery {
    /// When present, only scripts saved under this angle title are returned.
    pub angle_title: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateScriptRequest {
    pub content: String,
}

/// GET /api/clients/{id}/scripts
pub async fn list_scripts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListScriptsQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Script>>>, ApiError> {
    let mut scripts = Script::find_by_client_id(&state.pool, id).await?;
    if let Some(angle_title) = query.angle_title {
        scripts.retain(|s| s.angle_title == angle_title);
    }
    Ok(ResponseJson(ApiResponse::success(scripts)))
}

/// PUT /api/scripts/{id}
pub async fn update_script(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateScriptRequest>,
) -> Result<ResponseJson<ApiResponse<Script>>, ApiError> {
    Script::find_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("script"))?;
    let script = Script::update_content(&state.pool, id, &payload.content).await?;
    Ok(ResponseJson(ApiResponse::success(script)))
}

/// DELETE /api/scripts/{id}
pub async fn delete_script(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Script::delete(&state.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("script"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients/{id}/scripts", get(list_scripts))
        .route("/scripts/{id}", put(update_script).delete(delete_script))
}
