//! Routes for client (product/offer) records.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::client::{Client, CreateClient, UpdateClient};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize, TS)]
pub struct ListClientsQuery {
    pub user_id: Uuid,
}

/// GET /api/clients?user_id=...
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListClientsQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Client>>>, ApiError> {
    let clients = Client::find_by_user_id(&state.pool, query.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(clients)))
}

/// POST /api/clients
/// Validation runs before any store call; a failing payload never reaches it.
pub async fn create_client(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateClient>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    payload.validate()?;
    let client = Client::create(&state.pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// GET /api/clients/{id}
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let client = Client::find_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// PUT /api/clients/{id}
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateClient>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    payload.validate()?;
    Client::find_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    let client = Client::update(&state.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// DELETE /api/clients/{id}
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Client::delete(&state.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("client"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
}
