use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::client::{FieldError, ValidationErrors};
use services::services::{
    branding::BrandingError, flow::FlowError, gemini_api::GeminiApiError,
    immersion::ImmersionError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Generation(#[from] GeminiApiError),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Immersion(#[from] ImmersionError),
    #[error(transparent)]
    Branding(#[from] BrandingError),
    #[error("{0} not found")]
    NotFound(&'static str),
}

fn generation_message(err: &GeminiApiError) -> String {
    if err.is_transport() {
        format!("AI generation failed, check your API key: {err}")
    } else {
        format!("AI response could not be parsed: {err}")
    }
}

fn flow_status(err: &FlowError) -> StatusCode {
    match err {
        FlowError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        FlowError::Generation(_) => StatusCode::BAD_GATEWAY,
        FlowError::SessionNotFound
        | FlowError::ClientNotFound
        | FlowError::ScriptNotFound
        | FlowError::ImmersionMissing => StatusCode::NOT_FOUND,
        FlowError::UnknownAngle(_) | FlowError::UnknownTypology(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        FlowError::TypologyRequired
        | FlowError::AngleRequired
        | FlowError::NoOpenScript
        | FlowError::EmptyDraft => StatusCode::CONFLICT,
    }
}

fn immersion_status(err: &ImmersionError) -> StatusCode {
    match err {
        ImmersionError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ImmersionError::Generation(_) => StatusCode::BAD_GATEWAY,
        ImmersionError::ClientNotFound | ImmersionError::ImmersionMissing => StatusCode::NOT_FOUND,
    }
}

fn branding_status(err: &BrandingError) -> StatusCode {
    match err {
        BrandingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        BrandingError::Generation(_) => StatusCode::BAD_GATEWAY,
        BrandingError::ClientNotFound | BrandingError::ScriptNotFound => StatusCode::NOT_FOUND,
        BrandingError::UnknownAngle(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BrandingError::TopicRequired => StatusCode::CONFLICT,
    }
}

fn plain(status: StatusCode, message: String) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let body: ApiResponse<Vec<FieldError>> =
                    ApiResponse::error_with_data("validation failed", errors.fields);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            ApiError::Database(err) => plain(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("database error: {err}"),
            ),
            ApiError::Generation(err) => plain(StatusCode::BAD_GATEWAY, generation_message(&err)),
            ApiError::Flow(err) => {
                let message = match &err {
                    FlowError::Generation(inner) => generation_message(inner),
                    other => other.to_string(),
                };
                plain(flow_status(&err), message)
            }
            ApiError::Immersion(err) => {
                let message = match &err {
                    ImmersionError::Generation(inner) => generation_message(inner),
                    other => other.to_string(),
                };
                plain(immersion_status(&err), message)
            }
            ApiError::Branding(err) => {
                let message = match &err {
                    BrandingError::Generation(inner) => generation_message(inner),
                    other => other.to_string(),
                };
                plain(branding_status(&err), message)
            }
            ApiError::NotFound(what) => {
                plain(StatusCode::NOT_FOUND, format!("{what} not found"))
            }
        }
    }
}
