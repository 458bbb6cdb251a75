use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portal_types::api::ErrorBody;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error taxonomy for the whole REST surface. Every variant renders as the
/// matching status code with a JSON `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing token or bad credentials.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Token present but invalid or expired.
    #[error("Invalid token")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    /// Duplicate email at signup.
    #[error("Email already exists")]
    Conflict,

    /// Missing/empty/unknown fields, rejected at the boundary.
    #[error("{0}")]
    BadRequest(String),

    /// Store or other unexpected failure. Logged; the caller gets a generic
    /// message.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(anyhow::Error::new(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Invalid token".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::Conflict => (StatusCode::CONFLICT, "Email already exists".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(e) => {
                error!("internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// JSON body extractor that reports every boundary rejection — malformed
/// JSON, missing fields, unknown fields — as a BadRequest in the taxonomy
/// instead of axum's stock 422/415 responses.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(ApiJson(value))
    }
}
