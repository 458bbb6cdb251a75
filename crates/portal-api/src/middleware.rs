use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use portal_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

/// Access-control gate for bearer-authenticated routes: extracts the JWT
/// from the Authorization header and validates it against the shared secret.
///
/// Missing header (or not a Bearer scheme) is Unauthorized; a token that is
/// present but invalid or expired is Forbidden. Public routes simply don't
/// take this extractor.
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized("Unauthorized: No token provided"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Unauthorized: No token provided"))?;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| ApiError::Forbidden)?;

        Ok(AuthUser(token_data.claims))
    }
}
