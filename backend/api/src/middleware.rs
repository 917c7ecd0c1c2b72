/// Bearer-token extraction for authenticated routes
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::error::AuthError;
use crate::models::UserProfile;
use crate::AppState;

/// Extracts the identity behind the `Authorization: Bearer` header.
/// Rejects missing/invalid tokens and soft-deleted accounts.
pub struct CurrentUser(pub UserProfile);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AuthError::InvalidToken)?;

        let user = state.auth.current_user(token).await?;
        Ok(CurrentUser(user))
    }
}
