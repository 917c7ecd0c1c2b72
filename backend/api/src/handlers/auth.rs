/// Authentication handlers
///
/// Thin layer over the auth service: decode the payload, call the service,
/// map the typed result onto an HTTP response. Email delivery is scheduled
/// on detached tasks after the service call so responses never wait on SMTP.
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::error::AuthError;
use crate::middleware::CurrentUser;
use crate::models::user::{
    EmailVerificationRequest, LoginRequest, PasswordReset, PasswordResetRequest,
    RefreshTokenRequest, RegisterRequest, TokenPair,
};
use crate::models::UserProfile;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: i64,
    pub verification_sent: bool,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    let (user, verification_token) = state.auth.register(payload).await?;

    let verification_sent = user.email.is_some();
    if let Some(email) = user.email.clone() {
        let mailer = state.mailer.clone();
        let name = user.full_name.clone();
        tokio::spawn(async move {
            if let Err(err) = mailer
                .send_verification_email(&email, &verification_token, &name)
                .await
            {
                tracing::error!(%email, %err, "verification email delivery failed");
            }
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user_id: user.id,
            verification_sent,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let (_user, pair) = state.auth.authenticate(payload).await?;
    Ok(Json(pair))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<EmailVerificationRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    state.auth.verify_email(&payload.token).await?;
    Ok(Json(MessageResponse {
        message: "Email verified successfully",
    }))
}

/// Always answers with the same message, whether or not the address is
/// known, to prevent account enumeration.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> Json<MessageResponse> {
    match state.auth.request_password_reset(&payload.email).await {
        Ok(Some((user, reset_token))) => {
            let mailer = state.mailer.clone();
            let email = payload.email.clone();
            tokio::spawn(async move {
                if let Err(err) = mailer
                    .send_password_reset_email(&email, &reset_token, &user.full_name)
                    .await
                {
                    tracing::error!(%email, %err, "password reset email delivery failed");
                }
            });
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!(%err, "password reset request failed");
        }
    }

    Json(MessageResponse {
        message: "If the email exists, a reset link has been sent",
    })
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<PasswordReset>,
) -> Result<Json<MessageResponse>, AuthError> {
    state
        .auth
        .reset_password(&payload.token, &payload.new_password)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password reset successfully",
    }))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let pair = state.auth.refresh(&payload.refresh_token).await?;
    Ok(Json(pair))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(user)
}

/// Stateless tokens: logout just acknowledges; the client discards its pair.
pub async fn logout(CurrentUser(user): CurrentUser) -> Json<MessageResponse> {
    tracing::info!(user_id = user.id, "user logged out");
    Json(MessageResponse {
        message: "Logged out successfully",
    })
}
