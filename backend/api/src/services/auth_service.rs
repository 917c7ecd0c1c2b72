use std::sync::Arc;

use chrono::{Duration, Utc};
use validator::Validate;

use crate::config::Config;
use crate::db::{TokenStore, UserStore};
use crate::error::{AuthError, Result};
use crate::models::user::{LoginRequest, RegisterRequest, TokenPair};
use crate::models::{NewUser, TokenKind, UserProfile};
use crate::security::{CredentialHasher, TokenCodec, TokenType};

/// Token lifetimes, loaded once from configuration.
#[derive(Debug, Clone)]
pub struct TokenPolicy {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub verification_ttl: Duration,
    pub reset_ttl: Duration,
}

impl TokenPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            access_ttl: Duration::days(config.access_token_expire_days),
            refresh_ttl: Duration::days(config.refresh_token_expire_days),
            verification_ttl: Duration::days(config.verification_token_expire_days),
            reset_ttl: Duration::hours(config.reset_token_expire_hours),
        }
    }
}

/// Orchestrates registration, authentication, verification, password reset,
/// and refresh-token rotation. All mutable state lives in the injected
/// stores; this service holds only immutable configuration.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    codec: TokenCodec,
    hasher: CredentialHasher,
    policy: TokenPolicy,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        codec: TokenCodec,
        hasher: CredentialHasher,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            users,
            tokens,
            codec,
            hasher,
            policy,
        }
    }

    /// Register a new user. Returns the safe projection and the raw
    /// verification token; delivery is the caller's job, scheduled after
    /// the response, so registration itself never waits on SMTP.
    pub async fn register(&self, request: RegisterRequest) -> Result<(UserProfile, String)> {
        request
            .validate()
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        if request.email.is_none() && request.phone_number.is_none() {
            return Err(AuthError::InvalidInput(
                "either email or phone number is required".to_string(),
            ));
        }
        if !request.accepted_terms {
            return Err(AuthError::InvalidInput(
                "terms and conditions must be accepted".to_string(),
            ));
        }

        if let Some(existing) = self
            .users
            .find_by_email_or_phone(request.email.as_deref(), request.phone_number.as_deref())
            .await?
        {
            if existing.email.is_some() && existing.email == request.email {
                return Err(AuthError::AlreadyExists("email"));
            }
            return Err(AuthError::AlreadyExists("phone number"));
        }

        let password_hash = self.hash_password(request.password.clone()).await?;
        let user = self
            .users
            .create(NewUser {
                full_name: request.full_name,
                email: request.email,
                phone_number: request.phone_number,
                password_hash,
                role: request.role,
                accepted_terms: request.accepted_terms,
                subscribe_newsletter: request.subscribe_newsletter,
            })
            .await?;

        let token = self
            .codec
            .issue(user.id, TokenType::Access, self.policy.verification_ttl)?;
        self.tokens
            .record(
                user.id,
                &token,
                TokenKind::Verification,
                Utc::now() + self.policy.verification_ttl,
            )
            .await?;

        tracing::info!(user_id = user.id, "user registered");
        Ok((UserProfile::from(&user), token))
    }

    /// Authenticate by email or phone plus password. Unknown identity and
    /// wrong password are deliberately the same error.
    pub async fn authenticate(&self, request: LoginRequest) -> Result<(UserProfile, TokenPair)> {
        request
            .validate()
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        if request.email.is_none() && request.phone_number.is_none() {
            return Err(AuthError::InvalidInput(
                "either email or phone number is required".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_email_or_phone(request.email.as_deref(), request.phone_number.as_deref())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let Some(stored_hash) = user.password_hash.clone() else {
            return Err(AuthError::InvalidCredentials);
        };
        if !self
            .verify_password(request.password.clone(), stored_hash)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        if user.is_deleted() {
            return Err(AuthError::AccountDeactivated);
        }

        self.users.touch_last_login(user.id).await?;
        let pair = self.issue_pair(user.id)?;

        tracing::info!(user_id = user.id, "user logged in");
        Ok((UserProfile::from(&user), pair))
    }

    /// Verify an email address with a single-use token. The ledger entry is
    /// consumed before the identity is mutated, so a crash in between leaves
    /// the token burned rather than replayable.
    pub async fn verify_email(&self, token: &str) -> Result<()> {
        let claims = self.codec.verify(token).ok_or(AuthError::InvalidToken)?;
        claims.subject_id().ok_or(AuthError::InvalidToken)?;

        let user_id = self
            .tokens
            .consume(token, TokenKind::Verification)
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        self.users.set_email_verified(user_id).await?;
        tracing::info!(user_id, "email verified");
        Ok(())
    }

    /// Issue a password-reset token for the given email. Returns `None` when
    /// the address is unknown, without recording anything; the route layer
    /// answers uniformly either way so the response never leaks existence.
    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<(UserProfile, String)>> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };

        let token = self
            .codec
            .issue(user.id, TokenType::Access, self.policy.reset_ttl)?;
        self.tokens
            .record(
                user.id,
                &token,
                TokenKind::PasswordReset,
                Utc::now() + self.policy.reset_ttl,
            )
            .await?;

        tracing::info!(user_id = user.id, "password reset token issued");
        Ok(Some((UserProfile::from(&user), token)))
    }

    /// Complete a password reset with a single-use token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        if new_password.len() < 6 {
            return Err(AuthError::InvalidInput(
                "password must be at least 6 characters".to_string(),
            ));
        }

        let claims = self.codec.verify(token).ok_or(AuthError::InvalidToken)?;
        claims.subject_id().ok_or(AuthError::InvalidToken)?;

        let user_id = self
            .tokens
            .consume(token, TokenKind::PasswordReset)
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        let password_hash = self.hash_password(new_password.to_string()).await?;
        self.users.set_password_hash(user_id, &password_hash).await?;

        tracing::info!(user_id, "password reset completed");
        Ok(())
    }

    /// Rotate an access+refresh pair. Refresh tokens are stateless and not
    /// single-use: any unexpired one can be replayed until it expires, and
    /// there is no revocation short of rotating the signing secret. That is
    /// a deliberate tradeoff carried over from the product's token policy.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self
            .codec
            .verify(refresh_token)
            .ok_or(AuthError::InvalidToken)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::InvalidToken);
        }
        let user_id = claims.subject_id().ok_or(AuthError::InvalidToken)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|u| !u.is_deleted())
            .ok_or(AuthError::UserNotFound)?;

        self.issue_pair(user.id)
    }

    /// Resolve the identity behind a presented access token. Backs the
    /// authenticated routes.
    pub async fn current_user(&self, access_token: &str) -> Result<UserProfile> {
        let claims = self
            .codec
            .verify(access_token)
            .ok_or(AuthError::InvalidToken)?;
        if claims.token_type != TokenType::Access {
            return Err(AuthError::InvalidToken);
        }
        let user_id = claims.subject_id().ok_or(AuthError::InvalidToken)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if user.is_deleted() {
            return Err(AuthError::AccountDeactivated);
        }
        Ok(UserProfile::from(&user))
    }

    fn issue_pair(&self, user_id: i64) -> Result<TokenPair> {
        let access_token = self
            .codec
            .issue(user_id, TokenType::Access, self.policy.access_ttl)?;
        let refresh_token = self
            .codec
            .issue(user_id, TokenType::Refresh, self.policy.refresh_ttl)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer",
            expires_in: self.policy.access_ttl.num_seconds(),
        })
    }

    // Hashing is CPU-bound; keep it off the request-serving threads.
    async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|_| AuthError::HashingUnavailable)?
    }

    async fn verify_password(&self, password: String, stored_hash: String) -> Result<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|_| AuthError::HashingUnavailable)
    }
}
