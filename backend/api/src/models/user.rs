use chrono::{DateTime, Utc};
/// User model and auth request/response payloads
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

static PHONE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("phone number regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Student,
    Business,
    Freelancer,
    Admin,
    Instructor,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Student
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
    pub accepted_terms: bool,
    pub subscribe_newsletter: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if user is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Fields required to insert a new user record.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    pub accepted_terms: bool,
    pub subscribe_newsletter: bool,
}

/// Safe projection of a user record. Never carries the credential hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(regex(path = *PHONE_NUMBER_RE))]
    pub phone_number: Option<String>,
    #[validate(length(min = 6))]
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub accepted_terms: bool,
    #[serde(default)]
    pub subscribe_newsletter: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailVerificationRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordReset {
    pub token: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Access + refresh pair returned by login, registration, and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_number_pattern_accepts_e164() {
        assert!(PHONE_NUMBER_RE.is_match("+14155550123"));
        assert!(PHONE_NUMBER_RE.is_match("4915112345678"));
        assert!(!PHONE_NUMBER_RE.is_match("0123"));
        assert!(!PHONE_NUMBER_RE.is_match("not-a-number"));
    }

    #[test]
    fn register_request_rejects_short_password() {
        let request = RegisterRequest {
            full_name: "Ada".to_string(),
            email: Some("ada@example.com".to_string()),
            phone_number: None,
            password: "short".to_string(),
            role: UserRole::Student,
            accepted_terms: true,
            subscribe_newsletter: false,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn register_request_rejects_bad_email() {
        let request = RegisterRequest {
            full_name: "Ada".to_string(),
            email: Some("not-an-email".to_string()),
            phone_number: None,
            password: "secret123".to_string(),
            role: UserRole::Student,
            accepted_terms: true,
            subscribe_newsletter: false,
        };
        assert!(request.validate().is_err());
    }
}
