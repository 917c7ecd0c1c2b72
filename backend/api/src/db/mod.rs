/// Persistence boundary: store traits plus their Postgres implementations.
/// The auth service only ever sees the traits, so tests can substitute
/// in-memory fakes.
pub mod token_repo;
pub mod user_repo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{NewUser, TokenKind, User};

pub use token_repo::PgTokenStore;
pub use user_repo::PgUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// OR-of-predicates lookup used by registration conflict checks and login.
    async fn find_by_email_or_phone(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<Option<User>>;
    async fn set_email_verified(&self, id: i64) -> Result<()>;
    async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<()>;
    async fn touch_last_login(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Record an issued verification or reset token in the ledger.
    async fn record(
        &self,
        user_id: i64,
        token: &str,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Atomically consume a ledger entry: the matching row must be unused
    /// and unexpired, and at most one concurrent caller may win. Returns the
    /// owning user id on success, `None` on any miss.
    async fn consume(&self, token: &str, kind: TokenKind) -> Result<Option<i64>>;
}
