use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::TokenStore;
use crate::error::Result;
use crate::models::TokenKind;

#[derive(Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn record(
        &self,
        user_id: i64,
        token: &str,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (user_id, token, type, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(kind)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn consume(&self, token: &str, kind: TokenKind) -> Result<Option<i64>> {
        // Single conditional update, so concurrent consumers of the same
        // token race on the row and at most one sees it unused.
        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE auth_tokens
            SET used_at = CURRENT_TIMESTAMP
            WHERE token = $1
              AND type = $2
              AND used_at IS NULL
              AND expires_at > CURRENT_TIMESTAMP
            RETURNING user_id
            "#,
        )
        .bind(token)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id)
    }
}
