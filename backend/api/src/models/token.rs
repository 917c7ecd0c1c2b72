use serde::{Deserialize, Serialize};

/// Semantic kind of a ledger-tracked token. Access and refresh tokens are
/// stateless bearer credentials and never appear in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Verification,
    PasswordReset,
}
