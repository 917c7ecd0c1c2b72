/// Security module for authentication
/// Provides password hashing and signed bearer-token management
pub mod jwt;
pub mod password;

pub use jwt::{Claims, TokenCodec, TokenType};
pub use password::CredentialHasher;
