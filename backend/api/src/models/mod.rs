/// Data models for the identity subsystem
pub mod token;
pub mod user;

pub use token::TokenKind;
pub use user::{NewUser, User, UserProfile, UserRole};
