pub mod auth_service;
pub mod email_service;

pub use auth_service::{AuthService, TokenPolicy};
pub use email_service::{EmailConfig, EmailService};
