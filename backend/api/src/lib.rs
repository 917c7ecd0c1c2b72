// Skillforge API library

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;

#[cfg(test)]
mod tests;

pub use error::{AuthError, Result};

use services::{AuthService, EmailService};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub mailer: EmailService,
}
