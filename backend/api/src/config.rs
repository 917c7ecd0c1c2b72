/// Configuration management
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_host")]
    pub server_host: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    pub database_url: String,

    pub jwt_secret_key: String,
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,
    #[serde(default = "default_access_token_expire_days")]
    pub access_token_expire_days: i64,
    #[serde(default = "default_refresh_token_expire_days")]
    pub refresh_token_expire_days: i64,
    #[serde(default = "default_verification_token_expire_days")]
    pub verification_token_expire_days: i64,
    #[serde(default = "default_reset_token_expire_hours")]
    pub reset_token_expire_hours: i64,

    // Argon2 cost parameters. Defaults are tuned low for development;
    // raise them in production.
    #[serde(default = "default_argon2_time_cost")]
    pub argon2_time_cost: u32,
    #[serde(default = "default_argon2_memory_cost")]
    pub argon2_memory_cost: u32,
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
    #[serde(default = "default_argon2_hash_len")]
    pub argon2_hash_len: usize,

    // SMTP is optional; when unset, outbound mail is logged and skipped.
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_use_ssl: bool,

    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    #[serde(default = "default_email_from_name")]
    pub email_from_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_token_expire_days() -> i64 {
    30
}

fn default_refresh_token_expire_days() -> i64 {
    365
}

fn default_verification_token_expire_days() -> i64 {
    7
}

fn default_reset_token_expire_hours() -> i64 {
    24
}

fn default_argon2_time_cost() -> u32 {
    2
}

fn default_argon2_memory_cost() -> u32 {
    1024
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_argon2_hash_len() -> usize {
    16
}

fn default_smtp_port() -> u16 {
    587
}

fn default_frontend_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_email_from_name() -> String {
    "Skillforge".to_string()
}
