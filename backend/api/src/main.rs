/// Skillforge API - main entry point
use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use skillforge_api::config::Config;
use skillforge_api::db::{PgTokenStore, PgUserStore};
use skillforge_api::routes;
use skillforge_api::security::{CredentialHasher, TokenCodec};
use skillforge_api::services::{AuthService, EmailConfig, EmailService, TokenPolicy};
use skillforge_api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        "Starting Skillforge API on {}:{}",
        config.server_host,
        config.server_port
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database connection pool initialized");

    let codec = TokenCodec::new(&config.jwt_secret_key, &config.jwt_algorithm)?;
    let hasher = CredentialHasher::from_config(&config)?;
    let policy = TokenPolicy::from_config(&config);

    let users = Arc::new(PgUserStore::new(pool.clone()));
    let tokens = Arc::new(PgTokenStore::new(pool));
    let auth = AuthService::new(users, tokens, codec, hasher, policy);

    let mailer = EmailService::new(EmailConfig::from(&config))?;
    if mailer.is_configured() {
        if mailer.test_connection().await {
            tracing::info!("SMTP connection verified");
        } else {
            tracing::warn!("SMTP configured but connection test failed");
        }
    } else {
        tracing::warn!("SMTP not configured, transactional email disabled");
    }

    let app = routes::router(AppState { auth, mailer });

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
