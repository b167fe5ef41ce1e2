//! Discord linked-roles HTTP server.

use linked_roles_discord::stores::{PostgresMetadataSource, RedisTokenStore};
use linked_roles_discord::{LinkedRoles, OAuthClient};
use linked_roles_server::config::Config;
use linked_roles_server::telemetry::{init_tracing, install_metrics, shutdown_signal};
use linked_roles_web::{router, AppState};
use sqlx::postgres::PgPoolOptions;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting linked-roles server");

    let config = Config::from_env()?;
    info!(
        application_id = %config.discord.client_id,
        redirect_uri = %config.discord.redirect_uri,
        redis_url = %config.redis.url,
        "Configuration loaded"
    );

    if let Some(addr) = config.server.metrics_addr()? {
        install_metrics(addr)?;
    }

    info!("Connecting to Redis token store...");
    let tokens = RedisTokenStore::with_cipher(&config.redis.url, config.redis.cipher.clone()).await?;

    info!("Connecting to profile database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .connect(&config.postgres.url)
        .await?;
    let profiles = PostgresMetadataSource::new(pool);
    profiles.migrate().await?;
    info!("Profile database ready");

    let redirect_uri = config.discord.redirect_uri.clone();
    let oauth = Arc::new(OAuthClient::new(config.discord)?);
    let linked_roles = Arc::new(LinkedRoles::new(oauth, tokens, profiles));
    let state = AppState::new(linked_roles, config.cookie_secret.as_bytes(), &redirect_uri)?;

    let addr = config.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_tx.send_replace(true);
    });

    let server = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_requested(shutdown_rx.clone()))
        .into_future();

    let shutdown_timeout = config.server.shutdown_timeout;
    tokio::select! {
        result = server => result?,
        () = async {
            shutdown_requested(shutdown_rx).await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!(
                timeout_secs = shutdown_timeout.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            );
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_requested(mut rx: watch::Receiver<bool>) {
    // A closed channel also means shutdown.
    let _ = rx.wait_for(|requested| *requested).await;
}
