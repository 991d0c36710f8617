use std::sync::Arc;

use auth::create_hasher;
use auth::TokenIssuer;
use chrono::Duration;
use credential_service::config::Config;
use credential_service::domain::credential::service::CredentialService;
use credential_service::domain::credential::service::PasswordPolicy;
use credential_service::domain::deadline::Deadline;
use credential_service::domain::migration::runner::Migrator;
use credential_service::inbound::http::router::create_router;
use credential_service::outbound::clock::SystemClock;
use credential_service::outbound::database;
use credential_service::outbound::repositories::SqliteAccountRepository;
use credential_service::outbound::repositories::SqliteRefreshTokenRepository;
use credential_service::outbound::schema::SqliteSchemaStore;
use credential_service::outbound::schema::MIGRATIONS;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credential_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "credential-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        database_url = %config.database.url,
        http_port = config.server.http_port,
        hash_algorithm = %config.password.algorithm,
        access_ttl_minutes = config.token.access_ttl_minutes,
        refresh_ttl_minutes = config.token.refresh_ttl_minutes,
        "Configuration loaded"
    );

    // Fails fast on an unknown algorithm tag or rejected cost parameters.
    let hasher = create_hasher(&config.password.algorithm, &config.password.hash_params())?;

    let pool = database::connect(&config.database).await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "sqlite",
        "Database connection pool created"
    );

    let migrator = Migrator::new(Arc::new(SqliteSchemaStore::new(pool.clone())), MIGRATIONS)?;
    let report = migrator.run(Deadline::none()).await.map_err(|e| {
        tracing::error!(error = %e, "Database migrations failed, refusing to start");
        e
    })?;
    tracing::info!(
        from = report.from,
        to = report.to,
        applied = report.applied.len(),
        "Database migrations completed"
    );

    let issuer = Arc::new(TokenIssuer::new(
        config.token.secret.as_bytes(),
        config.token.issuer.clone(),
        Duration::minutes(config.token.access_ttl_minutes),
        Duration::minutes(config.token.refresh_ttl_minutes),
    ));

    let credential_service = Arc::new(CredentialService::new(
        Arc::new(SqliteAccountRepository::new(pool.clone())),
        Arc::new(SqliteRefreshTokenRepository::new(pool.clone())),
        hasher,
        issuer,
        PasswordPolicy {
            min_length: config.password.min_length,
            max_length: config.password.max_length,
        },
        Arc::new(SystemClock),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(credential_service, config.server.request_timeout());

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server exited successfully");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
