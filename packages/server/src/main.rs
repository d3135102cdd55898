use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::embed::EmbedValidator;
use common::storage::filesystem::FilesystemMediaStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::state::AppState;
use server::utils::rate_limit::IpRateLimiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    server::seed::seed_role_permissions(&db)
        .await
        .context("Failed to seed roles")?;
    server::seed::ensure_indexes(&db).await?;

    let media = FilesystemMediaStore::new(config.upload.dir.clone(), config.upload.max_size)
        .await
        .with_context(|| format!("Failed to prepare upload dir {}", config.upload.dir.display()))?;
    info!(dir = %config.upload.dir.display(), "Media store ready");

    let limiter = Arc::new(IpRateLimiter::new(
        config.contact.ip_limit,
        Duration::from_secs(u64::from(config.contact.ip_window_minutes) * 60),
    ));

    // Drop expired limiter entries so idle addresses do not accumulate.
    let pruner = limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            pruner.prune();
        }
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server host/port")?;

    let state = AppState {
        db,
        config: Arc::new(config),
        media: Arc::new(media),
        embeds: Arc::new(EmbedValidator::default()),
        contact_limiter: limiter,
    };

    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    info!("Swagger UI at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
