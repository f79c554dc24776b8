use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use medicare::{api, config, db, notify, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let db_path = config::database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Open once at startup so migrations run before we accept traffic.
    db::open_database(&db_path)?;
    tracing::info!(path = %db_path.display(), "database ready");

    let app_state = Arc::new(AppState::new(db_path, Arc::new(notify::TracingNotifier)));
    let router = api::api_router(app_state);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
