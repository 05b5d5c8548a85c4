//! City Route Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cityroute_engine::api;
use cityroute_engine::infrastructure::{
    clock::SystemClock,
    config::AppConfig,
    ports::{BoardCrudRepo, ClockPort},
    sqlite::{self, SqliteBoardCrudRepo},
};
use cityroute_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary is usually run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cityroute_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting City Route Engine");

    let config = AppConfig::from_env()?;

    // Create clock for repositories
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    tracing::info!(database_url = %config.database_url, "Connecting to SQLite");
    let pool = sqlite::connect(&config.database_url).await?;
    sqlite::ensure_schema(&pool).await?;

    let board_repo: Arc<dyn BoardCrudRepo> = Arc::new(SqliteBoardCrudRepo::new(pool, clock));
    let app = Arc::new(App::new(board_repo));

    let router = api::router(app, &config);

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
