//! mixtape-api - Playlist catalog and export service
//!
//! REST service that catalogs songs into a deduplicated relational model,
//! groups them into playlists, and exports playlists to external music
//! providers.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mixtape_api::search::SearchClient;
use mixtape_api::AppState;
use mixtape_common::config::{self, FileConfig};

/// Command-line arguments for mixtape-api
#[derive(Parser, Debug)]
#[command(name = "mixtape-api")]
#[command(about = "Playlist catalog and export service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the service database
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, default_value = "mixtape.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mixtape_api=debug,mixtape_common=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    // Resolve settings: CLI > env > config file > defaults
    let file_config = FileConfig::load(&args.config).context("load config file")?;
    let data_dir = config::resolve_data_dir(args.data_dir.as_deref(), &file_config);
    let port = config::resolve_port(args.port, &file_config);

    info!("Starting mixtape-api on port {}", port);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {}", data_dir.display());

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("create data directory {}", data_dir.display()))?;

    let db_path = config::database_path(&data_dir);
    info!("Database: {}", db_path.display());

    let db_pool = mixtape_common::db::init_database(&db_path)
        .await
        .context("initialize database")?;
    info!("Database connection established");

    let search = match (
        config::resolve_music_api_endpoint(&file_config),
        config::resolve_music_api_token(&file_config),
    ) {
        (Some(endpoint), Some(token)) => {
            info!("Music search enabled against {}", endpoint);
            Some(SearchClient::new(&endpoint, &token))
        }
        _ => {
            info!("Music search disabled (no endpoint/token configured)");
            None
        }
    };

    // Create application state and router
    let state = AppState::new(db_pool, search);
    let app = mixtape_api::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
