use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use speakbook_core::Database;
use speakbook_server::{
    infra::{app_state::AppState, config::Config},
    routes::create_router,
    upload::UploadClient,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "speakbook-server")]
#[command(about = "REST backend for the SpeakBook interactive speaking-book app")]
struct Cli {
    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// PostgreSQL connection string; omit to run on the in-memory backend
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// External file-hosting endpoint the upload proxy forwards to
    #[arg(long, env = "UPLOAD_ENDPOINT")]
    upload_endpoint: Option<String>,

    /// Directory holding the frontend build to serve as a fallback
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server_host = host;
    }
    if let Some(port) = cli.port {
        config.server_port = port;
    }
    if cli.database_url.is_some() {
        config.database_url = cli.database_url;
    }
    if let Some(endpoint) = cli.upload_endpoint {
        config.upload_endpoint = endpoint;
    }
    if cli.static_dir.is_some() {
        config.static_dir = cli.static_dir;
    }

    let db = match config.database_url.as_deref() {
        Some(url) => {
            let db = Database::new_postgres(url).await?;
            info!("connected to PostgreSQL");
            db
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory backend; data will not survive a restart");
            Database::new_memory()
        }
    };

    let uploader = UploadClient::new(config.upload_endpoint.clone());
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    let app = create_router(AppState::new(db, uploader, config));

    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
