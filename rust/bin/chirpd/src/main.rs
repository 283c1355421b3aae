//! `chirpd`: the Chirp server binary.
//!
//! Usage:
//!   chirpd [-c <config.toml>] [--listen <addr>] [--data-dir <dir>]
//!
//! Without a config file every setting takes its default; the database
//! and media files then live under `db/`.

mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use chirp_core::{ApiKeyHeader, Authenticator, Module, ServiceConfig};
use social::SocialModule;
use social::service::SocialConfig;

/// Chirp social feed server.
#[derive(Parser, Debug)]
#[command(name = "chirpd", about = "Chirp social feed server")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file).
    #[arg(long = "listen")]
    listen: Option<String>,

    /// Data directory (overrides the config file).
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,
}

impl Cli {
    /// Load the config file if one was given, then apply CLI overrides.
    fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                ServiceConfig::load(path)?
            }
            None => ServiceConfig::default(),
        };
        if let Some(listen) = &self.listen {
            config.listen = listen.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.service_config()?;

    // Initialize storage.
    let sqlite_path = config.resolve_sqlite_path();
    if let Some(parent) = sqlite_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let sql: Arc<dyn chirp_sql::SQLStore> = Arc::new(
        chirp_sql::SqliteStore::open(&sqlite_path)
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    let media_dir = config.resolve_media_dir();
    let blob: Arc<dyn chirp_blob::BlobStore> = Arc::new(
        chirp_blob::FileStore::open(&media_dir)
            .map_err(|e| anyhow::anyhow!("failed to open media store: {}", e))?,
    );
    info!(
        "Storage ready: database {}, media {}",
        sqlite_path.display(),
        media_dir.display()
    );

    let authenticator: Arc<dyn Authenticator> =
        Arc::new(ApiKeyHeader::new(&config.identity_header));

    let social_module = SocialModule::new(sql, blob, authenticator, SocialConfig::default())?;
    info!("Social module initialized");

    let module_routes = vec![(social_module.name(), social_module.routes())];
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("Chirp server listening on {}", config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
