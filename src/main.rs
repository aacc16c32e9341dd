use anyhow::{Context, Result};
use blog_store::{
    AppState,
    config::AppConfig,
    services::{
        blog_service::BlogService, disk_store::DiskObjectStore, keyspace::Keyspace,
        memory_store::MemoryObjectStore, object_store::ObjectStore,
    },
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{fs, io::ErrorKind, path::Path, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting blog-store with config: {:?}", cfg);

    // --- Select the object store backend ---
    let store: Arc<dyn ObjectStore> = if cfg.ephemeral {
        if migrate {
            tracing::info!("Nothing to migrate for the in-memory store.");
            return Ok(());
        }
        tracing::warn!("Running with the in-memory store; nothing survives a restart");
        Arc::new(MemoryObjectStore::new())
    } else {
        let disk = open_disk_store(&cfg).await?;
        disk.migrate().await.context("creating catalog schema")?;
        if migrate {
            tracing::info!("Database migration complete.");
            return Ok(()); // exit after migration
        }
        Arc::new(disk)
    };

    // --- Initialize core service ---
    let blog = BlogService::new(store, Keyspace::new(cfg.base_dir.clone()));
    let state = AppState::new(blog, cfg.auth.clone()).with_max_upload_bytes(cfg.max_upload_bytes);
    let app = blog_store::app(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the payload directory and the catalog database (with its parent
/// directory) if they do not exist yet, then connect.
async fn open_disk_store(cfg: &AppConfig) -> Result<DiskObjectStore> {
    if !Path::new(&cfg.storage_dir).exists() {
        fs::create_dir_all(&cfg.storage_dir)?;
        tracing::info!("Created storage directory at {}", cfg.storage_dir);
    }

    let db_url = &cfg.database_url;
    let db_path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }
    tracing::debug!("Connecting to catalog at {}", db_url);

    let options = SqliteConnectOptions::from_str(db_url)
        .with_context(|| format!("parsing database url `{}`", db_url))?
        .create_if_missing(true);
    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("connecting to {}", db_url))?;

    Ok(DiskObjectStore::new(Arc::new(db), cfg.storage_dir.clone()))
}
