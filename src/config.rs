use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt};

use crate::auth::AuthConfig;

/// 64 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    /// Prefix for every object key of this deployment.
    pub base_dir: String,
    pub auth: AuthConfig,
    /// Largest request body accepted on admin routes (attachments, avatar).
    pub max_upload_bytes: usize,
    /// Keep objects in memory instead of on disk.
    pub ephemeral: bool,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("storage_dir", &self.storage_dir)
            .field("database_url", &self.database_url)
            .field("base_dir", &self.base_dir)
            .field("auth", &self.auth)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Blog content store API")]
pub struct Args {
    /// Host to bind to (overrides BLOG_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BLOG_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where objects are stored (overrides BLOG_STORE_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Catalog database URL (overrides BLOG_STORE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Key prefix for this deployment (overrides BLOG_STORE_BASE_DIR)
    #[arg(long)]
    pub base_dir: Option<String>,

    /// Admin username (overrides BLOG_STORE_USERNAME)
    #[arg(long)]
    pub username: Option<String>,

    /// Admin request body limit in bytes (overrides BLOG_STORE_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Keep all objects in memory; nothing survives a restart
    #[arg(long)]
    pub ephemeral: bool,

    /// Create the catalog schema and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    ///
    /// The password and signing secret are read from the environment only
    /// (`BLOG_STORE_PASSWORD`, `BLOG_STORE_JWT_SECRET`) so they never show up
    /// in process listings.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let cfg = Self::from_parts(&args, |name| env::var(name))?;
        Ok((cfg, args.migrate))
    }

    fn from_parts<F>(args: &Args, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = var("BLOG_STORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match var("BLOG_STORE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BLOG_STORE_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading BLOG_STORE_PORT"),
        };
        let env_storage =
            var("BLOG_STORE_STORAGE_DIR").unwrap_or_else(|_| "./data/objects".into());
        let env_db = var("BLOG_STORE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/blog_store.db".into());
        let env_base_dir = var("BLOG_STORE_BASE_DIR").unwrap_or_else(|_| "blog".into());
        let env_max_upload = match var("BLOG_STORE_MAX_UPLOAD_BYTES") {
            Ok(value) => value.parse::<usize>().with_context(|| {
                format!("parsing BLOG_STORE_MAX_UPLOAD_BYTES value `{}`", value)
            })?,
            Err(env::VarError::NotPresent) => DEFAULT_MAX_UPLOAD_BYTES,
            Err(err) => return Err(err).context("reading BLOG_STORE_MAX_UPLOAD_BYTES"),
        };
        let env_username = var("BLOG_STORE_USERNAME").unwrap_or_else(|_| "admin".into());
        let password = var("BLOG_STORE_PASSWORD").context("BLOG_STORE_PASSWORD must be set")?;
        let jwt_secret =
            var("BLOG_STORE_JWT_SECRET").context("BLOG_STORE_JWT_SECRET must be set")?;
        if password.is_empty() || jwt_secret.is_empty() {
            bail!("BLOG_STORE_PASSWORD and BLOG_STORE_JWT_SECRET must not be empty");
        }

        // --- Merge ---
        Ok(Self {
            host: args.host.clone().unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.clone().unwrap_or(env_storage),
            database_url: args.database_url.clone().unwrap_or(env_db),
            base_dir: args.base_dir.clone().unwrap_or(env_base_dir),
            auth: AuthConfig {
                username: args.username.clone().unwrap_or(env_username),
                password,
                jwt_secret,
            },
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
            ephemeral: args.ephemeral,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
