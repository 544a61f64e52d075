use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use song_library::config::{AppConfig, CliConfig, Env, FileConfig};
use song_library::server::{self, run_server, RequestsLoggingLevel};
use song_library::song_store::{SongStore, SqliteSongStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(version, about = "HTTP service for a library of songs and their lyrics")]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override the flags.
    #[clap(long, env = "CONFIG_PATH", value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the songs.db SQLite database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Deployment environment: local logs are human-readable, dev and prod log JSON.
    #[clap(long, value_enum, default_value = "local")]
    pub env: Env,

    /// Number of read-only database connections.
    #[clap(long, default_value_t = 4)]
    pub read_pool_size: usize,

    /// Seconds before an in-flight request is answered with 408.
    #[clap(long, default_value_t = 30)]
    pub request_timeout_sec: u64,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            env: args.env,
            read_pool_size: args.read_pool_size,
            request_timeout_sec: args.request_timeout_sec,
        }
    }
}

fn init_tracing(env: Env) -> Result<()> {
    let default_level = match env {
        Env::Prod => LevelFilter::INFO,
        Env::Local | Env::Dev => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("LOG_LEVEL")
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    match env {
        Env::Local => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        Env::Dev | Env::Prod => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
    .context("Failed to initialize logging")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        return;
    }
    info!("Ctrl-C received, shutting down...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let app_config = AppConfig::resolve(&CliConfig::from(&cli_args), file_config)?;

    init_tracing(app_config.env)?;
    info!("Starting song library ({:?} environment)", app_config.env);
    if let Some(config_path) = &cli_args.config {
        info!("Loaded config file {:?}", config_path);
    }

    let db_path = app_config.song_db_path();
    info!("Opening SQLite song database at {:?}...", db_path);
    let song_store = Arc::new(SqliteSongStore::new(&db_path, app_config.read_pool_size)?);

    info!("Initializing metrics...");
    server::metrics::init_metrics();
    server::metrics::set_song_count(song_store.count()?);

    run_server(app_config.server_config(), song_store, shutdown_signal()).await
}
