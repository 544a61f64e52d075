mod file_config;

pub use file_config::FileConfig;

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const SONG_DB_FILE_NAME: &str = "songs.db";

/// Deployment environment, selects the log format and default verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Env {
    /// Human-readable logs at debug level.
    #[default]
    Local,
    /// JSON logs at debug level.
    Dev,
    /// JSON logs at info level.
    Prod,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub env: Env,
    pub read_pool_size: usize,
    pub request_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        let server = ServerConfig::default();
        CliConfig {
            db_dir: None,
            port: server.port,
            metrics_port: server.metrics_port,
            logging_level: server.requests_logging_level,
            env: Env::default(),
            read_pool_size: 4,
            request_timeout_sec: server.request_timeout_sec,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub env: Env,
    pub read_pool_size: usize,
    pub request_timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let logging_level = match file.logging_level {
            Some(s) => parse_enum::<RequestsLoggingLevel>("logging_level", &s)?,
            None => cli.logging_level.clone(),
        };
        let env = match file.env {
            Some(s) => parse_enum::<Env>("env", &s)?,
            None => cli.env,
        };

        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size);
        if read_pool_size == 0 {
            bail!("read_pool_size must be at least 1");
        }

        Ok(Self {
            db_dir,
            port: file.port.unwrap_or(cli.port),
            metrics_port: file.metrics_port.unwrap_or(cli.metrics_port),
            logging_level,
            env,
            read_pool_size,
            request_timeout_sec: file.request_timeout_sec.unwrap_or(cli.request_timeout_sec),
        })
    }

    pub fn song_db_path(&self) -> PathBuf {
        self.db_dir.join(SONG_DB_FILE_NAME)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            request_timeout_sec: self.request_timeout_sec,
        }
    }
}

/// Parses a TOML string value with clap's `ValueEnum` names, case-insensitively.
fn parse_enum<T: ValueEnum>(field: &str, value: &str) -> Result<T> {
    match T::from_str(value, true) {
        Ok(parsed) => Ok(parsed),
        Err(_) => bail!("Invalid {} in config file: {:?}", field, value),
    }
}
