pub mod config;
pub mod error;
mod http_layers;
pub mod metrics;
pub mod server;
mod songs;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResponse};
pub use http_layers::*;
pub use server::{make_app, run_server};
