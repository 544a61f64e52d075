use super::RequestsLoggingLevel;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Port of the separate Prometheus listener.
    pub metrics_port: u16,
    /// Requests still running after this many seconds are answered with 408.
    pub request_timeout_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            request_timeout_sec: 30,
        }
    }
}
