// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, StoreConfig};

impl Config {
    /// Load configuration from "config.toml" plus environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("PERSON"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8001)?
            .set_default("store.data_file", "people.json")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.max_body_size", 65_536)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let config = Config::load_from("does-not-exist").expect("defaults should apply");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8001);
        assert_eq!(config.store.data_file.as_deref(), Some("people.json"));
        assert_eq!(config.logging.access_log_format, "combined");
        assert_eq!(config.http.max_body_size, 65_536);
        assert!(config.performance.max_connections.is_none());
    }

    #[test]
    fn test_socket_addr_from_defaults() {
        let config = Config::load_from("does-not-exist").unwrap();
        let addr = config.get_socket_addr().unwrap();
        assert_eq!(addr.port(), 8001);
    }
}
