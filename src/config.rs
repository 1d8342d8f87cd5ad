use log::info;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    pub database_url: String,
    pub data_dir: String,
    pub aggregate_refresh_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
            database_url: "./data/modvault.db".to_string(),
            data_dir: "./data".to_string(),
            aggregate_refresh_enabled: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("MODVAULT_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .unwrap_or(8000);

        let host = env::var("MODVAULT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let data_dir = env::var("MODVAULT_DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let database_url = env::var("MODVAULT_DATABASE_URL")
            .unwrap_or_else(|_| format!("{data_dir}/modvault.db"));

        let aggregate_refresh_enabled = env::var("MODVAULT_AGGREGATE_REFRESH")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        info!("Configuration loaded:");
        info!("  Host: {host}");
        info!("  Port: {port}");
        info!("  Data Directory: {data_dir}");
        info!("  Database URL: {database_url}");
        info!("  Aggregate Refresh: {aggregate_refresh_enabled}");

        Self {
            port,
            host,
            database_url,
            data_dir,
            aggregate_refresh_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.data_dir, "./data");
        assert!(config.aggregate_refresh_enabled);
    }

    #[test]
    fn test_config_parsing() {
        assert_eq!("8080".parse::<u16>().unwrap_or(8000), 8080);
        assert_eq!("invalid".parse::<u16>().unwrap_or(8000), 8000);
    }
}
