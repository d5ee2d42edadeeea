/// Конфигурация сервиса из переменных окружения

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TRAINING_DATA: &str = "data/data.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid number, got '{0}'")]
    InvalidPort(String),

    #[error("Invalid HOST:PORT configuration: {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub addr: SocketAddr,
    pub training_data: PathBuf,
}

impl ServiceConfig {
    /// HOST, PORT, DELAY_TRAINING_DATA
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let addr_str = format!("{}:{}", host, port);
        let addr = addr_str
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddress(addr_str))?;

        let training_data = lookup("DELAY_TRAINING_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRAINING_DATA));

        Ok(Self {
            addr,
            training_data,
        })
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            training_data: PathBuf::from(DEFAULT_TRAINING_DATA),
        }
    }
}
