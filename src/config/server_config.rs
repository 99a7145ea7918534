//! config/server_config.rs
//! Dirección donde escucha el servidor HTTP (podría venir de .env).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String, // "0.0.0.0" por defecto
    pub port: u16,
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5022,
            workers: 1,
        }
    }
}

impl ServerConfig {
    /// Toma SERVER_HOST / SERVER_PORT / SERVER_WORKERS si existen.
    pub fn from_env() -> Self {
        let mut cfg = ServerConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            cfg.port = port;
        }
        if let Some(workers) = std::env::var("SERVER_WORKERS")
            .ok()
            .and_then(|w| w.parse::<usize>().ok())
            .filter(|w| *w > 0)
        {
            cfg.workers = workers;
        }
        cfg
    }
}
