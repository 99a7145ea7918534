//! config/whatsapp_config.rs
//! Configuración explícita del dispatcher (token, endpoints, límites).

use std::{env, path::PathBuf, time::Duration};

use crate::errors::{BulkResult, DispatchError};

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v17.0";
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LOG_DIR: &str = "./files/logs";

/// Política de reintentos: `retries` es el total de intentos por mensaje.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Espera antes del intento `attempt + 1` (attempt empieza en 1).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1u32 << exp)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retries: DEFAULT_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub token: String,
    pub phone_number_id: String,
    pub api_version: String,
    pub api_base: String,
    pub concurrency_limit: usize,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub log_dir: PathBuf,
}

impl WhatsAppConfig {
    /// Construye y valida. Falla si falta token o phone_number_id.
    pub fn new(
        token: impl Into<String>,
        phone_number_id: impl Into<String>,
        api_version: impl Into<String>,
    ) -> BulkResult<Self> {
        let cfg = WhatsAppConfig {
            token: token.into(),
            phone_number_id: phone_number_id.into(),
            api_version: api_version.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            concurrency_limit: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Lee las variables de entorno (ya cargadas con dotenv en main).
    pub fn from_env() -> BulkResult<Self> {
        let token = env::var("WHATSAPP_TOKEN")
            .map_err(|_| DispatchError::Config("No se definió WHATSAPP_TOKEN".to_string()))?;
        let phone_number_id = env::var("PHONE_NUMBER_ID")
            .map_err(|_| DispatchError::Config("No se definió PHONE_NUMBER_ID".to_string()))?;
        let api_version =
            env::var("API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        let mut cfg = WhatsAppConfig::new(token, phone_number_id, api_version)?;

        if let Ok(base) = env::var("WHATSAPP_API_BASE") {
            cfg = cfg.with_api_base(base);
        }
        if let Some(n) = parse_env::<usize>("BULK_CONCURRENCY")? {
            cfg = cfg.with_concurrency(n);
        }

        let mut retry = cfg.retry;
        if let Some(n) = parse_env::<u32>("BULK_RETRIES")? {
            retry.retries = n;
        }
        if let Some(ms) = parse_env::<u64>("BULK_INITIAL_BACKOFF_MS")? {
            retry.initial_backoff = Duration::from_millis(ms);
        }
        cfg = cfg.with_retry(retry);
        if let Some(secs) = parse_env::<u64>("BULK_REQUEST_TIMEOUT_SECS")? {
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(dir) = env::var("BULK_LOG_DIR") {
            cfg.log_dir = PathBuf::from(dir);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn validate(&self) -> BulkResult<()> {
        if self.token.trim().is_empty() {
            return Err(DispatchError::Config("WHATSAPP_TOKEN está vacío".to_string()));
        }
        if self.phone_number_id.trim().is_empty() {
            return Err(DispatchError::Config("PHONE_NUMBER_ID está vacío".to_string()));
        }
        if self.api_version.trim().is_empty() {
            return Err(DispatchError::Config("API_VERSION está vacío".to_string()));
        }
        if self.concurrency_limit == 0 {
            return Err(DispatchError::Config(
                "el límite de concurrencia debe ser mayor a 0".to_string(),
            ));
        }
        if self.retry.retries == 0 {
            return Err(DispatchError::Config(
                "la cantidad de intentos debe ser mayor a 0".to_string(),
            ));
        }
        Ok(())
    }

    /// `{base}/{version}/{phone_number_id}/messages`
    pub fn messages_url(&self) -> String {
        self.phone_url("messages")
    }

    /// `{base}/{version}/{phone_number_id}/media`
    pub fn media_url(&self) -> String {
        self.phone_url("media")
    }

    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn phone_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.api_base.trim_end_matches('/'),
            self.api_version,
            self.phone_number_id,
            endpoint
        )
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> BulkResult<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DispatchError::Config(format!("{} no es un número válido: '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}
