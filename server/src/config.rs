//! Server configuration.

use std::str::FromStr;
use std::time::Duration;

use currex_common::CurrencyCode;
use currex_fx::FxEngineConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "pretty" => Ok(LogFormat::Text),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. `None` selects the in-memory store.
    pub url: Option<String>,
    /// Pool size.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Currency used to compose rates for unquoted pairs.
    pub pivot_currency: String,
    /// Allowed CORS origins; `*` allows any.
    pub cors_allow_origins: Vec<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            database: DatabaseConfig::default(),
            pivot_currency: "USD".to_string(),
            cors_allow_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            log_format: LogFormat::Json,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Unparseable numeric
    /// values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("SERVER_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("SERVER_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Some(url) = lookup("DATABASE_URL") {
            if !url.trim().is_empty() {
                config.database.url = Some(url);
            }
        }

        if let Some(max) = lookup("DATABASE_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse() {
                config.database.max_connections = max;
            }
        }

        if let Some(pivot) = lookup("PIVOT_CURRENCY") {
            config.pivot_currency = pivot;
        }

        if let Some(origins) = lookup("CORS_ALLOW_ORIGINS") {
            config.cors_allow_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            if let Ok(format) = format.parse() {
                config.log_format = format;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.database.max_connections == 0 {
            return Err("Database pool needs at least one connection".to_string());
        }

        if let Err(e) = CurrencyCode::parse(&self.pivot_currency) {
            return Err(format!("Invalid pivot currency '{}': {}", self.pivot_currency, e));
        }

        if self.cors_allow_origins.is_empty() {
            return Err("At least one CORS origin is required".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be 0".to_string());
        }

        Ok(())
    }

    /// `host:port` to bind.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }

    /// Engine configuration derived from these settings.
    pub fn fx_config(&self) -> Result<FxEngineConfig, String> {
        let pivot_currency = CurrencyCode::parse(&self.pivot_currency)
            .map_err(|e| format!("Invalid pivot currency '{}': {}", self.pivot_currency, e))?;

        Ok(FxEngineConfig {
            pivot_currency,
            ..FxEngineConfig::default()
        })
    }

    /// Whether any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_allow_origins.iter().any(|o| o == "*")
    }
}
