use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::complaints::DEFAULT_INVOICE_PREFIX;

const MAX_INVOICE_PREFIX_LEN: usize = 8;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the complaint desk.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub desk: DeskConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let invoice_prefix = env::var("COMPLAINT_INVOICE_PREFIX")
            .unwrap_or_else(|_| DEFAULT_INVOICE_PREFIX.to_string());
        let invoice_prefix = validate_invoice_prefix(invoice_prefix)?;
        let agent_roster = env::var("COMPLAINT_AGENT_ROSTER")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            desk: DeskConfig {
                invoice_prefix,
                agent_roster,
            },
        })
    }
}

fn validate_invoice_prefix(raw: String) -> Result<String, ConfigError> {
    let prefix = raw.trim();
    let valid = !prefix.is_empty()
        && prefix.len() <= MAX_INVOICE_PREFIX_LEN
        && prefix.bytes().all(|byte| byte.is_ascii_uppercase());
    if valid {
        Ok(prefix.to_string())
    } else {
        Err(ConfigError::InvalidInvoicePrefix { value: raw })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Complaint workflow settings.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub invoice_prefix: String,
    /// Optional `id,name,phone,role` CSV used to seed the agent directory.
    pub agent_roster: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidInvoicePrefix { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidInvoicePrefix { value } => write!(
                f,
                "COMPLAINT_INVOICE_PREFIX must be 1-{} uppercase ASCII letters, got '{}'",
                MAX_INVOICE_PREFIX_LEN, value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidInvoicePrefix { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
