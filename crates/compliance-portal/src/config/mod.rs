use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::checks::Actor;

const DEFAULT_ACTOR: &str = "manual.operator@positivo.com.br";
const DEFAULT_AUDIT_LOG: &str = "audit-log.jsonl";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration for the portal.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeConfig,
    pub provider: ProviderConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let intake = IntakeConfig {
            actor: Actor(env::var("COMPLIANCE_ACTOR").unwrap_or_else(|_| DEFAULT_ACTOR.to_string())),
            audit_log_path: env::var("COMPLIANCE_AUDIT_LOG")
                .unwrap_or_else(|_| DEFAULT_AUDIT_LOG.to_string())
                .into(),
            upload_dir: env::var("COMPLIANCE_UPLOAD_DIR")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string())
                .into(),
            upload_limit_bytes: parse_number(
                "COMPLIANCE_UPLOAD_LIMIT_BYTES",
                DEFAULT_UPLOAD_LIMIT_BYTES,
            )?,
        };

        let provider = ProviderConfig::from_env()?;

        Ok(Self {
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            intake,
            provider,
        })
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

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where checks are attributed, recorded and staged.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub actor: Actor,
    pub audit_log_path: PathBuf,
    pub upload_dir: PathBuf,
    pub upload_limit_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Stub,
    Http,
}

/// Verification provider selection. `endpoint` is always set for `Http`.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ProviderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let kind = match env::var("COMPLIANCE_PROVIDER")
            .unwrap_or_else(|_| "stub".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "stub" | "mock" => ProviderKind::Stub,
            "http" => ProviderKind::Http,
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        let endpoint = non_empty_var("COMPLIANCE_PROVIDER_URL");
        if kind == ProviderKind::Http && endpoint.is_none() {
            return Err(ConfigError::MissingProviderEndpoint);
        }

        let timeout_secs = parse_number(
            "COMPLIANCE_PROVIDER_TIMEOUT_SECS",
            DEFAULT_PROVIDER_TIMEOUT_SECS,
        )?;

        Ok(Self {
            kind,
            endpoint,
            api_key: non_empty_var("COMPLIANCE_PROVIDER_API_KEY"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_number<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(name) {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    UnknownProvider(String),
    MissingProviderEndpoint,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a non-negative integer (found '{value}')")
            }
            ConfigError::UnknownProvider(value) => {
                write!(f, "COMPLIANCE_PROVIDER must be 'stub' or 'http' (found '{value}')")
            }
            ConfigError::MissingProviderEndpoint => write!(
                f,
                "COMPLIANCE_PROVIDER_URL is required when COMPLIANCE_PROVIDER=http"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
