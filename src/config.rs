//! Configuration management for contactgate.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::{GatewayError, Result};
use crate::ratelimit::{RateLimitPolicy, RateLimitStore};

/// Prefix for environment overrides, e.g. `CONTACTGATE__SERVER__HTTP_ADDR`.
pub const ENV_PREFIX: &str = "CONTACTGATE";

/// Main configuration for the contactgate service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,

    /// Email provider configuration
    #[serde(default)]
    pub mail: MailConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Window length in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Requests admitted per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Block penalty in milliseconds
    #[serde(default = "default_block_duration_ms")]
    pub block_duration_ms: u64,

    /// How often expired records are swept, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Maximum tracked identifiers; unbounded when absent
    #[serde(default = "default_max_entries")]
    pub max_entries: Option<usize>,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_requests: default_max_requests(),
            block_duration_ms: default_block_duration_ms(),
            sweep_interval_secs: default_sweep_interval(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_interval_ms() -> u64 {
    60_000
}

fn default_max_requests() -> u32 {
    2
}

fn default_block_duration_ms() -> u64 {
    7_200_000
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_max_entries() -> Option<usize> {
    Some(10_000)
}

impl RateLimitingConfig {
    /// The limiter policy described by this configuration.
    pub fn policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(Duration::from_millis(self.interval_ms), self.max_requests)
            .with_block_duration(Duration::from_millis(self.block_duration_ms))
    }

    /// A store sized according to `max_entries`.
    pub fn store(&self) -> RateLimitStore {
        match self.max_entries {
            Some(max) => RateLimitStore::bounded(max),
            None => RateLimitStore::new(),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Email provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Base URL of the Resend API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key; falls back to the variable named by `api_key_env`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is not set
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sender shown on notification emails
    #[serde(default = "default_from")]
    pub from: String,

    /// Mailbox that receives submissions
    #[serde(default)]
    pub to: String,

    /// Prepended to every submitted subject
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    /// Request timeout in seconds
    #[serde(default = "default_mail_timeout")]
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            from: default_from(),
            to: String::new(),
            subject_prefix: default_subject_prefix(),
            timeout_secs: default_mail_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_api_key_env() -> String {
    "RESEND_API_KEY".to_string()
}

fn default_from() -> String {
    "Portfolio Contact <onboarding@resend.dev>".to_string()
}

fn default_subject_prefix() -> String {
    "[Portfolio] ".to_string()
}

fn default_mail_timeout() -> u64 {
    10
}

impl MailConfig {
    /// The configured API key, or the one found in the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl GatewayConfig {
    /// Load configuration from a YAML file, with environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .add_source(env_source())
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let config: GatewayConfig = settings
            .try_deserialize()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from defaults and environment overrides only.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(env_source())
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let config: GatewayConfig = settings
            .try_deserialize()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: GatewayConfig = serde_yaml::from_str(yaml)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot work with.
    pub fn validate(&self) -> Result<()> {
        let rl = &self.rate_limiting;
        if rl.max_requests == 0 {
            return Err(GatewayError::Config(
                "rate_limiting.max_requests must be greater than zero".to_string(),
            ));
        }
        if rl.interval_ms == 0 {
            return Err(GatewayError::Config(
                "rate_limiting.interval_ms must be greater than zero".to_string(),
            ));
        }
        if rl.sweep_interval_secs == 0 {
            return Err(GatewayError::Config(
                "rate_limiting.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.mail.to.trim().is_empty() {
            return Err(GatewayError::Config(
                "mail.to must name the mailbox that receives submissions".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
