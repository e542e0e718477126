use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Service name reported by the status endpoints
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Shared secret expected in the X-Tuneup-API-Key header.
    /// The server refuses to start without it.
    pub tuneup_api_key: Option<String>,

    /// CORS allowed origins (comma-separated)
    pub cors_origins: Option<String>,

    /// Origin suffix for tenant subdomains, e.g. ".tuneup.sageteck.com".
    /// Any https origin ending in this suffix is allowed.
    pub cors_tenant_suffix: Option<String>,

    /// Seconds before an unrefreshed typing indicator is considered stale
    #[serde(default = "default_typing_expiry_secs")]
    pub typing_expiry_secs: u64,

    /// Tenant assumed for socket handshakes that omit tenant_id
    /// (single-tenant deployments)
    #[serde(default = "default_tenant_id")]
    pub default_tenant_id: i64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        // Load from environment variables using envy
        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("✅ Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("❌ Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }

    /// Parsed list of explicitly allowed CORS origins
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .map(|origins| {
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            service_name: default_service_name(),
            tuneup_api_key: None,
            cors_origins: None,
            cors_tenant_suffix: None,
            typing_expiry_secs: default_typing_expiry_secs(),
            default_tenant_id: default_tenant_id(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "tuneup-broadcast".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_typing_expiry_secs() -> u64 {
    10
}

fn default_tenant_id() -> i64 {
    1
}
