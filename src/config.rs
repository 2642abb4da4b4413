use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub distance: DistanceSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub settings_store: SettingsStoreSettings,
    #[serde(default)]
    pub spreadsheet: SpreadsheetSettings,
    #[serde(default)]
    pub pagination: PaginationSettings,
    #[serde(default)]
    pub kpi: KpiSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// L2 is disabled when unset
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistanceSettings {
    #[serde(default = "default_distance_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DistanceSettings {
    fn default() -> Self {
        Self {
            endpoint: default_distance_endpoint(),
            api_key: None,
            language: default_language(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_distance_endpoint() -> String { crate::services::distance::DEFAULT_ENDPOINT.to_string() }
fn default_language() -> String { "ja".to_string() }
fn default_batch_size() -> usize { 25 }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_age_weight")]
    pub age: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_occupation_weight")]
    pub occupation: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            age: default_age_weight(),
            location: default_location_weight(),
            occupation: default_occupation_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        ScoringWeights {
            age: config.age,
            location: config.location,
            occupation: config.occupation,
        }
    }
}

fn default_age_weight() -> f64 { 0.4 }
fn default_location_weight() -> f64 { 0.4 }
fn default_occupation_weight() -> f64 { 0.2 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub required: bool,
    pub admin_username: String,
    pub admin_password: String,
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

fn default_token_ttl() -> i64 { 8 * 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsStoreSettings {
    pub path: String,
}

impl Default for SettingsStoreSettings {
    fn default() -> Self {
        Self {
            path: "data/settings.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpreadsheetSettings {
    #[serde(default = "default_export_endpoint")]
    pub export_endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpreadsheetSettings {
    fn default() -> Self {
        Self {
            export_endpoint: default_export_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_export_endpoint() -> String {
    crate::services::spreadsheet::DEFAULT_EXPORT_ENDPOINT.to_string()
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationSettings {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_per_page: 50,
            max_per_page: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KpiSettings {
    /// Hire targets for Q1..Q4 of the current year
    #[serde(default)]
    pub quarterly_hire_targets: Vec<u32>,
    #[serde(default = "default_top_performers")]
    pub top_performers_limit: usize,
}

impl Default for KpiSettings {
    fn default() -> Self {
        Self {
            quarterly_hire_targets: Vec::new(),
            top_performers_limit: default_top_performers(),
        }
    }
}

fn default_top_performers() -> usize { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with RECRUIT__)
    /// 5. DATABASE_URL, REDIS_URL and GOOGLE_MAPS_API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RECRUIT__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_well_known_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("RECRUIT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Conventional variable names shared with other tooling take precedence
fn apply_well_known_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in [
        ("DATABASE_URL", "database.url"),
        ("REDIS_URL", "cache.redis_url"),
        ("GOOGLE_MAPS_API_KEY", "distance.api_key"),
    ] {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
