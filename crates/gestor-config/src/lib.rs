//! Configuration management for gestor
//!
//! This module handles loading, validation, and management of
//! gestor configuration from YAML files.

pub mod error;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Basic authentication (optional)
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

/// Basic authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

/// Data file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the ledger file
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Ledger file name (JSON)
    #[serde(default = "default_data_file")]
    pub file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            file: default_data_file(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_data_file() -> String {
    "ledger.json".to_string()
}

/// Ledger behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Initial monthly spending goal, used until the user sets one
    #[serde(default = "default_monthly_goal")]
    pub monthly_goal: Decimal,
    /// How many days back quick-add accepts (0 = today only)
    #[serde(default = "default_quick_add_days")]
    pub quick_add_days: u32,
    /// Generate due fixed-expense transactions on load and on change
    #[serde(default = "default_true")]
    pub materialize_fixed: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            monthly_goal: default_monthly_goal(),
            quick_add_days: default_quick_add_days(),
            materialize_fixed: true,
        }
    }
}

fn default_monthly_goal() -> Decimal {
    Decimal::ZERO
}

fn default_quick_add_days() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// List rendering and pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Height of one transaction row in pixels
    #[serde(default = "default_row_height")]
    pub row_height: u32,
    /// Rows rendered above and below the viewport
    #[serde(default = "default_buffer")]
    pub buffer: usize,
    /// Lists at or below this size are rendered in full
    #[serde(default = "default_virtualization_threshold")]
    pub virtualization_threshold: usize,
    /// Assumed viewport height before the browser reports one
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    /// Closings per page in the history view
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,
    /// Upcoming fixed expenses shown in the timeline
    #[serde(default = "default_upcoming_preview")]
    pub upcoming_preview: usize,
    /// Recent transactions shown on the dashboard
    #[serde(default = "default_recent_count")]
    pub recent_count: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            row_height: default_row_height(),
            buffer: default_buffer(),
            virtualization_threshold: default_virtualization_threshold(),
            viewport_height: default_viewport_height(),
            history_page_size: default_history_page_size(),
            upcoming_preview: default_upcoming_preview(),
            recent_count: default_recent_count(),
        }
    }
}

fn default_row_height() -> u32 {
    73
}

fn default_buffer() -> usize {
    5
}

fn default_virtualization_threshold() -> usize {
    50
}

fn default_viewport_height() -> u32 {
    600
}

fn default_history_page_size() -> usize {
    10
}

fn default_upcoming_preview() -> usize {
    5
}

fn default_recent_count() -> usize {
    5
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Decimal separator
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default)]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
            symbol_position: SymbolPosition::Before,
        }
    }
}

fn default_symbol() -> String {
    "R$".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ".".to_string()
}

fn default_decimal_sep() -> String {
    ",".to_string()
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Before,
    After,
}

/// Category display overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoriesConfig {
    /// Category key -> `#rrggbb` colour
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

/// AI advice provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Show the insights panel and allow requests
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL of the generate-content API
    #[serde(default = "default_advisor_endpoint")]
    pub endpoint: String,
    /// Model name appended to the endpoint
    #[serde(default = "default_advisor_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in seconds
    #[serde(default = "default_advisor_timeout")]
    pub timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_advisor_endpoint(),
            model: default_advisor_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_advisor_timeout(),
        }
    }
}

fn default_advisor_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_advisor_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

fn default_advisor_timeout() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub categories: CategoriesConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port must be greater than 0"));
        }

        if self.data.file.trim().is_empty() {
            return Err(invalid("data.file", "Ledger file name must not be empty"));
        }

        if self.ledger.monthly_goal < Decimal::ZERO {
            return Err(invalid("ledger.monthly_goal", "Goal must not be negative"));
        }

        if self.list.row_height == 0 {
            return Err(invalid("list.row_height", "Row height must be greater than 0"));
        }

        if self.list.history_page_size == 0 {
            return Err(invalid(
                "list.history_page_size",
                "Page size must be greater than 0",
            ));
        }

        if self.currency.decimal_places > 10 {
            return Err(invalid(
                "currency.decimal_places",
                "Decimal places must be between 0 and 10",
            ));
        }

        let hex = Regex::new(r"^#[0-9a-fA-F]{6}$").map_err(|e| ConfigError::IoError {
            message: e.to_string(),
        })?;
        for (key, color) in &self.categories.colors {
            if !hex.is_match(color) {
                return Err(invalid(
                    &format!("categories.colors.{}", key),
                    "Colours must be written as #rrggbb",
                ));
            }
        }

        if self.advisor.enabled {
            if self.advisor.endpoint.trim().is_empty() {
                return Err(invalid("advisor.endpoint", "Endpoint must not be empty"));
            }
            if self.advisor.model.trim().is_empty() {
                return Err(invalid("advisor.model", "Model must not be empty"));
            }
        }

        Ok(())
    }

    /// The bundled default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Full path to the ledger file
    pub fn ledger_path(&self) -> PathBuf {
        self.data.path.join(&self.data.file)
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
