//! Configuration management module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::HolidayRule;
use crate::theme::parse_hex_color;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Recurring holidays, e.g. `[[holidays]] day = "Saturday" n = 2 type = "office"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holidays: Vec<HolidayRule>,
}

/// Attendance API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Report computation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Days covered when no range is given.
    pub default_range_days: u32,
    /// Offset from UTC used to assign events to calendar days.
    pub utc_offset_minutes: i32,
    /// Completed sessions shorter than this on working days count as half days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half_day_threshold_minutes: Option<u32>,
    /// Coordinates per reverse-geocoding request.
    pub geocode_batch_size: usize,
}

/// Export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for exported files; current directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

/// Branding applied to exported documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub company_name: String,
    pub header_color: String,
    pub header_text_color: String,
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write daily-rotated log files.
    #[serde(default)]
    pub file: bool,
    /// Log file directory; the platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// Directory for log files, or `None` when file logging is off.
    pub fn log_dir(&self) -> Option<PathBuf> {
        if !self.file {
            return None;
        }
        self.dir.clone().or_else(|| {
            directories::ProjectDirs::from("com", "gianged", "workforce-attendance")
                .map(|dirs| dirs.data_local_dir().join("logs"))
        })
    }
}

impl AppConfig {
    /// Get config file path (same directory as executable).
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => ConfigLoadResult::Loaded(config),
                Err(e) => ConfigLoadResult::Invalid(e),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<AppConfig>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("API base URL cannot be empty".to_string()));
        }
        if !self.api.base_url.starts_with("http") {
            return Err(ConfigError::Validation(
                "API base URL must start with http:// or https://".to_string(),
            ));
        }
        if self.api.timeout_secs < 5 {
            return Err(ConfigError::Validation(
                "API timeout must be at least 5 seconds".to_string(),
            ));
        }
        if self.report.default_range_days < 1 {
            return Err(ConfigError::Validation("Default range must be at least 1 day".to_string()));
        }
        if self.report.default_range_days > 366 {
            return Err(ConfigError::Validation("Default range cannot exceed 366 days".to_string()));
        }
        if self.report.utc_offset_minutes.unsigned_abs() >= 24 * 60 {
            return Err(ConfigError::Validation(
                "UTC offset must be within +/-24 hours".to_string(),
            ));
        }
        if self.report.half_day_threshold_minutes == Some(0) {
            return Err(ConfigError::Validation(
                "Half-day threshold must be greater than 0".to_string(),
            ));
        }
        if self.report.geocode_batch_size < 1 {
            return Err(ConfigError::Validation(
                "Geocode batch size must be at least 1".to_string(),
            ));
        }
        for rule in &self.holidays {
            if !(1..=5).contains(&rule.n) {
                return Err(ConfigError::Validation(format!(
                    "Holiday rule for {} has occurrence {}, expected 1-5",
                    rule.day, rule.n
                )));
            }
        }
        for color in [&self.theme.header_color, &self.theme.header_text_color] {
            if parse_hex_color(color).is_err() {
                return Err(ConfigError::Validation(format!("Invalid theme color '{color}'")));
            }
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory for exported files.
    pub fn output_dir(&self) -> PathBuf {
        self.export.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_range_days: 30,
            utc_offset_minutes: 0,
            half_day_threshold_minutes: None,
            geocode_batch_size: 50,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            header_color: "#4472C4".to_string(),
            header_text_color: "#FFFFFF".to_string(),
        }
    }
}
