use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ipscan::DEFAULT_TIMEOUT;
use crate::logger::{ConsoleLogger, DEFAULT_TIMESTAMP_FORMAT, Severity};

/// Main yusholib configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Level for the diagnostic log file
    pub log_level: LogLevel,
    pub logger: LoggerConfig,
    pub scanner: ScannerConfig,
}

/// Diagnostic log level (the `log` crate's filter)
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Console logger settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Threshold: error, warn, info, success or debug
    pub level: Severity,
    pub hide_time: bool,
    /// chrono strftime format for the timestamp prefix
    pub timestamp_format: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Severity::Info,
            hide_time: false,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn build(&self) -> ConsoleLogger {
        ConsoleLogger::new(self.level)
            .hide_time(self.hide_time)
            .timestamp_format(self.timestamp_format.clone())
    }
}

/// Port scanner settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Per-address connect timeout in milliseconds
    pub timeout_ms: u64,
    /// Where open addresses are appended
    pub result_file: PathBuf,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            result_file: PathBuf::from("open-hosts.txt"),
        }
    }
}

impl ScannerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check YUSHO_CONFIG env var
        if let Ok(env_path) = std::env::var("YUSHO_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from YUSHO_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try YUSHO_DIR/yusholib.yaml, then ~/.config/yusholib/yusholib.yaml
        let path = Self::config_dir().join("yusholib.yaml");
        if path.exists() {
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        // Try ./yusholib.yaml (for development)
        let local_config = PathBuf::from("yusholib.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Directory holding yusholib.yaml: `$YUSHO_DIR` or `<config_dir>/yusholib`
    pub fn config_dir() -> PathBuf {
        std::env::var("YUSHO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("yusholib"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }

    /// Look up a single value by dotted key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "log_level" | "log-level" => Some(self.log_level.as_filter().to_string()),
            "logger.level" => Some(self.logger.level.to_string()),
            "logger.hide_time" => Some(self.logger.hide_time.to_string()),
            "logger.timestamp_format" => Some(self.logger.timestamp_format.clone()),
            "scanner.timeout_ms" => Some(self.scanner.timeout_ms.to_string()),
            "scanner.result_file" => Some(self.scanner.result_file.display().to_string()),
            _ => None,
        }
    }
}
