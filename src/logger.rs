//! Leveled console logger
//!
//! Prints one colored line per call to stdout:
//! `[<timestamp>] <TAG>    :: <message>`

use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default chrono format for the timestamp prefix
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%m/%d/%YT%H:%M:%S";

/// Severity of a console message, also used as the print threshold.
///
/// `Info` and `Success` share a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
    Success,
    Info,
    Debug,
}

impl Severity {
    /// Numeric rank; a message prints when its rank is <= the threshold's
    pub fn rank(self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warn => 1,
            Severity::Success | Severity::Info => 2,
            Severity::Debug => 3,
        }
    }

    fn tag(self) -> ColoredString {
        match self {
            Severity::Error => "ERROR   ".red(),
            Severity::Warn => "WARN    ".yellow(),
            Severity::Success => "SUCCESS ".green(),
            Severity::Info => "INFO    ".cyan(),
            Severity::Debug => "DEBUG   ".white(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown severity '{0}' (expected error, warn, info, success or debug)")]
pub struct SeverityParseError(pub String);

impl FromStr for Severity {
    type Err = SeverityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warn),
            "success" => Ok(Severity::Success),
            "info" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            _ => Err(SeverityParseError(s.to_string())),
        }
    }
}

/// Console logger with a fixed severity threshold
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    level: Severity,
    hide_time: bool,
    timestamp_format: String,
}

impl ConsoleLogger {
    pub fn new(level: Severity) -> Self {
        Self {
            level,
            hide_time: false,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }

    pub fn hide_time(mut self, hide: bool) -> Self {
        self.hide_time = hide;
        self
    }

    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    /// Whether a message of `severity` passes the threshold
    pub fn enabled(&self, severity: Severity) -> bool {
        severity.rank() <= self.level.rank()
    }

    /// The line that would be printed, or `None` if filtered out
    pub fn format_line(&self, severity: Severity, message: &str) -> Option<String> {
        if !self.enabled(severity) {
            return None;
        }

        let time = if self.hide_time {
            String::new()
        } else {
            format!("{} ", format!("[{}]", self.timestamp()).bright_black())
        };

        Some(format!("{}{} {} {}", time, severity.tag(), "::".white(), message))
    }

    /// Current local time in the configured format, or the default format
    /// when the configured one doesn't parse
    fn timestamp(&self) -> String {
        let valid = StrftimeItems::new(&self.timestamp_format).all(|item| item != Item::Error);
        let format = if valid {
            self.timestamp_format.as_str()
        } else {
            DEFAULT_TIMESTAMP_FORMAT
        };
        Local::now().format(format).to_string()
    }

    /// Print `message` at `severity`
    pub fn log(&self, severity: Severity, message: &str) {
        if let Some(line) = self.format_line(severity, message) {
            println!("{}", line);
        }
    }

    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Severity::Warn, message);
    }

    pub fn success(&self, message: &str) {
        self.log(Severity::Success, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Severity::Debug, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_order() {
        assert!(Severity::Error.rank() < Severity::Warn.rank());
        assert!(Severity::Warn.rank() < Severity::Info.rank());
        assert_eq!(Severity::Info.rank(), Severity::Success.rank());
        assert!(Severity::Info.rank() < Severity::Debug.rank());
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("WARN".parse::<Severity>(), Ok(Severity::Warn));
        assert_eq!("success".parse::<Severity>(), Ok(Severity::Success));
        assert_eq!("Debug".parse::<Severity>(), Ok(Severity::Debug));
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn test_threshold_filtering() {
        let logger = ConsoleLogger::new(Severity::Warn).hide_time(true);

        assert!(logger.format_line(Severity::Error, "e").is_some());
        assert!(logger.format_line(Severity::Warn, "w").is_some());
        assert!(logger.format_line(Severity::Info, "i").is_none());
        assert!(logger.format_line(Severity::Success, "s").is_none());
        assert!(logger.format_line(Severity::Debug, "d").is_none());
    }

    #[test]
    fn test_info_threshold_allows_success() {
        let logger = ConsoleLogger::new(Severity::Info);
        assert!(logger.enabled(Severity::Success));
        assert!(!logger.enabled(Severity::Debug));
    }

    #[test]
    fn test_line_layout_without_time() {
        let logger = ConsoleLogger::new(Severity::Debug).hide_time(true);
        let line = logger.format_line(Severity::Success, "all good").unwrap();

        assert!(line.contains("SUCCESS "));
        assert!(line.contains("::"));
        assert!(line.ends_with("all good"));
        assert!(!line.contains('['));
    }

    #[test]
    fn test_line_layout_with_custom_time_format() {
        let logger = ConsoleLogger::new(Severity::Debug).timestamp_format("%Y");
        let line = logger.format_line(Severity::Error, "boom").unwrap();
        let year = Local::now().format("%Y").to_string();

        assert!(line.contains(&format!("[{}]", year)));
        assert!(line.contains("ERROR   "));
    }

    #[test]
    fn test_invalid_time_format_falls_back() {
        let logger = ConsoleLogger::new(Severity::Debug).timestamp_format("%Q%");
        let line = logger.format_line(Severity::Info, "still prints").unwrap();
        assert!(line.contains("still prints"));
    }

    #[test]
    fn test_severity_serde() {
        let parsed: Severity = serde_yaml::from_str("success").unwrap();
        assert_eq!(parsed, Severity::Success);
        assert_eq!(serde_yaml::to_string(&Severity::Warn).unwrap().trim(), "warn");
    }
}
