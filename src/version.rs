//! Library version and host system report

use serde::Serialize;
use std::fmt;

/// Version of this library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// Pre-release label, `final` for a release build
    pub release_level: String,
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}-{}", self.major, self.minor, self.patch, self.release_level)
    }
}

pub fn version_info() -> VersionInfo {
    let pre = env!("CARGO_PKG_VERSION_PRE");
    VersionInfo {
        major: env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
        minor: env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
        patch: env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
        release_level: if pre.is_empty() { "final".to_string() } else { pre.to_string() },
    }
}

/// Lines describing the library version and the host system
pub fn version_lines() -> Vec<String> {
    vec![
        format!("* {} v{}", env!("CARGO_PKG_NAME"), version_info()),
        format!(
            "* system info: {} {} {}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            std::env::consts::FAMILY
        ),
    ]
}

/// Print the version report and return its lines
pub fn show_version() -> Vec<String> {
    let lines = version_lines();
    println!("{}", lines.join("\n"));
    lines
}
