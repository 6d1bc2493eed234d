//! yusholib - small utility library
//!
//! - `events`: synchronous event registry and observable properties
//! - `ipscan`: sequential IPv4 range port scanner
//! - `logger`: leveled, colored console logger
//! - `version`: library version and host system report

pub mod config;
pub mod events;
pub mod ipscan;
pub mod logger;
pub mod version;

pub use events::{EventArgs, EventError, Handler, Observable, ObservableProperty, PropertyError};
pub use ipscan::{IpRange, IpRangeScanner, ScanError};
pub use logger::{ConsoleLogger, Severity};
pub use version::{VersionInfo, show_version, version_info};
