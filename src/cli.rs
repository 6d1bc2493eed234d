use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use yusholib::Severity;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "yusho",
    about = "yusholib utilities - IP range port scanner and console logger",
    version,
    after_help = "Logs are written to: ~/.local/share/yusholib/logs/yusho.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to yusholib.yaml config file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan an IPv4 range for hosts accepting TCP connections on a port
    Scan {
        /// First address of the range
        start: String,

        /// Last address of the range (inclusive)
        end: String,

        /// TCP port to probe
        #[arg(short, long)]
        port: u16,

        /// File to append open addresses to (defaults to scanner.result_file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Per-address connect timeout in milliseconds (defaults to scanner.timeout_ms)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Print a message through the console logger
    Log {
        /// Message severity
        #[arg(value_enum)]
        level: SeverityArg,

        /// Message text
        message: String,

        /// Threshold override (defaults to logger.level)
        #[arg(long, value_enum)]
        threshold: Option<SeverityArg>,

        /// Omit the timestamp prefix
        #[arg(long)]
        hide_time: bool,
    },

    /// Show library version and system info
    Info,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Console severity as a CLI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Error,
    Warn,
    Success,
    Info,
    Debug,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Error => Severity::Error,
            SeverityArg::Warn => Severity::Warn,
            SeverityArg::Success => Severity::Success,
            SeverityArg::Info => Severity::Info,
            SeverityArg::Debug => Severity::Debug,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Config key (e.g., logger.level)
        key: String,
    },
}
