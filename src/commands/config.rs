use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use yusholib::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "yusholib Configuration".bold());
            println!();

            println!("{}: {}", "log_level".cyan(), config.log_level.as_filter());
            println!();

            println!("{}:", "logger".cyan());
            println!("  level: {}", config.logger.level);
            println!("  hide_time: {}", config.logger.hide_time);
            println!("  timestamp_format: {}", config.logger.timestamp_format);
            println!();

            println!("{}:", "scanner".cyan());
            println!("  timeout_ms: {}", config.scanner.timeout_ms);
            println!("  result_file: {}", config.scanner.result_file.display());
        }
    }

    Ok(())
}

fn get(key: &str, config: &Config) -> Result<()> {
    match config.get(key) {
        Some(v) => println!("{}", v),
        None => eyre::bail!("Unknown config key: {}", key),
    }

    Ok(())
}
