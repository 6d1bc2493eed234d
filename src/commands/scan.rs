use colored::*;
use eyre::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use yusholib::config::Config;
use yusholib::ipscan::{IpRange, IpRangeScanner};

pub fn run(
    start: &str,
    end: &str,
    port: u16,
    output: Option<PathBuf>,
    timeout_ms: Option<u64>,
    config: &Config,
) -> Result<()> {
    let range = IpRange::new(start, end).context("Invalid address range")?;
    let result_file = Config::expand_path(&output.unwrap_or_else(|| config.scanner.result_file.clone()));
    let timeout = timeout_ms.map(Duration::from_millis).unwrap_or_else(|| config.scanner.timeout());

    let logger = config.logger.build();
    logger.info(&format!(
        "Scanning {} address(es) {} → {} on port {}",
        range.len(),
        range.start(),
        range.end(),
        port
    ));

    let scanner = IpRangeScanner::new(range, port, result_file).with_timeout(timeout);
    let open = scanner.scan();

    for ip in &open {
        logger.success(&format!("{} accepts connections on port {}", ip.to_string().bold(), port));
    }

    if open.is_empty() {
        logger.warn("No open hosts found");
    } else {
        logger.info(&format!(
            "{} open host(s) appended to {}",
            open.len(),
            scanner.result_file().display()
        ));
    }

    Ok(())
}
