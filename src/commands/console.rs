use eyre::Result;

use yusholib::config::Config;
use yusholib::logger::Severity;

pub fn run(level: Severity, message: &str, threshold: Option<Severity>, hide_time: bool, config: &Config) -> Result<()> {
    let mut logger_config = config.logger.clone();
    if let Some(threshold) = threshold {
        logger_config.level = threshold;
    }
    if hide_time {
        logger_config.hide_time = true;
    }

    log::debug!("Console message at {} (threshold {})", level, logger_config.level);
    logger_config.build().log(level, message);

    Ok(())
}
