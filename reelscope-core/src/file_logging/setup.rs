use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::path::Path;
use anyhow::Result;

const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}";

/// Builds the log4rs configuration for a single log file.
pub fn file_logging_config(log_file: &Path, log_level: LevelFilter) -> Result<Config> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(log_file)?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(Root::builder().appender("file").build(log_level))?;

    Ok(config)
}

/// Routes all `log` output to `log_file`. Can only succeed once per process.
pub fn setup_file_logging(log_file: &Path, log_level: LevelFilter) -> Result<()> {
    let config = file_logging_config(log_file, log_level)?;
    log4rs::init_config(config)?;
    Ok(())
}
