use std::path::PathBuf;

use chrono::{Datelike, Timelike};
// Re-export logging functions for convenience.
pub use log::*;
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where and how much to log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Directory log files are written to. `None` disables file logging.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("unable to create log file: {0}")]
    File(#[from] std::io::Error),
    #[error("invalid logging configuration: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),
    #[error("a logger is already set: {0}")]
    AlreadySet(#[from] SetLoggerError),
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            directory: Some(PathBuf::from("./logs")),
        }
    }
}

/// Initializes logging. Should be called before any other logging functions. Provided
/// `LevelFilter` will remove all logs below the provided level.
pub fn init(filter: LevelFilter) {
    init_with(&LogSettings {
        level: filter,
        ..Default::default()
    })
    .expect("unable to initialize logging");
}

/// Initializes logging to the console and, optionally, a log file named after the current time.
pub fn init_with(settings: &LogSettings) -> Result<(), LogInitError> {
    // Output to console
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("[{l}] {M} - {m}{n}")))
        .build();

    let mut config =
        Config::builder().appender(Appender::builder().build("stdout", Box::new(stdout)));
    let mut root = Root::builder().appender("stdout");

    if let Some(directory) = &settings.directory {
        let now = chrono::Utc::now();
        let log_file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d} [{l}] {M} - {m}{n}")))
            .build(directory.join(format!(
                "{} {} {} {} {} {}.txt",
                now.year(),
                now.month(),
                now.day(),
                now.hour(),
                now.minute(),
                now.second()
            )))?;
        config = config.appender(Appender::builder().build("log_file", Box::new(log_file)));
        root = root.appender("log_file");
    }

    let config = config.build(root.build(settings.level))?;
    log4rs::init_config(config)?;

    log_panics::init();
    Ok(())
}
