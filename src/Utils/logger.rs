//! Logging setup for the solvers and the command line driver.
//!
//! Solvers only emit `log` records; whoever runs them decides where the records go.
//! `init_logger` installs a terminal logger and, optionally, a file logger next to it.
use chrono::Local;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("loglevel must be debug, info, warn, error or off, got `{0}`")]
    UnknownLevel(String),
    #[error("cannot create log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("logger is already initialized: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}

/// map a level name to a filter; "none" is accepted as a synonym of "off"
pub fn level_from_str(level: &str) -> Result<LevelFilter, LoggerError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        _ => Err(LoggerError::UnknownLevel(level.to_string())),
    }
}

/// log file name stamped with the current local time, e.g. log_2024-05-01_12-30-00.txt
pub fn timestamped_log_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Install the global logger: terminal output always, a file too when `log_file` is given.
/// The global logger can be set once per process; later calls return `SetLogger`.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> Result<(), LoggerError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if let Some(name) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(name)?));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}
