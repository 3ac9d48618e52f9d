//! Structured logging for typelens
//!
//! Writes logs to ~/.typelens/logs/ with categories:
//! - INSIGHT: report generation lifecycle (which type code, which generator)
//! - CONTEXT: conversation context extraction
//! - GENERATIVE: LLM calls, their outcomes, and discarded responses
//! - STORE: conversation log reads/writes
//! - ERROR: errors and degraded fallbacks

use chrono::{Local, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Log categories for structured logging
#[derive(Debug, Clone, Copy)]
pub enum LogCategory {
    Insight,    // Report generation lifecycle
    Context,    // Conversation context extraction
    Generative, // LLM call outcomes
    Store,      // Conversation log access
    Error,      // Errors and degraded fallbacks
}

impl LogCategory {
    fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Insight => "INSIGHT",
            LogCategory::Context => "CONTEXT",
            LogCategory::Generative => "GENERATIVE",
            LogCategory::Store => "STORE",
            LogCategory::Error => "ERROR",
        }
    }
}

/// Get the log directory path
fn get_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".typelens/logs")
}

/// Get today's log file path
fn get_log_file_path() -> PathBuf {
    let today = Local::now().format("%Y-%m-%d").to_string();
    get_log_dir().join(format!("typelens-{}.log", today))
}

/// Initialize the logging system - creates log directory if needed
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = get_log_dir();

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }

    log(LogCategory::Insight, None, "typelens logging initialized");

    Ok(())
}

/// Log a message with category and optional type-code context.
///
/// The log path is recomputed per call so the file rolls over at midnight
/// without any process-level state.
pub fn log(category: LogCategory, type_code: Option<&str>, message: &str) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let code_context = type_code
        .map(|code| format!("type={} | ", code))
        .unwrap_or_default();

    let log_line = format!(
        "[{}] [{}] {}{}\n",
        timestamp,
        category.as_str(),
        code_context,
        message
    );

    // Always print to console (for dev)
    print!("{}", log_line);

    // Write to file
    let log_path = get_log_file_path();
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(log_line.as_bytes());
    }
}

/// Log a report generation event
pub fn log_insight(type_code: Option<&str>, message: &str) {
    log(LogCategory::Insight, type_code, message);
}

/// Log a context extraction event
pub fn log_context(type_code: Option<&str>, message: &str) {
    log(LogCategory::Context, type_code, message);
}

/// Log a generative call outcome (success, failure, discarded response)
pub fn log_generative(type_code: Option<&str>, message: &str) {
    log(LogCategory::Generative, type_code, message);
}

/// Log a conversation store event
pub fn log_store(type_code: Option<&str>, message: &str) {
    log(LogCategory::Store, type_code, message);
}

/// Log an error
pub fn log_error(type_code: Option<&str>, message: &str) {
    log(LogCategory::Error, type_code, message);
}

/// Clean up old log files (keep last 7 days)
pub fn cleanup_old_logs() -> Result<usize, Box<dyn std::error::Error>> {
    let log_dir = get_log_dir();
    let mut deleted = 0;

    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - chrono::Duration::days(7);

    for entry in fs::read_dir(&log_dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Ok(metadata) = entry.metadata() {
            if let Ok(modified) = metadata.modified() {
                let modified_time: chrono::DateTime<Utc> = modified.into();
                if modified_time < cutoff {
                    if fs::remove_file(&path).is_ok() {
                        deleted += 1;
                    }
                }
            }
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path_rolls_daily() {
        let path = get_log_file_path();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let today = Local::now().format("%Y-%m-%d").to_string();

        assert_eq!(name, format!("typelens-{}.log", today));
        assert!(path.starts_with(get_log_dir()));
    }

    #[test]
    fn test_init_logging_creates_log_dir() {
        init_logging().unwrap();

        assert!(get_log_dir().exists());
    }
}
