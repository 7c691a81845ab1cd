//! Console logging for callwatch
//!
//! Small structured logger with per-subsystem tags and level filtering.
//! The minimum level defaults to Info and can be overridden with the
//! `CALLWATCH_LOG` environment variable (error/warning/info/debug).

use chrono::Utc;
use colored::*;
use once_cell::sync::Lazy;
use std::io::{self, Write};

/// Subsystem tag attached to every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Config,
    Probe,
    Monitor,
    Telegram,
    Db,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Probe => "PROBE",
            LogTag::Monitor => "MONITOR",
            LogTag::Telegram => "TELEGRAM",
            LogTag::Db => "DB",
        }
    }
}

/// Log levels ordered by severity (Error < Warning < Info < Debug)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ERROR" => Some(LogLevel::Error),
            "WARNING" | "WARN" => Some(LogLevel::Warning),
            "INFO" => Some(LogLevel::Info),
            "DEBUG" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

static MIN_LEVEL: Lazy<LogLevel> = Lazy::new(|| {
    std::env::var("CALLWATCH_LOG")
        .ok()
        .and_then(|v| LogLevel::from_str(&v))
        .unwrap_or(LogLevel::Info)
});

/// Initialize the logger. Call once at startup before any logging occurs.
pub fn init() {
    Lazy::force(&MIN_LEVEL);
}

pub fn error(tag: LogTag, message: &str) {
    log_line(tag, LogLevel::Error, message);
}

pub fn warning(tag: LogTag, message: &str) {
    log_line(tag, LogLevel::Warning, message);
}

pub fn info(tag: LogTag, message: &str) {
    log_line(tag, LogLevel::Info, message);
}

pub fn debug(tag: LogTag, message: &str) {
    log_line(tag, LogLevel::Debug, message);
}

fn log_line(tag: LogTag, level: LogLevel, message: &str) {
    // Errors always log, everything else is gated by the minimum level
    if level != LogLevel::Error && level > *MIN_LEVEL {
        return;
    }

    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let tag_str = tag.as_str();

    let line = match level {
        LogLevel::Error => format!(
            "{} {} {} {}",
            "❌".red().bold(),
            format!("[{}]", timestamp).dimmed(),
            tag_str.red().bold(),
            message.red()
        ),
        LogLevel::Warning => format!(
            "{} {} {} {}",
            "⚠".yellow().bold(),
            format!("[{}]", timestamp).dimmed(),
            tag_str.yellow().bold(),
            message.yellow()
        ),
        LogLevel::Info => format!(
            "{} {} {} {}",
            "ℹ".blue().bold(),
            format!("[{}]", timestamp).dimmed(),
            tag_str.blue().bold(),
            message
        ),
        LogLevel::Debug => format!(
            "{} {} {} {}",
            "🐛".purple().bold(),
            format!("[{}]", timestamp).dimmed(),
            tag_str.purple().bold(),
            message.dimmed()
        ),
    };

    println!("{}", line);
    let _ = io::stdout().flush();
}
