// Copyright (C) 2026  Filebridge Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Configuration for structured logging.
//!
//! Output format, level filter and decorations of the log lines.

use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while setting up logging
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Unknown log format: {0}. Expected one of: pretty, compact, json")]
    InvalidFormat(String),

    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Output format for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human-readable output
    #[default]
    Pretty,

    /// Compact single-line format
    Compact,

    /// JSON lines for log collectors
    Json,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(LogError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Write to standard error
    Stderr,

    /// Write to standard output
    Stdout,
}

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format for logs
    pub format: LogFormat,

    /// Level filter (e.g. "info", "filebridge_supabase=debug").
    /// If None, `RUST_LOG` decides, then "info"
    pub level: Option<String>,

    /// Colour output; ignored by the JSON format
    pub use_color: bool,

    /// Include timestamps
    pub use_timestamps: bool,

    /// Include thread IDs
    pub include_thread_ids: bool,

    /// Include target module names
    pub include_targets: bool,

    /// Output destination (stderr by default)
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Pretty,
            level: None,
            use_color: true,
            use_timestamps: true,
            include_thread_ids: false,
            include_targets: true,
            output: LogOutput::Stderr,
        }
    }
}

impl LogConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the level and format names found in configuration files
    pub fn from_names(level: &str, format: &str) -> Result<Self, LogError> {
        let format = format.parse()?;
        let use_color = format != LogFormat::Json;
        Ok(LogConfig::new()
            .with_format(format)
            .with_level(level)
            .with_color(use_color))
    }

    /// Set the output format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Enable or disable color output
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Enable or disable timestamps
    pub fn with_timestamps(mut self, use_timestamps: bool) -> Self {
        self.use_timestamps = use_timestamps;
        self
    }

    /// Enable or disable thread IDs
    pub fn with_thread_ids(mut self, include_thread_ids: bool) -> Self {
        self.include_thread_ids = include_thread_ids;
        self
    }

    /// Enable or disable target module names
    pub fn with_targets(mut self, include_targets: bool) -> Self {
        self.include_targets = include_targets;
        self
    }

    /// Set the output destination
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Get the effective log level from config or environment
    pub fn effective_level(&self) -> String {
        self.level_or(std::env::var("RUST_LOG").ok())
    }

    fn level_or(&self, rust_log: Option<String>) -> String {
        self.level
            .clone()
            .or(rust_log)
            .unwrap_or_else(|| "info".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!(matches!(
            "text".parse::<LogFormat>(),
            Err(LogError::InvalidFormat(ref f)) if f == "text"
        ));
    }

    #[test]
    fn test_from_names() {
        let config = LogConfig::from_names("debug", "json").unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level.as_deref(), Some("debug"));
        assert!(!config.use_color);

        let config = LogConfig::from_names("info", "pretty").unwrap();
        assert!(config.use_color);

        assert!(LogConfig::from_names("info", "xml").is_err());
    }

    #[test]
    fn test_effective_level_from_config() {
        let config = LogConfig::new().with_level("debug");
        assert_eq!(config.effective_level(), "debug");
    }

    #[test]
    fn test_level_falls_back_to_rust_log_then_info() {
        let config = LogConfig::new();
        assert_eq!(config.level_or(Some("trace".into())), "trace");
        assert_eq!(config.level_or(None), "info");

        let config = LogConfig::new().with_level("warn");
        assert_eq!(config.level_or(Some("trace".into())), "warn");
    }

    #[test]
    fn test_log_output_default() {
        assert_eq!(LogConfig::default().output, LogOutput::Stderr);
    }
}
