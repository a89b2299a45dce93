// SPDX-License-Identifier: PMPL-1.0-or-later
//! Per-plugin log buffering
//!
//! Plugins are processed concurrently, so their log lines would interleave if
//! written as they happen. Each pipeline instead writes into its own
//! [`PluginLogBuffer`], and the batch runner flushes the buffers one at a
//! time. A flush renders a collapsible CI group:
//!
//! ```text
//! ::group::🔧 owner/repo
//! ::warning::<owner/repo> No releases found
//! ::endgroup::
//! ```

use std::fmt;

use tracing::{error, info, warn};

/// Severity of a buffered log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// CI annotation prefix for this severity
    pub fn annotation(&self) -> &'static str {
        match self {
            LogLevel::Info => "",
            LogLevel::Warning => "::warning::",
            LogLevel::Error => "::error::",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Destination for a plugin's log lines
pub trait LogSink: Send {
    /// Record one message at the given severity
    fn record(&mut self, level: LogLevel, message: String);

    /// Emit everything recorded so far and clear it
    fn flush(&mut self);

    fn info(&mut self, message: String) {
        self.record(LogLevel::Info, message);
    }

    fn warning(&mut self, message: String) {
        self.record(LogLevel::Warning, message);
    }

    fn error(&mut self, message: String) {
        self.record(LogLevel::Error, message);
    }
}

/// A single buffered line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Ordered log lines for one plugin, labelled by repository name
#[derive(Debug, Clone)]
pub struct PluginLogBuffer {
    repo: String,
    entries: Vec<LogEntry>,
}

impl PluginLogBuffer {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            entries: Vec::new(),
        }
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether anything at `level` or above was recorded
    pub fn has_level(&self, level: LogLevel) -> bool {
        self.entries.iter().any(|e| e.level >= level)
    }

    /// Lines a flush would print, group markers included
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.entries.len() + 2);
        lines.push(format!("::group::🔧 {}", self.repo));
        for entry in &self.entries {
            lines.push(format!(
                "{}<{}> {}",
                entry.level.annotation(),
                self.repo,
                entry.message
            ));
        }
        lines.push("::endgroup::".to_string());
        lines
    }
}

impl LogSink for PluginLogBuffer {
    fn record(&mut self, level: LogLevel, message: String) {
        self.entries.push(LogEntry { level, message });
    }

    fn flush(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        info!("::group::🔧 {}", self.repo);
        for entry in self.entries.drain(..) {
            let line = format!(
                "{}<{}> {}",
                entry.level.annotation(),
                self.repo,
                entry.message
            );
            match entry.level {
                LogLevel::Info => info!("{}", line),
                LogLevel::Warning => warn!("{}", line),
                LogLevel::Error => error!("{}", line),
            }
        }
        info!("::endgroup::");
    }
}
