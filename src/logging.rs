use std::sync::{Arc, Mutex, PoisonError};

use tracing_subscriber::{fmt, EnvFilter};

/// Where an actor reports what it is doing.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Forwards actor messages to `tracing`, tagged with the actor's name.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    actor: String,
}

impl TracingLogger {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(actor = %self.actor, "{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!(actor = %self.actor, "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(actor = %self.actor, "{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Keeps every message in memory. Clones share the same buffer, so a test can
/// hand one clone to an actor and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message)
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                level,
                message: message.to_string(),
            });
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }
}

/// Installs a stderr `tracing` subscriber. `RUST_LOG` takes precedence over
/// `default_directive`. Calling it again after a subscriber is set is a no-op.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = fmt()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_logger_clones_share_entries() {
        let logger = MemoryLogger::new();
        let handle = logger.clone();

        logger.info("status 200");
        logger.debug("no dump");
        logger.warn("dump failed");

        assert_eq!(handle.entries().len(), 3);
        assert_eq!(handle.messages(LogLevel::Info), vec!["status 200"]);
        assert_eq!(handle.messages(LogLevel::Debug), vec!["no dump"]);
        assert_eq!(handle.messages(LogLevel::Warn), vec!["dump failed"]);
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing("debug");
        init_tracing("info");
        TracingLogger::new("Tester").info("still logging");
    }
}
