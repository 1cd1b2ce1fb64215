//! Loggers - where repositories report failures before returning them.

use std::sync::{Arc, Mutex};

/// Sink for failure diagnostics.
pub trait Logger: Send + Sync {
    /// Record a message at error severity.
    fn error(&self, message: &str);
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

/// Discards everything. The default for repositories built without a logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn error(&self, _message: &str) {}
}

/// Forwards messages to `tracing` at ERROR level.
///
/// The host application decides where they end up by installing a subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, message: &str) {
        tracing::error!(target: "tracked_repo", "{}", message);
    }
}

/// Keeps messages in memory, optionally in a buffer shared with the caller.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    buffer: Arc<Mutex<Vec<String>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        MemoryLogger { buffer }
    }

    /// Everything logged so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        match self.buffer.lock() {
            Ok(buffer) => buffer.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Logger for MemoryLogger {
    fn error(&self, message: &str) {
        let line = format!("[ERROR] {}", message);
        match self.buffer.lock() {
            Ok(mut buffer) => buffer.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}
