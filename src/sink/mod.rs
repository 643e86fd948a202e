//! Write sinks for rendered log entries.
//!
//! # Responsibilities
//! - Define the sink contract: at most one request write and one response
//!   write per exchange, no retry assumed
//! - Provide the default `tracing`-backed sink and an in-memory test sink
//!
//! # Design Decisions
//! - Sinks are synchronous; a slow sink belongs behind a channel owned by
//!   the host, not inside the engine
//! - Abandonment gets its own method with a default delegating to
//!   `write_response`, so two-method sinks stay valid

pub mod activate;
pub mod dispatch;

use std::fmt;
use std::sync::Mutex;

use thiserror::Error;
use tracing::Level;

pub use activate::Activation;
pub use dispatch::Dispatcher;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink rejected entry: {0}")]
    Rejected(String),
    #[error("sink I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for rendered entries. Invoked at most once per exchange for
/// each of request, response, and incomplete.
pub trait WriteSink: Send + Sync + fmt::Debug {
    fn write_request(&self, entry: &str) -> Result<(), SinkError>;
    fn write_response(&self, entry: &str) -> Result<(), SinkError>;

    /// Terminal record of an exchange that will never complete.
    fn write_incomplete(&self, entry: &str) -> Result<(), SinkError> {
        self.write_response(entry)
    }
}

/// Default sink: emits entries through `tracing` at a fixed level.
#[derive(Debug)]
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    fn emit(&self, entry: &str) {
        match self.level {
            Level::ERROR => tracing::error!(target: "wiretap::sink", "{entry}"),
            Level::WARN => tracing::warn!(target: "wiretap::sink", "{entry}"),
            Level::INFO => tracing::info!(target: "wiretap::sink", "{entry}"),
            Level::DEBUG => tracing::debug!(target: "wiretap::sink", "{entry}"),
            Level::TRACE => tracing::trace!(target: "wiretap::sink", "{entry}"),
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl WriteSink for TracingSink {
    fn write_request(&self, entry: &str) -> Result<(), SinkError> {
        self.emit(entry);
        Ok(())
    }

    fn write_response(&self, entry: &str) -> Result<(), SinkError> {
        self.emit(entry);
        Ok(())
    }
}

/// Which write produced a recorded entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Request,
    Response,
    Incomplete,
}

/// In-memory sink recording every write; test support.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(EntryKind, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, kind: EntryKind, entry: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((kind, entry.to_string()));
        }
    }

    fn of_kind(&self, kind: EntryKind) -> Vec<String> {
        match self.entries.lock() {
            Ok(entries) => entries
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, e)| e.clone())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.of_kind(EntryKind::Request)
    }

    pub fn responses(&self) -> Vec<String> {
        self.of_kind(EntryKind::Response)
    }

    pub fn incompletes(&self) -> Vec<String> {
        self.of_kind(EntryKind::Incomplete)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().map(|e| e.is_empty()).unwrap_or(true)
    }
}

impl WriteSink for MemorySink {
    fn write_request(&self, entry: &str) -> Result<(), SinkError> {
        self.push(EntryKind::Request, entry);
        Ok(())
    }

    fn write_response(&self, entry: &str) -> Result<(), SinkError> {
        self.push(EntryKind::Response, entry);
        Ok(())
    }

    fn write_incomplete(&self, entry: &str) -> Result<(), SinkError> {
        self.push(EntryKind::Incomplete, entry);
        Ok(())
    }
}
