//! Transparent HTTP traffic logging engine.
//!
//! Sits inside request/response pipelines, captures the wire-level
//! exchange without altering what the application or peer sends or
//! receives, and emits one formatted record per exchange to pluggable
//! sinks.
//!
//! # Data Flow
//! ```text
//! raw stream
//!     → capture   (observing decorators, bounded buffers)
//!     → capture::decode (display decoding: gzip/deflate → text)
//!     → correlate (request/response rendezvous, exchange ids)
//!     → filter    (redaction, suppression, merging)
//!     → format    (http / curl / structured)
//!     → sink      (activation decision, fan-out, isolation)
//! ```
//!
//! The `middleware` module installs the engine into any tower/http
//! pipeline; `engine::Wiretap` is the facade for direct use.

// Core subsystems
pub mod capture;
pub mod correlate;
pub mod http;

// Rendering pipeline
pub mod filter;
pub mod format;
pub mod sink;

// Cross-cutting concerns
pub mod config;
pub mod engine;
pub mod middleware;

pub use crate::config::{load_config, ConfigError, LogConfig};
pub use crate::correlate::{Correlation, ExchangeId, Precorrelation};
pub use crate::engine::Wiretap;
pub use crate::format::{FormatStyle, Origin};
pub use crate::http::{HeaderMultimap, RequestHead, RequestView, ResponseHead, ResponseView};
pub use crate::middleware::TrafficLogLayer;
pub use crate::sink::{Activation, MemorySink, SinkError, TracingSink, WriteSink};
