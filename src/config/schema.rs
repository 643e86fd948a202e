//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! engine. All types derive Serde traits for deserialization from config
//! files, and every field has a default so minimal configs work.

use serde::{Deserialize, Serialize};

use crate::format::{FormatStyle, Origin};

/// Root configuration for one engine instance. Immutable once the engine
/// is constructed; independent engines may carry different snapshots.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Output style for rendered entries.
    pub style: FormatStyle,

    /// Where requests originate: `remote` for a server-side engine,
    /// `local` for a client-side engine. Picks the direction labels.
    pub origin: Origin,

    /// Maximum bytes captured per body; the stream itself is never capped.
    pub body_capture_limit: usize,

    /// Obfuscation settings.
    pub obfuscate: ObfuscateConfig,

    /// Content types (prefix match) whose bodies are suppressed.
    pub suppressed_content_types: Vec<String>,

    /// Collapse duplicate header names into one comma-joined entry.
    pub merge_duplicate_headers: bool,

    /// Activation decision settings.
    pub activation: ActivationConfig,

    /// Default sink settings.
    pub sink: SinkConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            style: FormatStyle::Http,
            origin: Origin::Remote,
            body_capture_limit: 16 * 1024,
            obfuscate: ObfuscateConfig::default(),
            suppressed_content_types: vec![
                "multipart/".to_string(),
                "application/octet-stream".to_string(),
            ],
            merge_duplicate_headers: false,
            activation: ActivationConfig::default(),
            sink: SinkConfig::default(),
        }
    }
}

/// Redaction of sensitive material before formatting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObfuscateConfig {
    /// Header names (case-insensitive) whose values are replaced.
    pub headers: Vec<String>,

    /// Regex patterns masked inside textual bodies.
    pub body_patterns: Vec<String>,

    /// Placeholder written over redacted material.
    pub replacement: String,
}

impl Default for ObfuscateConfig {
    fn default() -> Self {
        Self {
            headers: vec!["authorization".to_string()],
            body_patterns: Vec::new(),
            replacement: "XXX".to_string(),
        }
    }
}

/// How the per-exchange activation decision is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    #[default]
    All,
    None,
    Sample,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ActivationConfig {
    pub mode: ActivationMode,

    /// Fraction of exchanges logged in `sample` mode, in [0, 1].
    pub sample_rate: f64,

    /// Path prefixes never logged (health checks, metrics scrapes).
    pub exclude_paths: Vec<String>,

    /// Methods never logged.
    pub exclude_methods: Vec<String>,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            mode: ActivationMode::All,
            sample_rate: 1.0,
            exclude_paths: Vec::new(),
            exclude_methods: Vec::new(),
        }
    }
}

/// Settings for the default tracing-backed sink.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Level the default sink emits at (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
        }
    }
}
