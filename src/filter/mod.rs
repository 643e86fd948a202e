//! Filter & obfuscation pipeline.
//!
//! # Design Decisions
//! - An ordered list of trait objects, applied in configured order
//! - Every transformation is total: input it cannot process passes through
//!   unchanged instead of failing the log entry
//! - Built-ins are fixed points, so re-running the pipeline changes nothing

use std::fmt;

use crate::config::{ConfigError, LogConfig};
use crate::http::{RequestView, ResponseView};

pub mod obfuscate;

pub use obfuscate::{BodyRedaction, BodySuppression, HeaderRedaction, MergeDuplicateHeaders};

/// A single total transformation over request/response views.
pub trait ViewFilter: Send + Sync + fmt::Debug {
    fn apply_request(&self, view: RequestView) -> RequestView {
        view
    }

    fn apply_response(&self, view: ResponseView) -> ResponseView {
        view
    }
}

/// Ordered sequence of filters.
#[derive(Debug, Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn ViewFilter>>,
}

impl FilterPipeline {
    pub fn new(filters: Vec<Box<dyn ViewFilter>>) -> Self {
        Self { filters }
    }

    /// Build the configured built-ins: header redaction, body suppression,
    /// body redaction, optional duplicate-header merging.
    pub fn from_config(config: &LogConfig) -> Result<Self, ConfigError> {
        let mut filters: Vec<Box<dyn ViewFilter>> = Vec::new();
        if !config.obfuscate.headers.is_empty() {
            filters.push(Box::new(HeaderRedaction::new(
                config.obfuscate.headers.clone(),
                config.obfuscate.replacement.clone(),
            )));
        }
        if !config.suppressed_content_types.is_empty() {
            filters.push(Box::new(BodySuppression::new(
                config.suppressed_content_types.clone(),
            )));
        }
        if !config.obfuscate.body_patterns.is_empty() {
            filters.push(Box::new(BodyRedaction::new(
                &config.obfuscate.body_patterns,
                config.obfuscate.replacement.clone(),
            )?));
        }
        if config.merge_duplicate_headers {
            filters.push(Box::new(MergeDuplicateHeaders));
        }
        Ok(Self::new(filters))
    }

    pub fn push(&mut self, filter: Box<dyn ViewFilter>) {
        self.filters.push(filter);
    }

    pub fn request(&self, view: RequestView) -> RequestView {
        self.filters
            .iter()
            .fold(view, |view, filter| filter.apply_request(view))
    }

    pub fn response(&self, view: ResponseView) -> ResponseView {
        self.filters
            .iter()
            .fold(view, |view, filter| filter.apply_response(view))
    }
}
