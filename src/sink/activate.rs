//! Activation decision: the cheap go/no-go check per exchange.
//!
//! Evaluated once, before any capture work. An inactive exchange allocates
//! no buffer and copies nothing.

use std::fmt;
use std::sync::Arc;

use crate::config::ActivationConfig;
use crate::http::RequestHead;

type PredicateFn = dyn Fn(&RequestHead) -> bool + Send + Sync;

enum Mode {
    All,
    Never,
    Sample(f64),
    Custom(Arc<PredicateFn>),
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::All => write!(f, "All"),
            Mode::Never => write!(f, "Never"),
            Mode::Sample(rate) => write!(f, "Sample({rate})"),
            Mode::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Activation predicate with path/method exclusions layered on top of the
/// base mode.
#[derive(Debug)]
pub struct Activation {
    mode: Mode,
    exclude_paths: Vec<String>,
    exclude_methods: Vec<String>,
}

impl Activation {
    pub fn always() -> Self {
        Self::with_mode(Mode::All)
    }

    pub fn never() -> Self {
        Self::with_mode(Mode::Never)
    }

    /// Log a random fraction of exchanges; `rate` is clamped to [0, 1].
    pub fn sample(rate: f64) -> Self {
        Self::with_mode(Mode::Sample(rate.clamp(0.0, 1.0)))
    }

    /// Host-supplied predicate.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&RequestHead) -> bool + Send + Sync + 'static,
    {
        Self::with_mode(Mode::Custom(Arc::new(predicate)))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            exclude_paths: Vec::new(),
            exclude_methods: Vec::new(),
        }
    }

    pub fn from_config(config: &ActivationConfig) -> Self {
        let mode = match config.mode {
            crate::config::ActivationMode::All => Mode::All,
            crate::config::ActivationMode::None => Mode::Never,
            crate::config::ActivationMode::Sample => Mode::Sample(config.sample_rate.clamp(0.0, 1.0)),
        };
        Self {
            mode,
            exclude_paths: config.exclude_paths.clone(),
            exclude_methods: config
                .exclude_methods
                .iter()
                .map(|m| m.to_uppercase())
                .collect(),
        }
    }

    /// Skip exchanges whose path starts with any of the given prefixes.
    pub fn exclude_paths(mut self, prefixes: Vec<String>) -> Self {
        self.exclude_paths = prefixes;
        self
    }

    /// Skip exchanges with any of the given methods.
    pub fn exclude_methods(mut self, methods: Vec<String>) -> Self {
        self.exclude_methods = methods.into_iter().map(|m| m.to_uppercase()).collect();
        self
    }

    pub fn is_active(&self, head: &RequestHead) -> bool {
        let path = head.uri.path();
        if self.exclude_paths.iter().any(|p| path.starts_with(p.as_str())) {
            return false;
        }
        if self
            .exclude_methods
            .iter()
            .any(|m| m == head.method.as_str())
        {
            return false;
        }
        match &self.mode {
            Mode::All => true,
            Mode::Never => false,
            Mode::Sample(rate) => fastrand::f64() < *rate,
            Mode::Custom(predicate) => predicate(head),
        }
    }
}

impl Default for Activation {
    fn default() -> Self {
        Self::always()
    }
}
