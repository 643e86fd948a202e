//! Engine facade.
//!
//! # Responsibilities
//! - Own the immutable configuration snapshot
//! - Wire filters, formatter style and sink dispatcher together
//! - Expose the exchange lifecycle: activation check, begin, request
//!   emission, complete, abandon
//!
//! # Design Decisions
//! - No global state: independently configured engines coexist in one
//!   process
//! - The engine owns no scheduler and no timers; it runs on whatever
//!   task/thread the host pipeline calls it from

use std::sync::Arc;

use tracing::Level;

use crate::capture::{CaptureHandle, ObservedBody};
use crate::config::{validate_config, ConfigError, LogConfig};
use crate::correlate::{self, Correlation, CorrelationError, Precorrelation};
use crate::filter::FilterPipeline;
use crate::http::{RequestHead, ResponseHead};
use crate::sink::{Activation, Dispatcher, TracingSink, WriteSink};

/// The traffic logging engine: one immutable configuration snapshot plus
/// the filter/format/sink machinery built from it.
#[derive(Debug)]
pub struct Wiretap {
    config: LogConfig,
    filters: FilterPipeline,
    dispatcher: Arc<Dispatcher>,
}

impl Wiretap {
    /// Build an engine writing through the default tracing-backed sink.
    pub fn new(config: LogConfig) -> Result<Self, ConfigError> {
        let level = config.sink.level.parse().unwrap_or(Level::DEBUG);
        let sinks: Vec<Arc<dyn WriteSink>> = vec![Arc::new(TracingSink::new(level))];
        Self::build(config, sinks, None)
    }

    /// Build an engine writing to the given sinks.
    pub fn with_sinks(config: LogConfig, sinks: Vec<Arc<dyn WriteSink>>) -> Result<Self, ConfigError> {
        Self::build(config, sinks, None)
    }

    /// Build an engine with a host-supplied activation predicate, which
    /// replaces the config-derived one.
    pub fn with_activation(
        config: LogConfig,
        sinks: Vec<Arc<dyn WriteSink>>,
        activation: Activation,
    ) -> Result<Self, ConfigError> {
        Self::build(config, sinks, Some(activation))
    }

    fn build(
        config: LogConfig,
        sinks: Vec<Arc<dyn WriteSink>>,
        activation: Option<Activation>,
    ) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let filters = FilterPipeline::from_config(&config)?;
        let activation =
            activation.unwrap_or_else(|| Activation::from_config(&config.activation));
        let dispatcher = Arc::new(Dispatcher::new(
            config.style,
            config.origin,
            activation,
            sinks,
        ));
        tracing::debug!(style = ?config.style, origin = ?config.origin, "engine built");
        Ok(Self {
            config,
            filters,
            dispatcher,
        })
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn body_capture_limit(&self) -> usize {
        self.config.body_capture_limit
    }

    /// The activation decision: evaluated once per exchange, before any
    /// capture work. When this returns false the engine does nothing
    /// further for the exchange.
    pub fn is_active(&self, head: &RequestHead) -> bool {
        self.dispatcher.is_active(head)
    }

    /// Wrap a body for observation under this engine's capture limit.
    pub fn observe_body<B>(&self, body: B) -> (ObservedBody<B>, CaptureHandle) {
        let handle = CaptureHandle::new(self.config.body_capture_limit);
        (ObservedBody::new(body, handle.clone()), handle)
    }

    /// Start an exchange. The returned value owns all per-exchange state.
    pub fn begin(&self, head: RequestHead, capture: CaptureHandle) -> Precorrelation {
        correlate::begin(head, capture, self.dispatcher.clone())
    }

    /// Emit the request entry once the request body capture is final.
    /// Safe to call while the response is still outstanding; idempotent.
    pub async fn write_request(&self, pre: &mut Precorrelation) {
        pre.write_request(&self.filters).await;
    }

    /// Join the exchange with its response and emit the response entry.
    pub async fn complete(
        &self,
        pre: Precorrelation,
        head: ResponseHead,
        capture: CaptureHandle,
    ) -> Result<Correlation, CorrelationError> {
        pre.complete(head, capture, &self.filters).await
    }

    /// Terminal transition for an exchange that will never complete.
    pub fn abandon(&self, pre: Precorrelation, reason: &str) {
        pre.abandon(reason);
    }
}
