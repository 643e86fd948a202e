//! Tower layer installing the engine into a request pipeline.

use std::sync::Arc;

use tower::Layer;

use crate::engine::Wiretap;
use crate::middleware::service::TrafficLogService;

/// Wraps a service so every exchange flowing through it is logged by the
/// given engine.
#[derive(Debug, Clone)]
pub struct TrafficLogLayer {
    engine: Arc<Wiretap>,
}

impl TrafficLogLayer {
    pub fn new(engine: Wiretap) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Share one engine between several layers (e.g. client and server
    /// pipelines of the same process).
    pub fn from_shared(engine: Arc<Wiretap>) -> Self {
        Self { engine }
    }
}

impl<S> Layer<S> for TrafficLogLayer {
    type Service = TrafficLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TrafficLogService::new(inner, self.engine.clone())
    }
}
