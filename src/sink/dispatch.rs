//! Fan-out of rendered entries to the configured sinks.
//!
//! # Responsibilities
//! - Evaluate the activation decision (cheap, no I/O)
//! - Render through the configured style and deliver to every sink
//! - Isolate sink failures: one failing sink never blocks the others and
//!   never reaches the request/response path

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;

use crate::correlate::ExchangeId;
use crate::format::{self, FormatStyle, Origin};
use crate::http::{RequestHead, RequestView, ResponseView};
use crate::sink::{Activation, SinkError, WriteSink};

#[derive(Debug)]
pub struct Dispatcher {
    style: FormatStyle,
    origin: Origin,
    activation: Activation,
    sinks: Vec<Arc<dyn WriteSink>>,
}

impl Dispatcher {
    pub fn new(
        style: FormatStyle,
        origin: Origin,
        activation: Activation,
        sinks: Vec<Arc<dyn WriteSink>>,
    ) -> Self {
        Self {
            style,
            origin,
            activation,
            sinks,
        }
    }

    pub fn is_active(&self, head: &RequestHead) -> bool {
        self.activation.is_active(head)
    }

    /// Deliver the request entry. Called exactly once per active exchange,
    /// as soon as the request view is final.
    pub fn write_request(&self, id: &ExchangeId, view: &RequestView) {
        let entry = format::render_request(self.style, self.origin, id, view);
        self.fan_out("request", &entry, |sink, entry| sink.write_request(entry));
    }

    /// Deliver the response entry. Called exactly once per completed
    /// exchange.
    pub fn write_response(&self, id: &ExchangeId, duration: Duration, view: &ResponseView) {
        let entry = format::render_response(self.style, self.origin, id, duration, view);
        self.fan_out("response", &entry, |sink, entry| sink.write_response(entry));
    }

    /// Deliver the terminal record of an exchange that will never complete.
    pub fn incomplete(&self, id: &ExchangeId, elapsed: Duration, reason: &str) {
        let entry = format::render_incomplete(self.style, id, elapsed, reason);
        self.fan_out("incomplete", &entry, |sink, entry| {
            sink.write_incomplete(entry)
        });
    }

    fn fan_out<F>(&self, kind: &'static str, entry: &str, write: F)
    where
        F: Fn(&dyn WriteSink, &str) -> Result<(), SinkError>,
    {
        for sink in &self.sinks {
            if let Err(error) = write(sink.as_ref(), entry) {
                counter!("wiretap_sink_failures_total", "kind" => kind).increment(1);
                tracing::warn!(kind, error = %error, "write sink failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode, Uri, Version};

    use crate::http::{BodyRendering, HeaderMultimap};
    use crate::sink::MemorySink;

    use super::*;

    #[derive(Debug)]
    struct FailingSink;

    impl WriteSink for FailingSink {
        fn write_request(&self, _entry: &str) -> Result<(), SinkError> {
            Err(SinkError::Rejected("down".into()))
        }

        fn write_response(&self, _entry: &str) -> Result<(), SinkError> {
            Err(SinkError::Rejected("down".into()))
        }
    }

    fn request_view() -> RequestView {
        RequestView {
            method: Method::GET,
            uri: Uri::from_static("http://localhost/"),
            version: Version::HTTP_11,
            headers: HeaderMultimap::new(),
            body: BodyRendering::None,
            raw_len: 0,
        }
    }

    fn response_view() -> ResponseView {
        ResponseView {
            status: StatusCode::OK,
            version: Version::HTTP_11,
            headers: HeaderMultimap::new(),
            body: BodyRendering::None,
            raw_len: 0,
        }
    }

    #[test]
    fn test_failing_sink_does_not_block_others() {
        let memory = Arc::new(MemorySink::new());
        let dispatcher = Dispatcher::new(
            FormatStyle::Http,
            Origin::Remote,
            Activation::always(),
            vec![Arc::new(FailingSink), memory.clone()],
        );
        let id = ExchangeId::new();

        dispatcher.write_request(&id, &request_view());
        dispatcher.write_response(&id, Duration::from_millis(1), &response_view());

        assert_eq!(memory.requests().len(), 1);
        assert_eq!(memory.responses().len(), 1);
    }

    #[test]
    fn test_incomplete_entry_reaches_sinks() {
        let memory = Arc::new(MemorySink::new());
        let dispatcher = Dispatcher::new(
            FormatStyle::Http,
            Origin::Remote,
            Activation::always(),
            vec![memory.clone()],
        );
        let id = ExchangeId::new();

        dispatcher.incomplete(&id, Duration::from_millis(3), "connection reset");

        let incompletes = memory.incompletes();
        assert_eq!(incompletes.len(), 1);
        assert!(incompletes[0].contains("connection reset"));
        assert!(incompletes[0].contains(&id.to_string()));
    }
}
