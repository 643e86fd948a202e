//! Exchange correlation.
//!
//! # State Transitions
//! ```text
//! begin → STARTED (Precorrelation minted, id + start instant recorded)
//! STARTED → COMPLETED (complete: request capture awaited, views joined)
//! STARTED → ABANDONED (abandon, or the Precorrelation is dropped)
//! ```
//!
//! # Design Decisions
//! - All per-exchange state lives inside the Precorrelation value, so
//!   concurrent exchanges need no shared locking
//! - `complete` and `abandon` consume the value: completing twice is a
//!   compile error, not a runtime check
//! - Dropping a Precorrelation that was never consumed reports an
//!   abandoned exchange instead of vanishing silently
//! - `complete` awaits the request capture before joining, making the
//!   correlator the rendezvous that orders request before response

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::counter;
use thiserror::Error;
use uuid::Uuid;

use crate::capture::{decode, CaptureHandle};
use crate::filter::FilterPipeline;
use crate::http::{RequestHead, RequestView, ResponseHead, ResponseView};
use crate::sink::Dispatcher;

/// Opaque exchange identifier, minted at request-start and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(Uuid);

impl ExchangeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("exchange was already completed or abandoned")]
    AlreadyConsumed,
    #[error("request view was not finalized before completion")]
    RequestNotFinal,
}

#[derive(Debug)]
struct PreInner {
    id: ExchangeId,
    start: Instant,
    head: Option<RequestHead>,
    capture: CaptureHandle,
    request_view: Option<RequestView>,
    request_written: bool,
}

/// The request half of an exchange, held until the response arrives.
///
/// Created by [`begin`]; consumed by [`Precorrelation::complete`] or
/// [`Precorrelation::abandon`]. Dropping it unconsumed reports an
/// abandoned exchange through the dispatcher.
#[derive(Debug)]
pub struct Precorrelation {
    inner: Option<PreInner>,
    dispatcher: Arc<Dispatcher>,
}

/// Mint a new exchange: unique id, start instant, STARTED state.
///
/// Safe to call concurrently for independent exchanges; nothing is shared
/// between the returned values.
pub fn begin(
    head: RequestHead,
    capture: CaptureHandle,
    dispatcher: Arc<Dispatcher>,
) -> Precorrelation {
    counter!("wiretap_exchanges_started_total").increment(1);
    Precorrelation {
        inner: Some(PreInner {
            id: ExchangeId::new(),
            start: Instant::now(),
            head: Some(head),
            capture,
            request_view: None,
            request_written: false,
        }),
        dispatcher,
    }
}

impl Precorrelation {
    pub fn id(&self) -> Option<ExchangeId> {
        self.inner.as_ref().map(|inner| inner.id)
    }

    pub fn start(&self) -> Option<Instant> {
        self.inner.as_ref().map(|inner| inner.start)
    }

    /// Wait for the request body capture to finish, then freeze and filter
    /// the request view. Idempotent.
    async fn finalize_request(&mut self, filters: &FilterPipeline) {
        let Some(inner) = self.inner.as_mut() else {
            return;
        };
        if inner.request_view.is_some() {
            return;
        }
        let captured = inner.capture.finished().await;
        let Some(mut head) = inner.head.take() else {
            return;
        };
        let rendering = decode::normalize(&mut head.headers, &captured);
        let view = RequestView::new(head, rendering, captured.total_len);
        inner.request_view = Some(filters.request(view));
    }

    /// Emit the request entry as soon as the request view is final.
    /// Exactly once per exchange; `complete` falls back to this when the
    /// adapter never called it.
    pub async fn write_request(&mut self, filters: &FilterPipeline) {
        self.finalize_request(filters).await;
        let dispatcher = self.dispatcher.clone();
        let Some(inner) = self.inner.as_mut() else {
            return;
        };
        if inner.request_written {
            return;
        }
        if let Some(view) = &inner.request_view {
            dispatcher.write_request(&inner.id, view);
            inner.request_written = true;
        }
    }

    /// Join with the response, producing the terminal Correlation.
    ///
    /// Awaits the request capture first, so the emitted record always
    /// orders request before response regardless of how the two bodies
    /// interleaved on the wire. Emits the response entry exactly once.
    pub async fn complete(
        mut self,
        response_head: ResponseHead,
        response_capture: CaptureHandle,
        filters: &FilterPipeline,
    ) -> Result<Correlation, CorrelationError> {
        self.write_request(filters).await;

        let captured = response_capture.finished().await;
        let mut inner = self.inner.take().ok_or(CorrelationError::AlreadyConsumed)?;
        let request = inner
            .request_view
            .take()
            .ok_or(CorrelationError::RequestNotFinal)?;

        let mut head = response_head;
        let rendering = decode::normalize(&mut head.headers, &captured);
        let view = ResponseView::new(head, rendering, captured.total_len);
        let response = filters.response(view);

        let duration = inner.start.elapsed();
        self.dispatcher.write_response(&inner.id, duration, &response);
        counter!("wiretap_exchanges_completed_total").increment(1);

        Ok(Correlation {
            id: inner.id,
            start: inner.start,
            duration,
            request,
            response,
        })
    }

    /// Terminal transition for an exchange that will never complete.
    /// Reported to the sinks as a distinct incomplete-exchange event.
    pub fn abandon(mut self, reason: &str) {
        if let Some(inner) = self.inner.take() {
            report_abandoned(&self.dispatcher, &inner, reason);
        }
    }
}

impl Drop for Precorrelation {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            report_abandoned(&self.dispatcher, &inner, "dropped");
        }
    }
}

fn report_abandoned(dispatcher: &Dispatcher, inner: &PreInner, reason: &str) {
    counter!("wiretap_exchanges_abandoned_total").increment(1);
    dispatcher.incomplete(&inner.id, inner.start.elapsed(), reason);
}

/// The fully joined record of one exchange. Terminal and immutable:
/// exactly one exists per exchange id.
#[derive(Debug, Clone)]
pub struct Correlation {
    pub id: ExchangeId,
    pub start: Instant,
    pub duration: Duration,
    pub request: RequestView,
    pub response: ResponseView,
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode, Uri, Version};

    use crate::format::{FormatStyle, Origin};
    use crate::http::HeaderMultimap;
    use crate::sink::{Activation, MemorySink};

    use super::*;

    fn dispatcher(sink: Arc<MemorySink>) -> Arc<Dispatcher> {
        Arc::new(Dispatcher::new(
            FormatStyle::Http,
            Origin::Remote,
            Activation::always(),
            vec![sink],
        ))
    }

    fn request_head() -> RequestHead {
        RequestHead::new(
            Method::GET,
            Uri::from_static("http://localhost/"),
            Version::HTTP_11,
            HeaderMultimap::new(),
        )
    }

    fn response_head() -> ResponseHead {
        ResponseHead::new(StatusCode::OK, Version::HTTP_11, HeaderMultimap::new())
    }

    #[tokio::test]
    async fn test_complete_joins_request_and_response() {
        let sink = Arc::new(MemorySink::new());
        let filters = FilterPipeline::default();
        let pre = begin(request_head(), CaptureHandle::sealed(), dispatcher(sink.clone()));
        let id = pre.id().unwrap();

        let correlation = pre
            .complete(response_head(), CaptureHandle::sealed(), &filters)
            .await
            .unwrap();

        assert_eq!(correlation.id, id);
        assert_eq!(correlation.request.method, Method::GET);
        assert_eq!(correlation.response.status, StatusCode::OK);
        assert_eq!(sink.requests().len(), 1);
        assert_eq!(sink.responses().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_waits_for_request_capture() {
        let sink = Arc::new(MemorySink::new());
        let capture = CaptureHandle::new(1024);
        let pre = begin(request_head(), capture.clone(), dispatcher(sink.clone()));

        // response is ready before the request body finished streaming
        let join = tokio::spawn(async move {
            let filters = FilterPipeline::default();
            pre.complete(response_head(), CaptureHandle::sealed(), &filters)
                .await
        });

        tokio::task::yield_now().await;
        assert!(sink.is_empty(), "nothing may be emitted before the request is final");

        capture.record(b"late upload");
        capture.finalize();

        let correlation = join.await.unwrap().unwrap();
        assert_eq!(correlation.request.raw_len, 11);
        // request entry was written before the response entry
        assert_eq!(sink.requests().len(), 1);
        assert_eq!(sink.responses().len(), 1);
    }

    #[tokio::test]
    async fn test_write_request_is_emitted_exactly_once() {
        let sink = Arc::new(MemorySink::new());
        let filters = FilterPipeline::default();
        let mut pre = begin(request_head(), CaptureHandle::sealed(), dispatcher(sink.clone()));

        pre.write_request(&filters).await;
        pre.write_request(&filters).await;
        let _ = pre
            .complete(response_head(), CaptureHandle::sealed(), &filters)
            .await
            .unwrap();

        assert_eq!(sink.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_abandon_reports_incomplete_exchange() {
        let sink = Arc::new(MemorySink::new());
        let pre = begin(request_head(), CaptureHandle::sealed(), dispatcher(sink.clone()));
        let id = pre.id().unwrap();

        pre.abandon("connection reset by peer");

        let incompletes = sink.incompletes();
        assert_eq!(incompletes.len(), 1);
        assert!(incompletes[0].contains("connection reset by peer"));
        assert!(incompletes[0].contains(&id.to_string()));
        assert!(sink.responses().is_empty());
    }

    #[tokio::test]
    async fn test_drop_without_completion_is_reported() {
        let sink = Arc::new(MemorySink::new());
        {
            let _pre = begin(request_head(), CaptureHandle::sealed(), dispatcher(sink.clone()));
        }

        let incompletes = sink.incompletes();
        assert_eq!(incompletes.len(), 1);
        assert!(incompletes[0].contains("dropped"));
    }

    #[tokio::test]
    async fn test_concurrent_exchanges_do_not_cross_talk() {
        let sink = Arc::new(MemorySink::new());
        let dispatcher = dispatcher(sink.clone());

        let mut tasks = Vec::new();
        for i in 0..8 {
            let dispatcher = dispatcher.clone();
            tasks.push(tokio::spawn(async move {
                let filters = FilterPipeline::default();
                let capture = CaptureHandle::new(1024);
                capture.record(format!("body-{i}").as_bytes());
                capture.finalize();
                let mut head = request_head();
                head.uri = format!("http://localhost/{i}").parse().unwrap();
                let pre = begin(head, capture, dispatcher);
                let id = pre.id().unwrap();
                let correlation = pre
                    .complete(response_head(), CaptureHandle::sealed(), &filters)
                    .await
                    .unwrap();
                assert_eq!(correlation.id, id);
                assert!(correlation
                    .request
                    .body
                    .display()
                    .unwrap()
                    .contains(&format!("body-{i}")));
                id
            }));
        }

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), 8, "exchange ids are never reused");
        assert_eq!(sink.requests().len(), 8);
        assert_eq!(sink.responses().len(), 8);
    }
}
