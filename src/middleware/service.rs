//! Service wrapper observing one exchange per call.
//!
//! # Responsibilities
//! - Evaluate the activation decision once, before any capture work
//! - Wrap request and response bodies in observing decorators
//! - Drive the exchange lifecycle off the request path
//!
//! # Design Decisions
//! - Inactive exchanges are forwarded with passthrough wrappers: no
//!   buffer, no copying
//! - Completion runs in a spawned task so a slow response body never
//!   blocks the service, and the request entry can be emitted while the
//!   response is still outstanding
//! - A dropped call future (client disconnect) abandons the exchange
//!   instead of leaking it

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use http::{Request, Response};
use tokio::sync::oneshot;
use tower::Service;

use crate::capture::{CaptureHandle, ObservedBody};
use crate::engine::Wiretap;
use crate::http::{RequestHead, ResponseHead};

enum Outcome {
    Response(ResponseHead, CaptureHandle),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TrafficLogService<S> {
    inner: S,
    engine: Arc<Wiretap>,
}

impl<S> TrafficLogService<S> {
    pub fn new(inner: S, engine: Arc<Wiretap>) -> Self {
        Self { inner, engine }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for TrafficLogService<S>
where
    S: Service<Request<ObservedBody<ReqBody>>, Response = Response<ResBody>>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
    S::Error: fmt::Display,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ObservedBody<ResBody>>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let engine = self.engine.clone();
        // the clone is the one stored back; the original was readied
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let head = RequestHead::from_request(&request);
            if !engine.is_active(&head) {
                let request = request.map(ObservedBody::passthrough);
                let response = inner.call(request).await?;
                return Ok(response.map(ObservedBody::passthrough));
            }

            let (parts, body) = request.into_parts();
            let (body, request_capture) = engine.observe_body(body);
            let request = Request::from_parts(parts, body);

            let mut pre = engine.begin(head, request_capture);
            let (outcome_tx, outcome_rx) = oneshot::channel::<Outcome>();

            let logger = engine.clone();
            tokio::spawn(async move {
                // fires as soon as the request body is final, which may be
                // well before the response exists
                logger.write_request(&mut pre).await;
                match outcome_rx.await {
                    Ok(Outcome::Response(head, capture)) => {
                        if let Err(error) = logger.complete(pre, head, capture).await {
                            tracing::debug!(error = %error, "exchange completion failed");
                        }
                    }
                    Ok(Outcome::Failed(reason)) => pre.abandon(&reason),
                    Err(_) => pre.abandon("exchange aborted"),
                }
            });

            match inner.call(request).await {
                Ok(response) => {
                    let head = ResponseHead::from_response(&response);
                    let (parts, body) = response.into_parts();
                    let (body, capture) = engine.observe_body(body);
                    let _ = outcome_tx.send(Outcome::Response(head, capture));
                    Ok(Response::from_parts(parts, body))
                }
                Err(error) => {
                    let _ = outcome_tx.send(Outcome::Failed(error.to_string()));
                    Err(error)
                }
            }
        })
    }
}
