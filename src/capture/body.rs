//! Observing `http_body::Body` decorator.
//!
//! # Responsibilities
//! - Tee every DATA frame into the capture handle
//! - Finalize the handle at end-of-stream, on error, and on drop
//! - Stay invisible: frames, trailers, end-of-stream and errors reach the
//!   real consumer exactly as the inner body produced them

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use pin_project::{pin_project, pinned_drop};

use crate::capture::buffer::CaptureHandle;

/// Decorator over any `http_body::Body` that duplicates data frames into a
/// [`CaptureHandle`] while passing them through untouched.
///
/// Built with [`ObservedBody::passthrough`] the decorator carries no handle
/// and does no capture work at all, so inactive exchanges pay nothing.
#[pin_project(PinnedDrop)]
pub struct ObservedBody<B> {
    #[pin]
    inner: B,
    handle: Option<CaptureHandle>,
}

impl<B> ObservedBody<B> {
    pub fn new(inner: B, handle: CaptureHandle) -> Self {
        Self {
            inner,
            handle: Some(handle),
        }
    }

    /// Wrap without observing. No buffer is allocated and nothing is copied.
    pub fn passthrough(inner: B) -> Self {
        Self {
            inner,
            handle: None,
        }
    }
}

impl<B> Body for ObservedBody<B>
where
    B: Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        match ready!(this.inner.poll_frame(cx)) {
            Some(Ok(frame)) => {
                if let Some(handle) = this.handle {
                    if let Some(data) = frame.data_ref() {
                        handle.record(data);
                    }
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Some(Err(err)) => {
                if let Some(handle) = this.handle {
                    handle.finalize();
                }
                Poll::Ready(Some(Err(err)))
            }
            None => {
                if let Some(handle) = this.handle {
                    handle.finalize();
                }
                Poll::Ready(None)
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

#[pinned_drop]
impl<B> PinnedDrop for ObservedBody<B> {
    fn drop(self: Pin<&mut Self>) {
        // A body dropped mid-stream (consumer gave up, connection reset)
        // still resolves its capture so no waiter blocks forever.
        if let Some(handle) = &self.handle {
            handle.finalize();
        }
    }
}
