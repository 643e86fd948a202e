//! Bounded capture buffer and the handle that hands it off.
//!
//! # Responsibilities
//! - Accumulate observed bytes up to the configured limit
//! - Count every byte that streams through, captured or not
//! - Signal waiters once the stream is finished
//!
//! # Design Decisions
//! - One buffer per observer, never shared across exchanges
//! - Overflow truncates the capture, never the real stream
//! - A poisoned lock degrades the log entry, never the exchange

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use metrics::counter;
use tokio::sync::watch;

/// Bounded byte accumulator owned by one observer for one stream.
#[derive(Debug)]
pub struct CaptureBuffer {
    data: Vec<u8>,
    limit: usize,
    total: u64,
    truncated: bool,
}

impl CaptureBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
            total: 0,
            truncated: false,
        }
    }

    /// Append a chunk, keeping at most `limit` bytes. Bytes past the limit
    /// are counted but not stored.
    pub fn record(&mut self, chunk: &[u8]) {
        self.total += chunk.len() as u64;
        let room = self.limit.saturating_sub(self.data.len());
        if room < chunk.len() {
            self.truncated = true;
        }
        let keep = room.min(chunk.len());
        if keep > 0 {
            self.data.extend_from_slice(&chunk[..keep]);
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn total_len(&self) -> u64 {
        self.total
    }

    fn into_captured(self) -> CapturedBody {
        CapturedBody {
            bytes: Bytes::from(self.data),
            total_len: self.total,
            truncated: self.truncated,
        }
    }
}

/// The finished capture: what the observer saw of one body.
#[derive(Debug, Clone)]
pub struct CapturedBody {
    /// Captured prefix, at most the configured limit.
    pub bytes: Bytes,
    /// Every byte that streamed through, captured or not.
    pub total_len: u64,
    pub truncated: bool,
}

impl CapturedBody {
    pub fn empty() -> Self {
        Self {
            bytes: Bytes::new(),
            total_len: 0,
            truncated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_len == 0
    }
}

#[derive(Debug)]
enum CaptureState {
    Recording(CaptureBuffer),
    Done(CapturedBody),
}

#[derive(Debug)]
struct HandleInner {
    state: Mutex<CaptureState>,
    done: watch::Sender<bool>,
}

/// Shared handle over one stream's capture. The observer records into it
/// and finalizes it at end-of-stream; the correlator awaits `finished`.
///
/// Cloning shares the same underlying capture.
#[derive(Debug, Clone)]
pub struct CaptureHandle {
    inner: Arc<HandleInner>,
}

impl CaptureHandle {
    pub fn new(limit: usize) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            inner: Arc::new(HandleInner {
                state: Mutex::new(CaptureState::Recording(CaptureBuffer::new(limit))),
                done,
            }),
        }
    }

    /// A handle that is already finished with no body. Used for exchanges
    /// that carry no body stream at all.
    pub fn sealed() -> Self {
        let handle = Self::new(0);
        handle.finalize();
        handle
    }

    /// Record observed bytes. A no-op once finalized or if the buffer lock
    /// is poisoned; capture failures degrade the log, never the stream.
    pub fn record(&self, chunk: &[u8]) {
        let Ok(mut state) = self.inner.state.lock() else {
            return;
        };
        if let CaptureState::Recording(buffer) = &mut *state {
            buffer.record(chunk);
        }
    }

    /// Mark the stream finished and wake waiters. Idempotent.
    pub fn finalize(&self) {
        let Ok(mut state) = self.inner.state.lock() else {
            // Waiters still get released so nobody blocks on a broken capture.
            self.inner.done.send_replace(true);
            return;
        };
        if let CaptureState::Recording(buffer) = &mut *state {
            let buffer = std::mem::replace(buffer, CaptureBuffer::new(0));
            let captured = buffer.into_captured();
            if captured.truncated {
                counter!("wiretap_bodies_truncated_total").increment(1);
            }
            *state = CaptureState::Done(captured);
        }
        self.inner.done.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        *self.inner.done.borrow()
    }

    /// Wait until the stream is finished and return what was captured.
    pub async fn finished(&self) -> CapturedBody {
        let mut done = self.inner.done.subscribe();
        // wait_for checks the current value first, so a finalize that
        // happened before this call is not missed.
        let _ = done.wait_for(|finished| *finished).await;
        match self.inner.state.lock() {
            Ok(state) => match &*state {
                CaptureState::Done(captured) => captured.clone(),
                CaptureState::Recording(_) => CapturedBody::empty(),
            },
            Err(_) => CapturedBody::empty(),
        }
    }
}
