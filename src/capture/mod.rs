//! Non-destructive body capture.
//!
//! # Data Flow
//! ```text
//! body stream (http_body::Body or AsyncRead/AsyncWrite)
//!     → ObservedBody / ObservedReader / ObservedWriter (tee, bounded)
//!     → CaptureHandle resolves at end-of-stream
//!     → decode.rs derives the display rendering
//! ```
//!
//! # Design Decisions
//! - Capture is purely observational: the passthrough stream is
//!   byte-identical with logging on or off
//! - Buffers are bounded; overflow truncates the capture and marks the view
//! - Capture failures degrade the log entry, never the exchange

pub mod body;
pub mod buffer;
pub mod decode;
pub mod observer;

pub use body::ObservedBody;
pub use buffer::{CaptureBuffer, CaptureHandle, CapturedBody};
pub use observer::{observe_reader, observe_writer, ObservedReader, ObservedWriter};
