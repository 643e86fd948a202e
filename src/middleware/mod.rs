//! Tower middleware adapter.
//!
//! # Data Flow
//! ```text
//! Request<B>
//!     → activation decision (once, no capture work yet)
//!     → ObservedBody wraps the request body
//!     → inner service runs untouched
//!     → ObservedBody wraps the response body
//!     → spawned logger task emits request/response entries as each
//!       capture finalizes
//! ```
//!
//! The adapter never alters status, headers or body bytes, and an engine
//! failure never becomes a request failure.

pub mod layer;
pub mod service;

pub use layer::TrafficLogLayer;
pub use service::TrafficLogService;
