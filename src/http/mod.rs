//! HTTP message model.
//!
//! # Data Flow
//! ```text
//! adapter supplies RequestHead / ResponseHead + body stream
//!     → capture observes the body (capture module)
//!     → RequestView / ResponseView frozen once the body is final
//!     → filter pipeline transforms the view
//!     → formatter renders it
//! ```
//!
//! # Design Decisions
//! - Heads reuse the `http` crate's Method/StatusCode/Uri/Version types
//! - Headers are an ordered multimap preserving wire casing and order
//! - Views are immutable snapshots; filters produce new views

pub mod body;
pub mod headers;
pub mod request;
pub mod response;

pub use body::BodyRendering;
pub use headers::HeaderMultimap;
pub use request::{RequestHead, RequestView};
pub use response::{ResponseHead, ResponseView};
