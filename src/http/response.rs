//! Response-side message model.

use http::response::Parts;
use http::{StatusCode, Version};

use crate::http::body::BodyRendering;
use crate::http::headers::HeaderMultimap;

/// The non-body half of a response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMultimap,
}

impl ResponseHead {
    pub fn new(status: StatusCode, version: Version, headers: HeaderMultimap) -> Self {
        Self {
            status,
            version,
            headers,
        }
    }

    /// Build from `http` response parts, as seen by a tower service.
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            status: parts.status,
            version: parts.version,
            headers: HeaderMultimap::from(&parts.headers),
        }
    }

    /// Build from a whole `http` response without consuming it.
    pub fn from_response<B>(response: &http::Response<B>) -> Self {
        Self {
            status: response.status(),
            version: response.version(),
            headers: HeaderMultimap::from(response.headers()),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.headers.get("content-encoding")
    }
}

/// Immutable response view, frozen once the response body finished
/// streaming to the real consumer.
#[derive(Debug, Clone)]
pub struct ResponseView {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMultimap,
    pub body: BodyRendering,
    /// Bytes that streamed through the observer, captured or not.
    pub raw_len: u64,
}

impl ResponseView {
    pub fn new(head: ResponseHead, body: BodyRendering, raw_len: u64) -> Self {
        Self {
            status: head.status,
            version: head.version,
            headers: head.headers,
            body,
            raw_len,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }
}
