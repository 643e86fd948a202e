//! Request-side message model.
//!
//! # Responsibilities
//! - Carry the non-body half of a request as supplied by the adapter
//! - Build the immutable request view once the body capture is final

use http::request::Parts;
use http::{Method, Uri, Version};

use crate::http::body::BodyRendering;
use crate::http::headers::HeaderMultimap;

/// The non-body half of a request, handed in by the framework adapter
/// before any capture work happens.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMultimap,
}

impl RequestHead {
    pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMultimap) -> Self {
        Self {
            method,
            uri,
            version,
            headers,
        }
    }

    /// Build from `http` request parts, as seen by a tower service.
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            version: parts.version,
            headers: HeaderMultimap::from(&parts.headers),
        }
    }

    /// Build from a whole `http` request without consuming it.
    pub fn from_request<B>(request: &http::Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            version: request.version(),
            headers: HeaderMultimap::from(request.headers()),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.headers.get("content-encoding")
    }
}

/// Immutable request view: head plus the rendered body, frozen at the
/// moment the request body finished streaming.
#[derive(Debug, Clone)]
pub struct RequestView {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMultimap,
    pub body: BodyRendering,
    /// Bytes that streamed through the observer, captured or not.
    pub raw_len: u64,
}

impl RequestView {
    pub fn new(head: RequestHead, body: BodyRendering, raw_len: u64) -> Self {
        Self {
            method: head.method,
            uri: head.uri,
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
