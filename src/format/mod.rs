//! Rendering of filtered views into log entries.
//!
//! # Design Decisions
//! - One style enum dispatched through free functions, no formatter
//!   hierarchy
//! - Every style escapes embedded content so headers/bodies cannot corrupt
//!   the style's own delimiters
//! - Responses have no curl rendering and fall back to the http style

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::correlate::ExchangeId;
use crate::http::{RequestView, ResponseView};

mod curl;
mod http_style;
mod structured;

/// Output style for rendered entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatStyle {
    #[default]
    Http,
    Curl,
    Structured,
}

/// Where requests originate relative to this process: `Remote` for a
/// server-side engine (requests arrive from the peer), `Local` for a
/// client-side engine (requests leave this process).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    #[default]
    Remote,
}

impl Origin {
    pub fn request_label(self) -> &'static str {
        match self {
            Origin::Remote => "Incoming Request:",
            Origin::Local => "Outgoing Request:",
        }
    }

    pub fn response_label(self) -> &'static str {
        match self {
            Origin::Remote => "Outgoing Response:",
            Origin::Local => "Incoming Response:",
        }
    }

    fn request_origin(self) -> &'static str {
        match self {
            Origin::Remote => "remote",
            Origin::Local => "local",
        }
    }

    fn response_origin(self) -> &'static str {
        match self {
            Origin::Remote => "local",
            Origin::Local => "remote",
        }
    }
}

/// Render a request entry.
pub fn render_request(
    style: FormatStyle,
    origin: Origin,
    id: &ExchangeId,
    view: &RequestView,
) -> String {
    match style {
        FormatStyle::Http => http_style::request(origin, id, view),
        FormatStyle::Curl => curl::request(view),
        FormatStyle::Structured => structured::request(origin, id, view),
    }
}

/// Render a response entry.
pub fn render_response(
    style: FormatStyle,
    origin: Origin,
    id: &ExchangeId,
    duration: Duration,
    view: &ResponseView,
) -> String {
    match style {
        // curl cannot express a response; fall back to the http style
        FormatStyle::Http | FormatStyle::Curl => http_style::response(origin, id, view),
        FormatStyle::Structured => structured::response(origin, id, duration, view),
    }
}

/// Render the terminal record of an exchange that will never complete.
pub fn render_incomplete(
    style: FormatStyle,
    id: &ExchangeId,
    elapsed: Duration,
    reason: &str,
) -> String {
    match style {
        FormatStyle::Http | FormatStyle::Curl => format!(
            "Incomplete Exchange: {id} (after {} ms): {reason}",
            elapsed.as_millis()
        ),
        FormatStyle::Structured => structured::incomplete(id, elapsed, reason),
    }
}
