//! Content normalizer: decode captured bytes for display.
//!
//! Recognizes the standard compression content-codings and reverses them
//! for the rendered view only. Anything unrecognized, undecodable, or
//! non-UTF-8 falls back to an opaque binary marker instead of failing the
//! log entry. The raw captured bytes are never replaced.

use std::io::Read;

use bytes::Buf;
use flate2::read::{GzDecoder, ZlibDecoder};

use crate::capture::buffer::CapturedBody;
use crate::http::BodyRendering;

enum Encoding {
    Identity,
    Gzip,
    Deflate,
    Unknown,
}

fn parse_encoding(header: Option<&str>) -> Encoding {
    match header.map(str::trim) {
        None | Some("") | Some("identity") => Encoding::Identity,
        Some(value) if value.eq_ignore_ascii_case("gzip") => Encoding::Gzip,
        Some(value) if value.eq_ignore_ascii_case("x-gzip") => Encoding::Gzip,
        Some(value) if value.eq_ignore_ascii_case("deflate") => Encoding::Deflate,
        Some(_) => Encoding::Unknown,
    }
}

/// Build the display rendering for a finished capture.
pub fn build_rendering(captured: &CapturedBody, content_encoding: Option<&str>) -> BodyRendering {
    if captured.is_empty() {
        return BodyRendering::None;
    }

    let decoded = match parse_encoding(content_encoding) {
        Encoding::Identity => String::from_utf8(captured.bytes.to_vec()).ok(),
        Encoding::Gzip => {
            let mut decoder = GzDecoder::new(captured.bytes.clone().reader());
            let mut text = String::new();
            decoder.read_to_string(&mut text).ok().map(|_| text)
        }
        Encoding::Deflate => {
            let mut decoder = ZlibDecoder::new(captured.bytes.clone().reader());
            let mut text = String::new();
            decoder.read_to_string(&mut text).ok().map(|_| text)
        }
        Encoding::Unknown => None,
    };

    match decoded {
        Some(text) => BodyRendering::Text {
            text,
            truncated: captured.truncated,
        },
        None => BodyRendering::Binary {
            len: captured.total_len,
            truncated: captured.truncated,
        },
    }
}

/// Build the rendering for a view and normalize its headers: when a
/// declared compression coding was successfully reversed, the
/// Content-Encoding header no longer describes the displayed body and is
/// dropped from the view. The wire stream is unaffected.
pub fn normalize(headers: &mut crate::http::HeaderMultimap, captured: &CapturedBody) -> BodyRendering {
    let declared = headers.get("content-encoding").map(str::to_string);
    let rendering = build_rendering(captured, declared.as_deref());
    let reversed = declared
        .as_deref()
        .map(str::trim)
        .is_some_and(|e| !e.is_empty() && !e.eq_ignore_ascii_case("identity"));
    if reversed && matches!(rendering, BodyRendering::Text { .. }) {
        headers.remove("content-encoding");
    }
    rendering
}
