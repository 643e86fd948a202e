//! Human-readable HTTP-like rendering.
//!
//! ```text
//! Incoming Request: 3cd86f52-7878-4d28-ab8b-cf6b8600c071
//! GET http://localhost/ HTTP/1.1
//! Accept: text/plain
//!
//! Hello, world!
//! ```

use crate::correlate::ExchangeId;
use crate::http::{HeaderMultimap, RequestView, ResponseView};
use crate::format::Origin;

pub(super) fn request(origin: Origin, id: &ExchangeId, view: &RequestView) -> String {
    let mut out = String::new();
    out.push_str(origin.request_label());
    out.push(' ');
    out.push_str(&id.to_string());
    out.push('\n');
    out.push_str(&format!(
        "{} {} {:?}",
        view.method, view.uri, view.version
    ));
    push_headers(&mut out, &view.headers);
    push_body(&mut out, view.body.display());
    out
}

pub(super) fn response(origin: Origin, id: &ExchangeId, view: &ResponseView) -> String {
    let mut out = String::new();
    out.push_str(origin.response_label());
    out.push(' ');
    out.push_str(&id.to_string());
    out.push('\n');
    out.push_str(&format!(
        "{:?} {} {}",
        view.version,
        view.status.as_u16(),
        view.status.canonical_reason().unwrap_or("")
    ));
    push_headers(&mut out, &view.headers);
    push_body(&mut out, view.body.display());
    out
}

fn push_headers(out: &mut String, headers: &HeaderMultimap) {
    for (name, value) in headers.iter() {
        out.push('\n');
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
    }
}

fn push_body(out: &mut String, body: Option<String>) {
    if let Some(body) = body {
        if !body.is_empty() {
            out.push_str("\n\n");
            out.push_str(&body);
        }
    }
}
