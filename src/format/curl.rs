//! Single-line curl-command reconstruction of a request.
//!
//! # Design Decisions
//! - POSIX single-quote escaping: every embedded `'` becomes `'\''`, so a
//!   hostile header or body cannot break out of the command
//! - Relative targets are made absolute with the Host header when possible

use url::Url;

use crate::http::RequestView;

pub(super) fn request(view: &RequestView) -> String {
    let mut out = format!("curl -v -X {} {}", view.method, quote(&absolute_url(view)));
    for (name, value) in view.headers.iter() {
        out.push_str(" -H ");
        out.push_str(&quote(&format!("{name}: {value}")));
    }
    if let Some(body) = view.body.display() {
        if !body.is_empty() {
            out.push_str(" -d ");
            out.push_str(&quote(&body));
        }
    }
    out
}

/// Reconstruct an absolute URL for the request target.
fn absolute_url(view: &RequestView) -> String {
    if view.uri.scheme().is_some() {
        return view.uri.to_string();
    }
    if let Some(host) = view.headers.get("host") {
        let candidate = format!("http://{host}{}", view.uri);
        if let Ok(url) = Url::parse(&candidate) {
            return url.to_string();
        }
    }
    view.uri.to_string()
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
