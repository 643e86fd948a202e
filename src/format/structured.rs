//! Machine-readable single-line JSON rendering.
//!
//! JSON escaping makes the style corruption-safe by construction; no body
//! or header content can break the record's delimiters.

use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::correlate::ExchangeId;
use crate::format::Origin;
use crate::http::{HeaderMultimap, RequestView, ResponseView};

pub(super) fn request(origin: Origin, id: &ExchangeId, view: &RequestView) -> String {
    json!({
        "origin": origin.request_origin(),
        "type": "request",
        "correlation": id.to_string(),
        "protocol": format!("{:?}", view.version),
        "method": view.method.as_str(),
        "uri": view.uri.to_string(),
        "headers": header_map(&view.headers),
        "body": view.body.display(),
    })
    .to_string()
}

pub(super) fn response(
    origin: Origin,
    id: &ExchangeId,
    duration: Duration,
    view: &ResponseView,
) -> String {
    json!({
        "origin": origin.response_origin(),
        "type": "response",
        "correlation": id.to_string(),
        "duration": duration.as_millis() as u64,
        "protocol": format!("{:?}", view.version),
        "status": view.status.as_u16(),
        "headers": header_map(&view.headers),
        "body": view.body.display(),
    })
    .to_string()
}

pub(super) fn incomplete(id: &ExchangeId, elapsed: Duration, reason: &str) -> String {
    json!({
        "type": "abandoned",
        "correlation": id.to_string(),
        "duration": elapsed.as_millis() as u64,
        "reason": reason,
    })
    .to_string()
}

fn header_map(headers: &HeaderMultimap) -> Value {
    let mut map = Map::new();
    for (name, value) in headers.iter() {
        match map.get_mut(name) {
            Some(Value::Array(values)) => values.push(Value::String(value.to_string())),
            _ => {
                map.insert(name.to_string(), json!([value]));
            }
        }
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode, Uri, Version};

    use crate::http::BodyRendering;

    use super::*;

    #[test]
    fn test_request_record_parses_and_round_trips() {
        let mut headers = HeaderMultimap::new();
        headers.push("Accept", "text/plain");
        headers.push("Accept", "text/html");
        let view = RequestView {
            method: Method::POST,
            uri: Uri::from_static("http://localhost/items"),
            version: Version::HTTP_11,
            headers,
            body: BodyRendering::Text {
                text: "a\"b\nc".into(),
                truncated: false,
            },
            raw_len: 5,
        };
        let id = ExchangeId::new();

        let entry = request(Origin::Remote, &id, &view);
        let parsed: Value = serde_json::from_str(&entry).unwrap();

        assert_eq!(parsed["type"], "request");
        assert_eq!(parsed["origin"], "remote");
        assert_eq!(parsed["method"], "POST");
        assert_eq!(parsed["uri"], "http://localhost/items");
        assert_eq!(parsed["headers"]["Accept"][1], "text/html");
        // embedded quotes and newlines survived the trip
        assert_eq!(parsed["body"], "a\"b\nc");
    }

    #[test]
    fn test_response_record_has_status_and_duration() {
        let view = ResponseView {
            status: StatusCode::NOT_FOUND,
            version: Version::HTTP_2,
            headers: HeaderMultimap::new(),
            body: BodyRendering::None,
            raw_len: 0,
        };
        let id = ExchangeId::new();

        let entry = response(Origin::Remote, &id, Duration::from_millis(42), &view);
        let parsed: Value = serde_json::from_str(&entry).unwrap();

        assert_eq!(parsed["type"], "response");
        assert_eq!(parsed["origin"], "local");
        assert_eq!(parsed["status"], 404);
        assert_eq!(parsed["duration"], 42);
        assert_eq!(parsed["body"], Value::Null);
    }
}
