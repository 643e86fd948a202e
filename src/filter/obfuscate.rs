//! Built-in view transformations.

use regex::Regex;

use crate::config::ConfigError;
use crate::filter::ViewFilter;
use crate::http::{BodyRendering, HeaderMultimap, RequestView, ResponseView};

/// Replace the values of configured headers with a fixed placeholder.
/// Matching is case-insensitive; entry casing and position are preserved.
#[derive(Debug)]
pub struct HeaderRedaction {
    names: Vec<String>,
    replacement: String,
}

impl HeaderRedaction {
    pub fn new(names: Vec<String>, replacement: String) -> Self {
        Self { names, replacement }
    }

    fn apply(&self, headers: &mut HeaderMultimap) {
        for name in &self.names {
            if headers.contains(name) {
                headers.replace_values(name, &self.replacement);
            }
        }
    }
}

impl ViewFilter for HeaderRedaction {
    fn apply_request(&self, mut view: RequestView) -> RequestView {
        self.apply(&mut view.headers);
        view
    }

    fn apply_response(&self, mut view: ResponseView) -> ResponseView {
        self.apply(&mut view.headers);
        view
    }
}

/// Replace the body with a marker for configured content types. Prefix
/// matching, so `multipart/` covers every multipart subtype.
#[derive(Debug)]
pub struct BodySuppression {
    content_types: Vec<String>,
}

impl BodySuppression {
    pub fn new(content_types: Vec<String>) -> Self {
        Self { content_types }
    }

    fn suppresses(&self, content_type: Option<&str>) -> bool {
        let Some(content_type) = content_type else {
            return false;
        };
        self.content_types
            .iter()
            .any(|prefix| content_type.starts_with(prefix.as_str()))
    }

    fn replace(&self, body: BodyRendering, content_type: Option<&str>) -> BodyRendering {
        if body.is_none() || matches!(body, BodyRendering::Suppressed { .. }) {
            return body;
        }
        if self.suppresses(content_type) {
            BodyRendering::Suppressed {
                content_type: content_type.unwrap_or_default().to_string(),
            }
        } else {
            body
        }
    }
}

impl ViewFilter for BodySuppression {
    fn apply_request(&self, mut view: RequestView) -> RequestView {
        let content_type = view.content_type().map(str::to_string);
        view.body = self.replace(view.body, content_type.as_deref());
        view
    }

    fn apply_response(&self, mut view: ResponseView) -> ResponseView {
        let content_type = view.content_type().map(str::to_string);
        view.body = self.replace(view.body, content_type.as_deref());
        view
    }
}

/// Mask substrings of textual bodies matching configured patterns.
#[derive(Debug)]
pub struct BodyRedaction {
    patterns: Vec<Regex>,
    replacement: String,
}

impl BodyRedaction {
    pub fn new(patterns: &[String], replacement: String) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ConfigError::Pattern)?;
        Ok(Self {
            patterns,
            replacement,
        })
    }

    fn mask(&self, body: BodyRendering) -> BodyRendering {
        match body {
            BodyRendering::Text { text, truncated } => {
                let mut masked = text;
                for pattern in &self.patterns {
                    masked = pattern
                        .replace_all(&masked, self.replacement.as_str())
                        .into_owned();
                }
                BodyRendering::Text {
                    text: masked,
                    truncated,
                }
            }
            other => other,
        }
    }
}

impl ViewFilter for BodyRedaction {
    fn apply_request(&self, mut view: RequestView) -> RequestView {
        view.body = self.mask(view.body);
        view
    }

    fn apply_response(&self, mut view: ResponseView) -> ResponseView {
        view.body = self.mask(view.body);
        view
    }
}

/// Collapse repeated header names into one comma-joined entry.
#[derive(Debug)]
pub struct MergeDuplicateHeaders;

impl ViewFilter for MergeDuplicateHeaders {
    fn apply_request(&self, mut view: RequestView) -> RequestView {
        view.headers.merge_duplicates();
        view
    }

    fn apply_response(&self, mut view: ResponseView) -> ResponseView {
        view.headers.merge_duplicates();
        view
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, Uri, Version};

    use super::*;

    fn view_with(headers: HeaderMultimap, body: BodyRendering) -> RequestView {
        RequestView {
            method: Method::POST,
            uri: Uri::from_static("http://localhost/"),
            version: Version::HTTP_11,
            headers,
            body,
            raw_len: 0,
        }
    }

    #[test]
    fn test_header_redaction_preserves_casing() {
        let mut headers = HeaderMultimap::new();
        headers.push("Authorization", "Bearer secret");
        let filter = HeaderRedaction::new(vec!["authorization".into()], "XXX".into());

        let view = filter.apply_request(view_with(headers, BodyRendering::None));

        let entries: Vec<(&str, &str)> = view.headers.iter().collect();
        assert_eq!(entries, vec![("Authorization", "XXX")]);
    }

    #[test]
    fn test_suppression_matches_content_type_prefix() {
        let mut headers = HeaderMultimap::new();
        headers.push("Content-Type", "multipart/form-data; boundary=x");
        let filter = BodySuppression::new(vec!["multipart/".into()]);

        let view = filter.apply_request(view_with(
            headers,
            BodyRendering::Text {
                text: "raw upload".into(),
                truncated: false,
            },
        ));

        assert!(matches!(view.body, BodyRendering::Suppressed { .. }));
    }

    #[test]
    fn test_body_redaction_masks_matches() {
        let filter = BodyRedaction::new(
            &["\"password\":\\s*\"[^\"]*\"".to_string()],
            "\"password\":\"XXX\"".into(),
        )
        .unwrap();

        let view = filter.apply_request(view_with(
            HeaderMultimap::new(),
            BodyRendering::Text {
                text: "{\"user\":\"jo\",\"password\":\"hunter2\"}".into(),
                truncated: false,
            },
        ));

        assert_eq!(
            view.body,
            BodyRendering::Text {
                text: "{\"user\":\"jo\",\"password\":\"XXX\"}".into(),
                truncated: false,
            }
        );
    }

    #[test]
    fn test_filters_are_fixed_points() {
        let redact = HeaderRedaction::new(vec!["authorization".into()], "XXX".into());
        let suppress = BodySuppression::new(vec!["application/octet-stream".into()]);
        let mask = BodyRedaction::new(
            &["\"token\":\\s*\"[^\"]*\"".to_string()],
            "\"token\":\"XXX\"".into(),
        )
        .unwrap();

        let mut headers = HeaderMultimap::new();
        headers.push("Authorization", "Bearer abc");
        headers.push("Content-Type", "application/json");
        let view = view_with(
            headers,
            BodyRendering::Text {
                text: "{\"token\":\"abc\"}".into(),
                truncated: false,
            },
        );

        let once = mask.apply_request(suppress.apply_request(redact.apply_request(view)));
        let twice = mask.apply_request(suppress.apply_request(redact.apply_request(once.clone())));

        assert_eq!(once.headers, twice.headers);
        assert_eq!(once.body, twice.body);
    }
}
