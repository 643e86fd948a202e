//! Body rendering for logged views.
//!
//! The rendering is derived from the capture buffer for display only; the
//! raw bytes delivered to the real consumer are never touched.

/// How a captured body appears in the rendered log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyRendering {
    /// No body was observed.
    None,
    /// Decoded text, possibly a truncated prefix of the full body.
    Text { text: String, truncated: bool },
    /// Undecodable content; `len` counts every byte that streamed through.
    Binary { len: u64, truncated: bool },
    /// Replaced by a filter because of its content type.
    Suppressed { content_type: String },
}

impl BodyRendering {
    /// Display form, or `None` when there is nothing to show.
    pub fn display(&self) -> Option<String> {
        match self {
            BodyRendering::None => None,
            BodyRendering::Text { text, truncated } => Some(if *truncated {
                format!("{text}…")
            } else {
                text.clone()
            }),
            BodyRendering::Binary { len, truncated } => Some(if *truncated {
                format!("<binary body, {len} bytes (capture truncated)>")
            } else {
                format!("<binary body, {len} bytes>")
            }),
            BodyRendering::Suppressed { content_type } => {
                Some(format!("<body suppressed: {content_type}>"))
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, BodyRendering::None)
    }

    pub fn is_truncated(&self) -> bool {
        matches!(
            self,
            BodyRendering::Text { truncated: true, .. } | BodyRendering::Binary { truncated: true, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_text_is_marked() {
        let body = BodyRendering::Text {
            text: "Hello".into(),
            truncated: true,
        };
        assert_eq!(body.display().unwrap(), "Hello…");
        assert!(body.is_truncated());
    }

    #[test]
    fn test_binary_marker() {
        let body = BodyRendering::Binary {
            len: 42,
            truncated: false,
        };
        assert_eq!(body.display().unwrap(), "<binary body, 42 bytes>");
    }
}
