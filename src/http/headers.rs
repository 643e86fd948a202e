//! Ordered header multimap.
//!
//! # Design Decisions
//! - Original casing and arrival order are preserved (the log shows the wire)
//! - Lookup is case-insensitive (per HTTP spec)
//! - Duplicate names stay as separate entries unless a filter merges them

use http::HeaderMap;

/// Headers as they appeared on the wire: an ordered list of name/value
/// pairs in which the same name may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMultimap {
    entries: Vec<(String, String)>,
}

impl HeaderMultimap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping arrival order.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value for `name`, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name` in arrival order, case-insensitive.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every value stored under `name` (case-insensitive), keeping
    /// each entry's casing and position.
    pub fn replace_values(&mut self, name: &str, replacement: &str) {
        for (n, v) in &mut self.entries {
            if n.eq_ignore_ascii_case(name) {
                *v = replacement.to_string();
            }
        }
    }

    /// Drop every entry stored under `name`, case-insensitive.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Collapse repeated names into a single comma-joined entry at the
    /// position of the first occurrence.
    pub fn merge_duplicates(&mut self) {
        let mut merged: Vec<(String, String)> = Vec::with_capacity(self.entries.len());
        for (name, value) in self.entries.drain(..) {
            match merged
                .iter_mut()
                .find(|(n, _)| n.eq_ignore_ascii_case(&name))
            {
                Some((_, existing)) => {
                    existing.push_str(", ");
                    existing.push_str(&value);
                }
                None => merged.push((name, value)),
            }
        }
        self.entries = merged;
    }
}

impl From<&HeaderMap> for HeaderMultimap {
    /// Convert from the lowercased `http` representation. Values that are
    /// not valid UTF-8 are rendered lossily; the raw bytes still reach the
    /// real consumer untouched.
    fn from(map: &HeaderMap) -> Self {
        let mut headers = HeaderMultimap::new();
        for (name, value) in map.iter() {
            headers.push(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        headers
    }
}

impl FromIterator<(String, String)> for HeaderMultimap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = HeaderMultimap::new();
        headers.push("Content-Type", "text/plain");

        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(headers.get("accept"), None);
    }

    #[test]
    fn test_duplicates_keep_order_and_casing() {
        let mut headers = HeaderMultimap::new();
        headers.push("Set-Cookie", "a=1");
        headers.push("X-Other", "x");
        headers.push("set-cookie", "b=2");

        assert_eq!(headers.get_all("set-cookie"), vec!["a=1", "b=2"]);
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Set-Cookie", "X-Other", "set-cookie"]);
    }

    #[test]
    fn test_replace_values_keeps_position() {
        let mut headers = HeaderMultimap::new();
        headers.push("Authorization", "Bearer secret");
        headers.push("Accept", "*/*");

        headers.replace_values("authorization", "XXX");

        let entries: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(entries, vec![("Authorization", "XXX"), ("Accept", "*/*")]);
    }

    #[test]
    fn test_merge_duplicates() {
        let mut headers = HeaderMultimap::new();
        headers.push("Accept", "text/html");
        headers.push("Host", "example.com");
        headers.push("accept", "application/json");

        headers.merge_duplicates();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("accept"), Some("text/html, application/json"));
    }
}
