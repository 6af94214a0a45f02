//! Defines `RouteComponents` and the URL decomposition that produces it.

use std::collections::{HashMap, VecDeque};

use log::trace;
use percent_encoding::percent_decode_str;

const EXCLUDED_SEGMENTS: [&str; 1] = [""];

/// The routable parts of a URL: an ordered sequence of path segments and a
/// key to value mapping of query parameters.
///
/// A `RouteComponents` value is transient: one is created per match or print
/// call, and a "remaining" instance is threaded through sequential parsing to
/// represent unconsumed input. Pattern printing produces partial components
/// which are combined with [`merge`](RouteComponents::merge).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteComponents {
    path: VecDeque<String>,
    query: HashMap<String, String>,
}

impl RouteComponents {
    /// Creates components from pre-split parts.
    pub fn new<P>(path: P, query: HashMap<String, String>) -> Self
    where
        P: IntoIterator<Item = String>,
    {
        RouteComponents {
            path: path.into_iter().collect(),
            query,
        }
    }

    /// Decomposes a URL into components.
    ///
    /// Deep link URLs carry their first routable segment in the host position
    /// (`app://recipes/123`), so everything after `scheme://` and before `?`
    /// is treated as the path. Empty segments are skipped, path segments are
    /// percent decoded and query keys and values are form url decoded. Each
    /// query entry is split on its first `=`; an entry with no `=` maps the
    /// whole entry to an empty value. A trailing fragment is ignored.
    pub fn from_url(url: &str) -> Self {
        let without_scheme = match url.find("://") {
            Some(idx) => &url[idx + 3..],
            None => url,
        };
        let without_fragment = match without_scheme.find('#') {
            Some(idx) => &without_scheme[..idx],
            None => without_scheme,
        };
        let (raw_path, raw_query) = match without_fragment.find('?') {
            Some(idx) => (&without_fragment[..idx], &without_fragment[idx + 1..]),
            None => (without_fragment, ""),
        };

        let path = raw_path
            .split('/')
            .filter(|s| !EXCLUDED_SEGMENTS.contains(s))
            .filter_map(percent_decoded)
            .collect();

        let mut query = HashMap::new();
        for entry in raw_query.split('&').filter(|e| !e.is_empty()) {
            let (raw_key, raw_value) = match entry.find('=') {
                Some(idx) => (&entry[..idx], &entry[idx + 1..]),
                None => (entry, ""),
            };
            if let (Some(key), Some(value)) = (form_url_decoded(raw_key), form_url_decoded(raw_value))
            {
                query.insert(key, value);
            }
        }

        RouteComponents { path, query }
    }

    /// The path segments that remain to be consumed.
    pub fn path(&self) -> impl Iterator<Item = &str> {
        self.path.iter().map(String::as_str)
    }

    /// The query parameters.
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// True when every path segment has been consumed.
    pub fn is_path_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Appends `other`'s path segments and merges its query parameters,
    /// later keys winning on conflict.
    pub fn merge(mut self, other: RouteComponents) -> RouteComponents {
        self.path.extend(other.path);
        self.query.extend(other.query);
        self
    }

    pub(crate) fn pop_segment(&mut self) -> Option<String> {
        self.path.pop_front()
    }

    pub(crate) fn from_segment(segment: String) -> Self {
        RouteComponents {
            path: std::iter::once(segment).collect(),
            query: HashMap::new(),
        }
    }

    pub(crate) fn from_query_entry(key: String, value: String) -> Self {
        let mut query = HashMap::new();
        query.insert(key, value);
        RouteComponents {
            path: VecDeque::new(),
            query,
        }
    }

    pub(crate) fn query_value(&self, key: &str) -> Option<String> {
        self.query.get(key).cloned()
    }
}

/// Attempt to percent decode `raw`, ensuring the result is valid UTF-8.
fn percent_decoded(raw: &str) -> Option<String> {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => {
            trace!(" percent_decode: error, src: {}", raw);
            None
        }
    }
}

/// Decode form-urlencoded data, e.g. a query string key or value.
fn form_url_decoded(raw: &str) -> Option<String> {
    percent_decoded(&raw.replace('+', " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(components: &RouteComponents) -> Vec<&str> {
        components.path().collect()
    }

    #[test]
    fn decomposes_scheme_path_and_query() {
        let components = RouteComponents::from_url("app://recipes/123?recipeId=456&t=A");

        assert_eq!(segments(&components), vec!["recipes", "123"]);
        assert_eq!(components.query().get("recipeId").unwrap(), "456");
        assert_eq!(components.query().get("t").unwrap(), "A");
    }

    #[test]
    fn skips_empty_segments() {
        let components = RouteComponents::from_url("app://some/path/to//my/handler/");
        assert_eq!(segments(&components), vec!["some", "path", "to", "my", "handler"]);
    }

    #[test]
    fn percent_decodes_path_segments() {
        let components = RouteComponents::from_url("app://%61ctiv%61te/workflow5");
        assert_eq!(segments(&components), vec!["activate", "workflow5"]);
    }

    #[test]
    fn form_url_decodes_query_values() {
        let components = RouteComponents::from_url("app://search?q=%41+%42%2B%63%20%64");
        assert_eq!(components.query().get("q").unwrap(), "A B+c d");
    }

    #[test]
    fn plus_in_path_is_literal() {
        let components = RouteComponents::from_url("app://a+b/c");
        assert_eq!(segments(&components), vec!["a+b", "c"]);
    }

    #[test]
    fn query_entry_splits_on_first_equals() {
        let components = RouteComponents::from_url("app://r?filter=a=b");
        assert_eq!(components.query().get("filter").unwrap(), "a=b");
    }

    #[test]
    fn bare_query_key_maps_to_empty_value() {
        let components = RouteComponents::from_url("app://r?verbose");
        assert_eq!(components.query().get("verbose").unwrap(), "");
    }

    #[test]
    fn fragment_is_ignored() {
        let components = RouteComponents::from_url("app://recipes/1?t=A#section");
        assert_eq!(segments(&components), vec!["recipes", "1"]);
        assert_eq!(components.query().get("t").unwrap(), "A");
    }

    #[test]
    fn scheme_less_input_is_all_path() {
        let components = RouteComponents::from_url("recipes/info");
        assert_eq!(segments(&components), vec!["recipes", "info"]);
    }

    #[test]
    fn merge_appends_path_and_later_query_keys_win() {
        let lhs = RouteComponents::from_url("app://a/b?k=1&x=2");
        let rhs = RouteComponents::from_url("app://c?k=9");
        let merged = lhs.merge(rhs);

        assert_eq!(segments(&merged), vec!["a", "b", "c"]);
        assert_eq!(merged.query().get("k").unwrap(), "9");
        assert_eq!(merged.query().get("x").unwrap(), "2");
    }
}
