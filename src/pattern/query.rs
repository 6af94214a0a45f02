//! Primitive patterns over query parameters.
//!
//! Typed parameters bind to a named key: parsing looks the key up in the
//! query map and applies the conversion, printing emits a one-entry query
//! contribution. Query patterns never consume path segments, so their order
//! within a pattern does not constrain the order of keys in the URL.

use std::sync::Arc;

use crate::helpers::url::RouteComponents;
use crate::pattern::{bool_from_str, Query, RoutePattern};

/// Builds a typed query parameter bound to `key` from an `apply`/`unapply`
/// conversion pair.
///
/// `kind` names the parameter in the `key=:kind` template token. Parsing
/// fails when the key is absent or `apply` rejects the raw value; printing
/// fails when `unapply` rejects the value, rather than omitting the key.
pub fn param<A, F, G>(key: &str, kind: &str, apply: F, unapply: G) -> RoutePattern<A, Query>
where
    A: 'static,
    F: Fn(&str) -> Option<A> + Send + Sync + 'static,
    G: Fn(&A) -> Option<String> + Send + Sync + 'static,
{
    let lookup = key.to_string();
    let rendered = key.to_string();
    RoutePattern::from_parts(
        Arc::new(move |components: RouteComponents| {
            let raw = components.query_value(&lookup)?;
            let value = apply(&raw)?;
            Some((components, value))
        }),
        Arc::new(move |value| {
            unapply(value).map(|raw| RouteComponents::from_query_entry(rendered.clone(), raw))
        }),
        format!("{}=:{}", key, kind),
        false,
    )
}

/// A query parameter holding an exact base-10 integer.
pub fn int(key: &str) -> RoutePattern<i64, Query> {
    param(key, "int", |raw| raw.parse().ok(), |value: &i64| Some(value.to_string()))
}

/// A query parameter holding a floating-point number.
pub fn double(key: &str) -> RoutePattern<f64, Query> {
    param(key, "double", |raw| raw.parse().ok(), |value: &f64| Some(value.to_string()))
}

/// A query parameter captured verbatim.
pub fn string(key: &str) -> RoutePattern<String, Query> {
    param(key, "string", |raw| Some(raw.to_string()), |value: &String| {
        Some(value.clone())
    })
}

/// A query parameter holding `1`/`0` or case-insensitive `true`/`false`.
pub fn bool(key: &str) -> RoutePattern<bool, Query> {
    param(key, "bool", bool_from_str, |value| {
        Some(if *value { "true" } else { "false" }.to_string())
    })
}

/// Matches the presence of `key`, with no constraint on its value and
/// capturing nothing. Printing emits the key with an empty value.
pub fn flag(key: &str) -> RoutePattern<(), Query> {
    let lookup = key.to_string();
    let rendered = key.to_string();
    RoutePattern::from_parts(
        Arc::new(move |components: RouteComponents| {
            components.query_value(&lookup)?;
            Some((components, ()))
        }),
        Arc::new(move |_| {
            Some(RouteComponents::from_query_entry(
                rendered.clone(),
                String::new(),
            ))
        }),
        key.to_string(),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_query(url: &str) -> RouteComponents {
        RouteComponents::from_url(url)
    }

    #[test]
    fn int_reads_the_named_key() {
        let pattern = int("recipeId");
        let (_, value) = pattern.parse(with_query("app://r?recipeId=456&t=A")).unwrap();
        assert_eq!(value, 456);
        assert_eq!(pattern.template(), "recipeId=:int");
    }

    #[test]
    fn absent_or_malformed_keys_fail() {
        assert!(int("recipeId").parse(with_query("app://r?t=A")).is_none());
        assert!(int("recipeId").parse(with_query("app://r?recipeId=abc")).is_none());
    }

    #[test]
    fn parsing_leaves_the_query_intact() {
        let pattern = string("t");
        let (remaining, _) = pattern.parse(with_query("app://r?t=A")).unwrap();
        assert_eq!(remaining.query().get("t").unwrap(), "A");
    }

    #[test]
    fn bool_accepts_numeric_and_named_forms() {
        for (raw, expected) in &[("1", true), ("0", false), ("TRUE", true), ("false", false)] {
            let url = format!("app://r?b={}", raw);
            let (_, value) = bool("b").parse(with_query(&url)).unwrap();
            assert_eq!(value, *expected, "{}", raw);
        }
        assert!(bool("b").parse(with_query("app://r?b=2")).is_none());
    }

    #[test]
    fn print_emits_a_single_entry() {
        let printed = int("recipeId").print(&123).unwrap();
        assert!(printed.is_path_empty());
        assert_eq!(printed.query().get("recipeId").unwrap(), "123");
    }

    #[test]
    fn flag_requires_presence_only() {
        let pattern = flag("verbose");
        assert!(pattern.parse(with_query("app://r?verbose")).is_some());
        assert!(pattern.parse(with_query("app://r?verbose=1")).is_some());
        assert!(pattern.parse(with_query("app://r?quiet")).is_none());
        assert_eq!(pattern.template(), "verbose");
    }
}
