//! Primitive patterns over path segments.
//!
//! Typed parameters bind positionally: parsing applies the conversion to the
//! next remaining segment, printing emits the rendered value as a single
//! segment.

use std::sync::Arc;

use crate::helpers::url::RouteComponents;
use crate::pattern::{bool_from_str, Path, RoutePattern};

/// Matches a path segment exactly equal to `text`, capturing nothing.
///
/// The comparison is case sensitive. Printing renders the literal text
/// unconditionally.
pub fn lit(text: &str) -> RoutePattern<(), Path> {
    let expected = text.to_string();
    let rendered = text.to_string();
    RoutePattern::from_parts(
        Arc::new(move |mut components: RouteComponents| {
            let segment = components.pop_segment()?;
            if segment == expected {
                Some((components, ()))
            } else {
                None
            }
        }),
        Arc::new(move |_| Some(RouteComponents::from_segment(rendered.clone()))),
        text.to_string(),
        false,
    )
}

/// Builds a typed path parameter from an `apply`/`unapply` conversion pair.
///
/// `kind` names the parameter in the `:kind` template token. Parsing fails
/// when `apply` rejects the next segment; printing fails when `unapply`
/// rejects the value, rather than emitting a partial rendering.
pub fn param<A, F, G>(kind: &str, apply: F, unapply: G) -> RoutePattern<A, Path>
where
    A: 'static,
    F: Fn(&str) -> Option<A> + Send + Sync + 'static,
    G: Fn(&A) -> Option<String> + Send + Sync + 'static,
{
    RoutePattern::from_parts(
        Arc::new(move |mut components: RouteComponents| {
            let segment = components.pop_segment()?;
            let value = apply(&segment)?;
            Some((components, value))
        }),
        Arc::new(move |value| unapply(value).map(RouteComponents::from_segment)),
        format!(":{}", kind),
        false,
    )
}

/// A path segment holding an exact base-10 integer.
pub fn int() -> RoutePattern<i64, Path> {
    param("int", |raw| raw.parse().ok(), |value: &i64| Some(value.to_string()))
}

/// A path segment holding a floating-point number.
pub fn double() -> RoutePattern<f64, Path> {
    param("double", |raw| raw.parse().ok(), |value: &f64| Some(value.to_string()))
}

/// A path segment captured verbatim.
pub fn string() -> RoutePattern<String, Path> {
    param("string", |raw| Some(raw.to_string()), |value: &String| Some(value.clone()))
}

/// A path segment holding `1`/`0` or case-insensitive `true`/`false`.
///
/// Atypical in a path; present for completeness with the query half.
pub fn bool() -> RoutePattern<bool, Path> {
    param("bool", bool_from_str, |value| {
        Some(if *value { "true" } else { "false" }.to_string())
    })
}

/// Matches a run of path segments, capturing nothing.
///
/// In trailing position the wildcard matches everything that remains,
/// including nothing. When more pattern elements follow, segments are
/// consumed one at a time and the first position at which the following
/// element parses wins; no later split is attempted.
pub fn any() -> RoutePattern<(), Path> {
    RoutePattern::from_parts(
        Arc::new(|components| Some((components, ()))),
        Arc::new(|_| Some(RouteComponents::default())),
        "*".to_string(),
        true,
    )
}
