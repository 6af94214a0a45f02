//! Reconstructs route patterns from their textual templates.
//!
//! The template grammar is the one rendered by
//! [`RoutePattern::template`](crate::pattern::RoutePattern::template):
//! `/`-separated path tokens, a `?` before `&`-separated query tokens,
//! `:kind` typed parameters, `*` wildcards and parenthesized
//! alternation/optional groups. Path and query text are tokenized
//! separately, each excluding separators nested inside groups, and each
//! token list is consumed by an ordered, non-backtracking loop: the first
//! sub-parser that recognizes a prefix of the remaining tokens consumes it,
//! and an unrecognized token fails the whole parse. Fragments then fold
//! left to right with the type-erased join and bridge operators.

use std::str::FromStr;
use std::sync::Arc;

use log::trace;
use thiserror::Error;

use crate::pattern::captured::Captured;
use crate::pattern::{
    bridge_parse, maybe, path, query, seq_parse, Path, PatternState, PrintFn, Query, RoutePattern,
};

/// The ways a textual template can fail to parse.
///
/// Pattern construction from text is fallible; construction from
/// combinators is not.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// No sub-parser recognized the head of the remaining path tokens.
    #[error("unrecognized path token: {0}")]
    UnrecognizedPathToken(String),
    /// No sub-parser recognized the head of the remaining query tokens.
    #[error("unrecognized query token: {0}")]
    UnrecognizedQueryToken(String),
    /// The template had no path tokens at all.
    #[error("empty template")]
    Empty,
}

type ErasedPattern<S> = RoutePattern<Captured, S>;

type SubParser<S> = fn(&[String]) -> Option<(usize, ErasedPattern<S>)>;

const PATH_PARSERS: &[SubParser<Path>] = &[
    wildcard_end,
    wildcard_then,
    int_path,
    double_path,
    string_path,
    lit_path,
];

const QUERY_PARSERS: &[SubParser<Query>] = &[
    int_query,
    double_query,
    bool_query,
    string_query,
    group_query,
];

/// Parses a full route template into a type-erased pattern.
///
/// The reconstructed pattern is equivalent to one hand-built from
/// combinators over [`Captured`] values, and renders the same template it
/// was parsed from.
pub fn parse(template: &str) -> Result<RoutePattern<Captured, Path>, TemplateError> {
    let (path_text, query_text) = match template.find('?') {
        Some(idx) => (&template[..idx], &template[idx + 1..]),
        None => (template, ""),
    };

    let path_tokens: Vec<String> = split_excluding(path_text, '/')
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect();
    if path_tokens.is_empty() {
        return Err(TemplateError::Empty);
    }
    let fragments =
        consume(&path_tokens, PATH_PARSERS).map_err(TemplateError::UnrecognizedPathToken)?;
    let pattern = fold_path(fragments);

    let query_tokens: Vec<String> = split_excluding(query_text, '&')
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect();
    if query_tokens.is_empty() {
        return Ok(pattern);
    }
    let fragments =
        consume(&query_tokens, QUERY_PARSERS).map_err(TemplateError::UnrecognizedQueryToken)?;

    let mut fragments = fragments.into_iter();
    let first = match fragments.next() {
        Some(first) => first,
        None => return Ok(pattern),
    };
    let mut combined = erased_bridge(pattern, first);
    for next in fragments {
        combined = erased_and(combined, next, false);
    }
    Ok(combined.cast_state::<Path>())
}

impl FromStr for RoutePattern<Captured, Path> {
    type Err = TemplateError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        parse(template)
    }
}

/// Splits `text` on `separator`, excluding separators nested inside
/// parenthesized groups.
fn split_excluding(text: &str, separator: char) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for ch in text.chars() {
        if ch == '(' {
            depth += 1;
        } else if ch == ')' {
            depth = depth.saturating_sub(1);
        }
        if ch == separator && depth == 0 {
            tokens.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    tokens.push(current);
    tokens
}

/// Consumes `tokens` with the first recognizing parser from `parsers`,
/// repeatedly, until the tokens are exhausted or none recognizes the head.
fn consume<S: PatternState>(
    tokens: &[String],
    parsers: &[SubParser<S>],
) -> Result<Vec<ErasedPattern<S>>, String> {
    let mut remaining = tokens;
    let mut fragments = Vec::new();
    'tokens: while let Some(head) = remaining.first() {
        for parser in parsers {
            if let Some((consumed, fragment)) = parser(remaining) {
                trace!(" consumed template fragment: {}", fragment.template());
                remaining = &remaining[consumed..];
                fragments.push(fragment);
                continue 'tokens;
            }
        }
        return Err(head.clone());
    }
    Ok(fragments)
}

fn fold_path(fragments: Vec<ErasedPattern<Path>>) -> ErasedPattern<Path> {
    let mut fragments = fragments.into_iter();
    let first = match fragments.next() {
        Some(first) => first,
        None => erased_lit(""),
    };
    fragments.fold(first, |acc, next| erased_and(acc, next, true))
}

// Path sub-parsers, in priority order.

fn wildcard_end(tokens: &[String]) -> Option<(usize, ErasedPattern<Path>)> {
    if tokens.len() == 1 && tokens[0] == "*" {
        Some((1, erased_any()))
    } else {
        None
    }
}

fn wildcard_then(tokens: &[String]) -> Option<(usize, ErasedPattern<Path>)> {
    if tokens.len() > 1 && tokens[0] == "*" && tokens[1] != "*" {
        let next = single_path_token(&tokens[1])?;
        Some((2, erased_and(erased_any(), next, true)))
    } else {
        None
    }
}

fn int_path(tokens: &[String]) -> Option<(usize, ErasedPattern<Path>)> {
    if tokens.first().map(String::as_str) == Some(":int") {
        Some((1, erased_int()))
    } else {
        None
    }
}

fn double_path(tokens: &[String]) -> Option<(usize, ErasedPattern<Path>)> {
    if tokens.first().map(String::as_str) == Some(":double") {
        Some((1, erased_double()))
    } else {
        None
    }
}

fn string_path(tokens: &[String]) -> Option<(usize, ErasedPattern<Path>)> {
    if tokens.first().map(String::as_str) == Some(":string") {
        Some((1, erased_string()))
    } else {
        None
    }
}

fn lit_path(tokens: &[String]) -> Option<(usize, ErasedPattern<Path>)> {
    let token = tokens.first()?;
    Some((1, literal_or_group(token)?))
}

fn single_path_token(token: &str) -> Option<ErasedPattern<Path>> {
    match token {
        ":int" => Some(erased_int()),
        ":double" => Some(erased_double()),
        ":string" => Some(erased_string()),
        _ => literal_or_group(token),
    }
}

fn literal_or_group(token: &str) -> Option<ErasedPattern<Path>> {
    if token.starts_with('(') && token.ends_with(')') {
        parse_group(token, path_subtemplate)
    } else {
        Some(erased_lit(token))
    }
}

fn path_subtemplate(text: &str) -> Option<ErasedPattern<Path>> {
    let tokens: Vec<String> = split_excluding(text, '/')
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.is_empty() {
        return None;
    }
    let fragments = consume(&tokens, PATH_PARSERS).ok()?;
    Some(fold_path(fragments))
}

// Query sub-parsers, in priority order.

fn int_query(tokens: &[String]) -> Option<(usize, ErasedPattern<Query>)> {
    let key = tokens.first()?.strip_suffix("=:int")?;
    Some((1, erased_query_int(key)))
}

fn double_query(tokens: &[String]) -> Option<(usize, ErasedPattern<Query>)> {
    let key = tokens.first()?.strip_suffix("=:double")?;
    Some((1, erased_query_double(key)))
}

fn bool_query(tokens: &[String]) -> Option<(usize, ErasedPattern<Query>)> {
    let key = tokens.first()?.strip_suffix("=:bool")?;
    Some((1, erased_query_bool(key)))
}

fn string_query(tokens: &[String]) -> Option<(usize, ErasedPattern<Query>)> {
    let key = tokens.first()?.strip_suffix("=:string")?;
    Some((1, erased_query_string(key)))
}

fn group_query(tokens: &[String]) -> Option<(usize, ErasedPattern<Query>)> {
    let token = tokens.first()?;
    if token.starts_with('(') && token.ends_with(')') {
        Some((1, parse_group(token, query_subtemplate)?))
    } else {
        None
    }
}

fn query_subtemplate(text: &str) -> Option<ErasedPattern<Query>> {
    let tokens: Vec<String> = split_excluding(text, '&')
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.is_empty() {
        return None;
    }
    let fragments = consume(&tokens, QUERY_PARSERS).ok()?;
    let mut fragments = fragments.into_iter();
    let first = fragments.next()?;
    Some(fragments.fold(first, |acc, next| erased_and(acc, next, false)))
}

/// Parses a parenthesized group: two or more top-level `|` branches fold
/// into alternation, a single branch becomes an optional element.
fn parse_group<S: PatternState>(
    token: &str,
    branch_parser: fn(&str) -> Option<ErasedPattern<S>>,
) -> Option<ErasedPattern<S>> {
    let inner = token.strip_prefix('(')?.strip_suffix(')')?;
    let branches = split_excluding(inner, '|');
    if branches.iter().any(String::is_empty) {
        return None;
    }
    let mut parsed = Vec::with_capacity(branches.len());
    for branch in &branches {
        parsed.push(branch_parser(branch)?);
    }
    let mut parsed = parsed.into_iter();
    let first = parsed.next()?;
    if branches.len() == 1 {
        Some(erased_opt(first))
    } else {
        Some(parsed.fold(first, |acc, next| acc.or(next)))
    }
}

// Type-erased primitives.

fn erased_lit(text: &str) -> ErasedPattern<Path> {
    path::lit(text).map(|_| Captured::Unit, |_| Some(()))
}

fn erased_any() -> ErasedPattern<Path> {
    path::any().map(|_| Captured::Unit, |_| Some(()))
}

fn erased_int() -> ErasedPattern<Path> {
    path::int().map(Captured::Int, |captured| match captured {
        Captured::Int(value) => Some(*value),
        _ => None,
    })
}

fn erased_double() -> ErasedPattern<Path> {
    path::double().map(Captured::Double, |captured| match captured {
        Captured::Double(value) => Some(*value),
        _ => None,
    })
}

fn erased_string() -> ErasedPattern<Path> {
    path::string().map(Captured::String, |captured| match captured {
        Captured::String(value) => Some(value.clone()),
        _ => None,
    })
}

fn erased_query_int(key: &str) -> ErasedPattern<Query> {
    query::int(key).map(Captured::Int, |captured| match captured {
        Captured::Int(value) => Some(*value),
        _ => None,
    })
}

fn erased_query_double(key: &str) -> ErasedPattern<Query> {
    query::double(key).map(Captured::Double, |captured| match captured {
        Captured::Double(value) => Some(*value),
        _ => None,
    })
}

fn erased_query_bool(key: &str) -> ErasedPattern<Query> {
    query::bool(key).map(Captured::Bool, |captured| match captured {
        Captured::Bool(value) => Some(*value),
        _ => None,
    })
}

fn erased_query_string(key: &str) -> ErasedPattern<Query> {
    query::string(key).map(Captured::String, |captured| match captured {
        Captured::String(value) => Some(value.clone()),
        _ => None,
    })
}

// Type-erased composition.

/// Sequences two erased same-half patterns, flattening the captured pair.
///
/// Printing attempts the pair interpretation first and, when `fallback` is
/// set, falls back to feeding the same value to both sides; the fallback is
/// what makes unit-elided captures printable on the path half. The query
/// half does not take the fallback: it would render one scalar under two
/// different keys and break the round-trip law.
fn erased_and<S: PatternState>(
    lhs: ErasedPattern<S>,
    rhs: ErasedPattern<S>,
    fallback: bool,
) -> ErasedPattern<S> {
    let seq = seq_parse(&lhs, &rhs);
    let template = crate::pattern::join_template(lhs.template(), S::SEPARATOR, rhs.template());
    let trailing_wildcard = rhs.trailing_wildcard();
    let print = erased_pair_print(lhs, rhs, fallback);
    RoutePattern::from_parts(
        Arc::new(move |components| {
            seq(components)
                .map(|(remaining, (lhs, rhs))| (remaining, Captured::flatten(lhs, rhs)))
        }),
        print,
        template,
        trailing_wildcard,
    )
}

/// Bridges an erased path pattern with an erased query pattern.
fn erased_bridge(lhs: ErasedPattern<Path>, rhs: ErasedPattern<Query>) -> ErasedPattern<Query> {
    let seq = bridge_parse(&lhs, &rhs);
    let template = format!("{}?{}", lhs.template(), rhs.template());
    let trailing_wildcard = lhs.trailing_wildcard();
    let print = erased_pair_print(lhs.cast_state::<Query>(), rhs, true);
    RoutePattern::from_parts(
        Arc::new(move |components| {
            seq(components)
                .map(|(remaining, (lhs, rhs))| (remaining, Captured::flatten(lhs, rhs)))
        }),
        print,
        template,
        trailing_wildcard,
    )
}

fn erased_pair_print<S: PatternState>(
    lhs: ErasedPattern<S>,
    rhs: ErasedPattern<S>,
    fallback: bool,
) -> PrintFn<Captured> {
    Arc::new(move |value| {
        if let Captured::Pair(a, b) = value {
            if let (Some(lhs), Some(rhs)) = (lhs.print(&**a), rhs.print(&**b)) {
                return Some(lhs.merge(rhs));
            }
        }
        if !fallback {
            return None;
        }
        let printed_lhs = lhs.print(value)?;
        let printed_rhs = rhs.print(value)?;
        Some(printed_lhs.merge(printed_rhs))
    })
}

fn erased_opt<S: PatternState>(inner: ErasedPattern<S>) -> ErasedPattern<S> {
    maybe(inner).map(
        |value| value.unwrap_or(Captured::Absent),
        |captured| match captured {
            Captured::Absent => Some(None),
            other => Some(Some(other.clone())),
        },
    )
}
