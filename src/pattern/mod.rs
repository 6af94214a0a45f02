//! The bidirectional route pattern core and its composition operators.
//!
//! A [`RoutePattern`] carries three capabilities derived from one
//! declarative description: `parse` consumes a prefix of the remaining URL
//! components and produces a typed value, `print` renders such a value back
//! into components, and `template` renders the textual grammar the pattern
//! accepts. For every primitive and combinator defined here, printing a
//! value and re-parsing the printed components reproduces an equivalent
//! value.
//!
//! Patterns are parameterized by the half of the URL they operate over via
//! the [`Path`] and [`Query`] markers, so path-only and query-only
//! combinators cannot be joined with the wrong operator. The
//! [`query`](RoutePattern::query) and [`with_query`](RoutePattern::with_query)
//! bridges are the single sanctioned crossing point.

pub mod captured;
pub mod either;
pub mod path;
pub mod query;

use std::marker::PhantomData;
use std::sync::Arc;

use crate::helpers::url::RouteComponents;
use crate::pattern::either::Either;

/// Compile-time marker for the half of the URL a pattern operates over.
///
/// Carries no runtime data; it exists to keep path and query combinators
/// apart. This trait is sealed and implemented only by [`Path`] and
/// [`Query`].
pub trait PatternState: sealed::Sealed + Send + Sync + 'static {
    /// Separator rendered between joined templates of this state.
    const SEPARATOR: &'static str;
}

/// Marker for patterns that consume path segments.
pub enum Path {}

/// Marker for patterns that consume query parameters.
pub enum Query {}

impl PatternState for Path {
    const SEPARATOR: &'static str = "/";
}

impl PatternState for Query {
    const SEPARATOR: &'static str = "&";
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Path {}
    impl Sealed for super::Query {}
}

pub(crate) type ParseFn<V> =
    Arc<dyn Fn(RouteComponents) -> Option<(RouteComponents, V)> + Send + Sync>;
pub(crate) type PrintFn<V> = Arc<dyn Fn(&V) -> Option<RouteComponents> + Send + Sync>;

/// A bidirectional pattern over one half of a URL.
///
/// `V` is the value the pattern produces when it matches; `S` is the
/// [`PatternState`] marker naming the URL half it operates over. Values are
/// immutable and cheap to clone; they are typically constructed once and
/// reused for the life of the process.
pub struct RoutePattern<V, S: PatternState> {
    pub(crate) parse: ParseFn<V>,
    pub(crate) print: PrintFn<V>,
    pub(crate) template: String,
    pub(crate) trailing_wildcard: bool,
    _state: PhantomData<S>,
}

impl<V, S: PatternState> std::fmt::Debug for RoutePattern<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePattern")
            .field("template", &self.template)
            .finish()
    }
}

impl<V, S: PatternState> Clone for RoutePattern<V, S> {
    fn clone(&self) -> Self {
        RoutePattern {
            parse: Arc::clone(&self.parse),
            print: Arc::clone(&self.print),
            template: self.template.clone(),
            trailing_wildcard: self.trailing_wildcard,
            _state: PhantomData,
        }
    }
}

impl<V: 'static, S: PatternState> RoutePattern<V, S> {
    pub(crate) fn from_parts(
        parse: ParseFn<V>,
        print: PrintFn<V>,
        template: String,
        trailing_wildcard: bool,
    ) -> Self {
        RoutePattern {
            parse,
            print,
            template,
            trailing_wildcard,
            _state: PhantomData,
        }
    }

    /// Attempts to consume a prefix of `components`, returning the remaining
    /// components and the matched value.
    ///
    /// `None` signals no-match, a normal outcome rather than an error. The
    /// call is a pure function of its input.
    pub fn parse(&self, components: RouteComponents) -> Option<(RouteComponents, V)> {
        (self.parse)(components)
    }

    /// Attempts to render `value` into URL components.
    ///
    /// `None` signals not-printable: the value's shape does not fit this
    /// pattern, which is expected when the value came from a different
    /// alternation branch.
    pub fn print(&self, value: &V) -> Option<RouteComponents> {
        (self.print)(value)
    }

    /// The deterministic textual rendering of the grammar this pattern
    /// accepts, in the syntax the [`template`](crate::template) parser
    /// inverts.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub(crate) fn trailing_wildcard(&self) -> bool {
        self.trailing_wildcard
    }

    pub(crate) fn cast_state<S2: PatternState>(self) -> RoutePattern<V, S2> {
        let RoutePattern {
            parse,
            print,
            template,
            trailing_wildcard,
            ..
        } = self;
        RoutePattern {
            parse,
            print,
            template,
            trailing_wildcard,
            _state: PhantomData,
        }
    }

    /// Converts the produced value with `apply`, inverting it on print with
    /// `unapply`.
    ///
    /// The round-trip guarantee only extends to conversion pairs that are
    /// true inverses of each other.
    pub fn map<W, F, G>(self, apply: F, unapply: G) -> RoutePattern<W, S>
    where
        W: 'static,
        F: Fn(V) -> W + Send + Sync + 'static,
        G: Fn(&W) -> Option<V> + Send + Sync + 'static,
    {
        let RoutePattern {
            parse,
            print,
            template,
            trailing_wildcard,
            ..
        } = self;
        RoutePattern {
            parse: Arc::new(move |components| {
                parse(components).map(|(remaining, value)| (remaining, apply(value)))
            }),
            print: Arc::new(move |value| unapply(value).and_then(|inner| print(&inner))),
            template,
            trailing_wildcard,
            _state: PhantomData,
        }
    }

    /// Sequences `rhs` after this pattern, discarding `rhs`'s unit value.
    pub fn skip(self, rhs: RoutePattern<(), S>) -> RoutePattern<V, S> {
        let seq = seq_parse(&self, &rhs);
        let lhs_print = Arc::clone(&self.print);
        let rhs_print = Arc::clone(&rhs.print);
        RoutePattern {
            parse: Arc::new(move |components| {
                seq(components).map(|(remaining, (value, _))| (remaining, value))
            }),
            print: Arc::new(move |value| {
                let lhs = lhs_print(value)?;
                let rhs = rhs_print(&())?;
                Some(lhs.merge(rhs))
            }),
            template: join_template(&self.template, S::SEPARATOR, &rhs.template),
            trailing_wildcard: rhs.trailing_wildcard,
            _state: PhantomData,
        }
    }

    /// Sequences an optional `rhs` after this pattern.
    ///
    /// Parsing accepts input with or without `rhs`; printing renders this
    /// pattern only and omits the optional element.
    pub fn skip_opt(self, rhs: RoutePattern<(), S>) -> RoutePattern<V, S> {
        let optional = maybe(rhs);
        let seq = seq_parse(&self, &optional);
        let template = join_template(&self.template, S::SEPARATOR, &optional.template);
        RoutePattern {
            parse: Arc::new(move |components| {
                seq(components).map(|(remaining, (value, _))| (remaining, value))
            }),
            print: self.print,
            template,
            trailing_wildcard: optional.trailing_wildcard,
            _state: PhantomData,
        }
    }

    /// Sequences `rhs` after this pattern, keeping both values as a pair.
    pub fn zip<B: 'static>(self, rhs: RoutePattern<B, S>) -> RoutePattern<(V, B), S> {
        let seq = seq_parse(&self, &rhs);
        let lhs_print = Arc::clone(&self.print);
        let rhs_print = Arc::clone(&rhs.print);
        RoutePattern {
            parse: seq,
            print: Arc::new(move |value: &(V, B)| {
                let lhs = lhs_print(&value.0)?;
                let rhs = rhs_print(&value.1)?;
                Some(lhs.merge(rhs))
            }),
            template: join_template(&self.template, S::SEPARATOR, &rhs.template),
            trailing_wildcard: rhs.trailing_wildcard,
            _state: PhantomData,
        }
    }

    /// Tries this pattern, then `rhs`; the first success wins and no
    /// further attempts are made. Both branches must produce the same value
    /// type; see [`or_either`](RoutePattern::or_either) when they differ.
    pub fn or(self, rhs: RoutePattern<V, S>) -> RoutePattern<V, S> {
        let lhs_parse = Arc::clone(&self.parse);
        let rhs_parse = Arc::clone(&rhs.parse);
        let lhs_print = Arc::clone(&self.print);
        let rhs_print = Arc::clone(&rhs.print);
        RoutePattern {
            parse: Arc::new(move |components: RouteComponents| {
                lhs_parse(components.clone()).or_else(|| rhs_parse(components))
            }),
            print: Arc::new(move |value| lhs_print(value).or_else(|| rhs_print(value))),
            template: format!("({}|{})", self.template, rhs.template),
            trailing_wildcard: self.trailing_wildcard || rhs.trailing_wildcard,
            _state: PhantomData,
        }
    }

    /// Tries this pattern, then `rhs`, preserving which branch matched in
    /// an [`Either`].
    pub fn or_either<B: 'static>(self, rhs: RoutePattern<B, S>) -> RoutePattern<Either<V, B>, S> {
        let lhs_parse = Arc::clone(&self.parse);
        let rhs_parse = Arc::clone(&rhs.parse);
        let lhs_print = Arc::clone(&self.print);
        let rhs_print = Arc::clone(&rhs.print);
        RoutePattern {
            parse: Arc::new(move |components: RouteComponents| {
                if let Some((remaining, value)) = lhs_parse(components.clone()) {
                    return Some((remaining, Either::Left(value)));
                }
                let (remaining, value) = rhs_parse(components)?;
                Some((remaining, Either::Right(value)))
            }),
            print: Arc::new(move |value| match value {
                Either::Left(left) => lhs_print(left),
                Either::Right(right) => rhs_print(right),
            }),
            template: format!("({}|{})", self.template, rhs.template),
            trailing_wildcard: self.trailing_wildcard || rhs.trailing_wildcard,
            _state: PhantomData,
        }
    }
}

impl<S: PatternState> RoutePattern<(), S> {
    /// Sequences `rhs` after this pattern, discarding this pattern's unit
    /// value.
    pub fn then<B: 'static>(self, rhs: RoutePattern<B, S>) -> RoutePattern<B, S> {
        let seq = seq_parse(&self, &rhs);
        let lhs_print = Arc::clone(&self.print);
        let rhs_print = Arc::clone(&rhs.print);
        RoutePattern {
            parse: Arc::new(move |components| {
                seq(components).map(|(remaining, (_, value))| (remaining, value))
            }),
            print: Arc::new(move |value| {
                let lhs = lhs_print(&())?;
                let rhs = rhs_print(value)?;
                Some(lhs.merge(rhs))
            }),
            template: join_template(&self.template, S::SEPARATOR, &rhs.template),
            trailing_wildcard: rhs.trailing_wildcard,
            _state: PhantomData,
        }
    }
}

impl RoutePattern<(), Path> {
    /// Bridges into query context, discarding this pattern's unit value.
    ///
    /// The joined pattern first matches the path, then the query
    /// constraints.
    pub fn query<B: 'static>(self, rhs: RoutePattern<B, Query>) -> RoutePattern<B, Query> {
        let seq = bridge_parse(&self, &rhs);
        let lhs_print = Arc::clone(&self.print);
        let rhs_print = Arc::clone(&rhs.print);
        RoutePattern {
            parse: Arc::new(move |components| {
                seq(components).map(|(remaining, (_, value))| (remaining, value))
            }),
            print: Arc::new(move |value| {
                let lhs = lhs_print(&())?;
                let rhs = rhs_print(value)?;
                Some(lhs.merge(rhs))
            }),
            template: format!("{}?{}", self.template, rhs.template),
            trailing_wildcard: self.trailing_wildcard,
            _state: PhantomData,
        }
    }
}

impl<V: 'static> RoutePattern<V, Path> {
    /// Bridges into query context, keeping the path value and the query
    /// value as a pair.
    pub fn with_query<B: 'static>(self, rhs: RoutePattern<B, Query>) -> RoutePattern<(V, B), Query> {
        let seq = bridge_parse(&self, &rhs);
        let lhs_print = Arc::clone(&self.print);
        let rhs_print = Arc::clone(&rhs.print);
        RoutePattern {
            parse: seq,
            print: Arc::new(move |value: &(V, B)| {
                let lhs = lhs_print(&value.0)?;
                let rhs = rhs_print(&value.1)?;
                Some(lhs.merge(rhs))
            }),
            template: format!("{}?{}", self.template, rhs.template),
            trailing_wildcard: self.trailing_wildcard,
            _state: PhantomData,
        }
    }
}

/// Wraps `inner` as zero-or-one: a failed parse is reported as a matched
/// `None` without consuming input, and printing `None` renders nothing.
pub fn maybe<V: 'static, S: PatternState>(inner: RoutePattern<V, S>) -> RoutePattern<Option<V>, S> {
    let inner_parse = Arc::clone(&inner.parse);
    let inner_print = Arc::clone(&inner.print);
    RoutePattern {
        parse: Arc::new(move |components: RouteComponents| match inner_parse(components.clone()) {
            Some((remaining, value)) => Some((remaining, Some(value))),
            None => Some((components, None)),
        }),
        print: Arc::new(move |value| match value {
            Some(inner) => inner_print(inner),
            None => Some(RouteComponents::default()),
        }),
        template: format!("({})", inner.template),
        trailing_wildcard: false,
        _state: PhantomData,
    }
}

/// Sequences two same-half patterns.
///
/// When the left side ends in a wildcard, segments are consumed one at a
/// time and the right side is attempted after each step; the first
/// consumption count at which it parses wins, and no later split is
/// attempted.
pub(crate) fn seq_parse<A, B, S>(
    lhs: &RoutePattern<A, S>,
    rhs: &RoutePattern<B, S>,
) -> ParseFn<(A, B)>
where
    A: 'static,
    B: 'static,
    S: PatternState,
{
    let search = lhs.trailing_wildcard;
    let lhs = Arc::clone(&lhs.parse);
    let rhs = Arc::clone(&rhs.parse);
    Arc::new(move |components| {
        let (mut remaining, lhs_value) = lhs(components)?;
        if !search {
            let (remaining, rhs_value) = rhs(remaining)?;
            return Some((remaining, (lhs_value, rhs_value)));
        }
        loop {
            remaining.pop_segment()?;
            if let Some((remaining, rhs_value)) = rhs(remaining.clone()) {
                return Some((remaining, (lhs_value, rhs_value)));
            }
        }
    })
}

/// Sequences a path pattern with a query pattern. A wildcard tail on the
/// path side is left trailing rather than searched, since the query side
/// consumes no path segments.
pub(crate) fn bridge_parse<A, B>(
    lhs: &RoutePattern<A, Path>,
    rhs: &RoutePattern<B, Query>,
) -> ParseFn<(A, B)>
where
    A: 'static,
    B: 'static,
{
    let lhs = Arc::clone(&lhs.parse);
    let rhs = Arc::clone(&rhs.parse);
    Arc::new(move |components| {
        let (remaining, lhs_value) = lhs(components)?;
        let (remaining, rhs_value) = rhs(remaining)?;
        Some((remaining, (lhs_value, rhs_value)))
    })
}

pub(crate) fn join_template(lhs: &str, separator: &str, rhs: &str) -> String {
    format!("{}{}{}", lhs, separator, rhs)
}

pub(crate) fn bool_from_str(raw: &str) -> Option<bool> {
    match raw {
        "1" => Some(true),
        "0" => Some(false),
        _ if raw.eq_ignore_ascii_case("true") => Some(true),
        _ if raw.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
