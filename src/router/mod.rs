//! Defines the `Router`, an ordered registry of route patterns.

use log::trace;

use crate::helpers::url::RouteComponents;
use crate::pattern::captured::{Captured, CapturedValue};
use crate::pattern::{Path, PatternState, RoutePattern};
use crate::template::{self, TemplateError};

struct Route<I> {
    pattern: RoutePattern<Captured, Path>,
    builder: Box<dyn Fn(Captured) -> Option<I> + Send + Sync>,
}

/// An ordered registry pairing route patterns with intent builders.
///
/// Entries are evaluated in registration order and the first full match
/// wins; a later entry overlapping an earlier one is an unreachable shadow
/// case, not an error. Registration is a setup-phase activity: once all
/// [`add`](Router::add) calls have completed, concurrent matching from
/// multiple threads is safe without locking, as matching never mutates the
/// registry. The router provides no synchronization of its own.
pub struct Router<I> {
    routes: Vec<Route<I>>,
}

impl<I> Router<I> {
    /// Creates an empty router.
    pub fn new() -> Router<I> {
        Router { routes: Vec::new() }
    }

    /// Appends `pattern` and its intent `builder` to the registry.
    ///
    /// No uniqueness or conflict check is performed.
    pub fn add<V, S, F>(&mut self, builder: F, pattern: RoutePattern<V, S>)
    where
        V: CapturedValue,
        S: PatternState,
        F: Fn(V) -> I + Send + Sync + 'static,
    {
        trace!(" registering route: {}", pattern.template());
        let erased = pattern
            .map(V::into_captured, |captured: &Captured| {
                V::from_captured(captured.clone())
            })
            .cast_state::<Path>();
        self.routes.push(Route {
            pattern: erased,
            builder: Box::new(move |captured| V::from_captured(captured).map(&builder)),
        });
    }

    /// Parses `template` and appends it with a builder over the captured
    /// value.
    pub fn add_template<F>(&mut self, builder: F, template: &str) -> Result<(), TemplateError>
    where
        F: Fn(Captured) -> I + Send + Sync + 'static,
    {
        let pattern = template::parse(template)?;
        self.add(builder, pattern);
        Ok(())
    }

    /// Matches a URL against the registry in registration order.
    ///
    /// The first entry whose pattern consumes the whole path (or ends in a
    /// wildcard) and whose query constraints are satisfied produces the
    /// intent. `None` is the normal no-match outcome, not an error.
    pub fn match_url(&self, url: &str) -> Option<I> {
        self.match_components(RouteComponents::from_url(url))
    }

    /// Matches already-decomposed components in registration order.
    pub fn match_components(&self, components: RouteComponents) -> Option<I> {
        for route in &self.routes {
            if let Some((remaining, captured)) = route.pattern.parse(components.clone()) {
                if remaining.is_path_empty() || route.pattern.trailing_wildcard() {
                    if let Some(intent) = (route.builder)(captured) {
                        trace!(" matched route: {}", route.pattern.template());
                        return Some(intent);
                    }
                }
            }
        }
        trace!(" no route matched");
        None
    }
}

impl<I> Default for Router<I> {
    fn default() -> Self {
        Router::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::either::Either;
    use crate::pattern::path::{any, int, lit, string};
    use crate::pattern::{maybe, query};

    #[derive(Clone, Debug, PartialEq)]
    enum Intent {
        Empty,
        PathAndQueryParams(i64, String, i64, String),
        SingleParam(i64),
        TwoParams(i64, String),
        AnyMiddle,
        AnyMiddleParam(i64),
        AnyMiddleParams(i64, i64),
        AnyEnd,
        AnyEndParam(i64),
        AnyStart,
        AnyStartParam(i64),
        OrPattern,
        EitherIntOrString(Either<i64, String>),
        OptionalParam(Option<i64>),
        OptionalSecondParam(i64, Option<String>),
    }

    fn assert_match(router: &Router<Intent>, url: &str, expected: Intent) {
        assert_eq!(router.match_url(url), Some(expected), "url: {}", url);
    }

    fn assert_no_match(router: &Router<Intent>, url: &str) {
        assert_eq!(router.match_url(url), None, "url: {}", url);
    }

    #[test]
    fn simple_route() {
        let mut router = Router::new();
        router.add(|_| Intent::Empty, lit("recipes").then(lit("info")));

        assert_match(&router, "app://recipes/info", Intent::Empty);
        assert_no_match(&router, "app://recipes/data");
        assert_no_match(&router, "app://recipes");
        assert_no_match(&router, "app://recipes/info/123");
    }

    #[test]
    fn long_literal_chain() {
        let mut router = Router::new();
        router.add(
            |_| Intent::Empty,
            lit("recipes")
                .then(lit("info"))
                .then(lit("a"))
                .then(lit("b"))
                .then(lit("c"))
                .then(lit("d"))
                .then(lit("e"))
                .then(lit("f")),
        );

        assert_match(&router, "app://recipes/info/a/b/c/d/e/f", Intent::Empty);
    }

    #[test]
    fn path_params_with_query() {
        let mut router = Router::new();
        router.add(
            |(((id, name), recipe_id), t)| Intent::PathAndQueryParams(id, name, recipe_id, t),
            lit("recipes")
                .then(int())
                .zip(string())
                .with_query(query::int("recipeId"))
                .zip(query::string("t")),
        );

        let expected = Intent::PathAndQueryParams(123, "abc".to_string(), 456, "A".to_string());
        assert_match(&router, "app://recipes/123/abc?recipeId=456&t=A", expected.clone());
        // Query matching is order independent.
        assert_match(&router, "app://recipes/123/abc?t=A&recipeId=456", expected);

        assert_no_match(&router, "app://recipes/abc/abc?recipeId=456&t=A");
        assert_no_match(&router, "app://recipes/abc?recipeId=456&t=A");
        assert_no_match(&router, "app://recipes/123/abc?recipeId=abc&t=A");
        assert_no_match(&router, "app://recipes/123/abc?t=A");
        assert_no_match(&router, "app://recipes/123/abc?recipeId=abc");
    }

    #[test]
    fn typed_path_params() {
        let mut router = Router::new();
        router.add(Intent::SingleParam, lit("subscription").then(int()));

        assert_match(&router, "app://subscription/123", Intent::SingleParam(123));
        assert_no_match(&router, "app://subscription/abc");
        assert_no_match(&router, "app://subscription/true");
        assert_no_match(&router, "app://subscription/abc/123");

        router.add(
            |(id, name)| Intent::TwoParams(id, name),
            lit("subscription").then(int()).skip(lit("menu")).zip(string()),
        );
        assert_match(
            &router,
            "app://subscription/123/menu/abc",
            Intent::TwoParams(123, "abc".to_string()),
        );
        assert_no_match(&router, "app://subscription/abc/menu/123");
    }

    #[test]
    fn wildcard_in_the_middle() {
        let mut router = Router::new();
        router.add(
            |_| Intent::AnyMiddle,
            lit("recipes").then(lit("id")).then(any()).then(lit("data")).then(lit("abc")),
        );

        assert_match(&router, "app://recipes/id/123/foo/data/abc", Intent::AnyMiddle);
        assert_no_match(&router, "app://recipes/id/data/abc");

        let mut router = Router::new();
        router.add(
            Intent::AnyMiddleParam,
            lit("recipes")
                .then(lit("id"))
                .then(any())
                .then(int())
                .skip(lit("data"))
                .skip(lit("abc")),
        );
        assert_match(
            &router,
            "app://recipes/id/foo/123/data/abc",
            Intent::AnyMiddleParam(123),
        );
        assert_no_match(&router, "app://recipes/id/foo/123/456/data/abc");
        assert_no_match(&router, "app://recipes/id/123/data/abc");

        let mut router = Router::new();
        router.add(
            Intent::AnyMiddleParam,
            lit("recipes")
                .then(lit("id"))
                .then(any())
                .then(lit("data"))
                .then(int())
                .skip(lit("abc")),
        );
        assert_match(
            &router,
            "app://recipes/id/123/data/456/abc",
            Intent::AnyMiddleParam(456),
        );
        assert_no_match(&router, "app://recipes/id/foo/data/abc");

        let mut router = Router::new();
        router.add(
            Intent::AnyMiddleParam,
            lit("recipes")
                .then(lit("id"))
                .then(int())
                .skip(any())
                .skip(lit("data"))
                .skip(lit("abc")),
        );
        assert_match(
            &router,
            "app://recipes/id/123/abc/foo/data/abc",
            Intent::AnyMiddleParam(123),
        );
        assert_no_match(&router, "app://recipes/id/foo/data/abc");
    }

    #[test]
    fn wildcard_between_typed_params() {
        let mut router = Router::new();
        router.add(
            |(a, b)| Intent::AnyMiddleParams(a, b),
            lit("recipes")
                .then(lit("id"))
                .then(int())
                .skip(any())
                .skip(lit("data"))
                .zip(int())
                .skip(lit("abc")),
        );
        assert_match(
            &router,
            "app://recipes/id/123/foo/data/456/abc",
            Intent::AnyMiddleParams(123, 456),
        );

        let mut router = Router::new();
        router.add(
            |(a, b)| Intent::AnyMiddleParams(a, b),
            lit("recipes")
                .then(lit("id"))
                .then(int())
                .skip(any())
                .zip(int())
                .skip(lit("data"))
                .skip(lit("abc")),
        );
        assert_match(
            &router,
            "app://recipes/id/123/foo/456/data/abc",
            Intent::AnyMiddleParams(123, 456),
        );
    }

    #[test]
    fn wildcard_at_the_start() {
        let mut router = Router::new();
        router.add(|_| Intent::AnyStart, any().then(lit("data")).then(lit("abc")));

        assert_match(&router, "app://foo/123/data/abc", Intent::AnyStart);
        assert_match(&router, "app://data/data/abc", Intent::AnyStart);
        // The wildcard commits to the first `data` segment, stranding the
        // trailing one.
        assert_no_match(&router, "app://123/data/data/abc");

        let mut router = Router::new();
        router.add(
            Intent::AnyStartParam,
            any().then(int()).skip(lit("data")).skip(lit("abc")),
        );
        assert_match(&router, "app://foo/123/data/abc", Intent::AnyStartParam(123));

        let mut router = Router::new();
        router.add(
            Intent::AnyStartParam,
            any().then(lit("data")).then(int()).skip(lit("abc")),
        );
        assert_match(&router, "app://foo/data/123/abc", Intent::AnyStartParam(123));
    }

    #[test]
    fn wildcard_at_the_end() {
        let mut router = Router::new();
        router.add(|_| Intent::AnyEnd, lit("data").then(any()));

        assert_match(&router, "app://data/abc/123/456", Intent::AnyEnd);
        // A trailing wildcard accepts an empty remainder.
        assert_match(&router, "app://data", Intent::AnyEnd);

        let mut router = Router::new();
        router.add(|_| Intent::AnyEnd, lit("data").then(lit("abc")).then(any()));
        assert_match(&router, "app://data/abc/123/456", Intent::AnyEnd);
        assert_match(&router, "app://data/abc/data/abc", Intent::AnyEnd);

        let mut router = Router::new();
        router.add(
            Intent::AnyEndParam,
            lit("data").then(lit("abc")).then(int()).skip(any()),
        );
        assert_match(&router, "app://data/abc/123/456/abc", Intent::AnyEndParam(123));

        let mut router = Router::new();
        router.add(
            Intent::AnyEndParam,
            lit("data").then(int()).skip(lit("abc")).skip(any()),
        );
        assert_match(&router, "app://data/123/abc/456/abc", Intent::AnyEndParam(123));
    }

    #[test]
    fn wildcard_before_query() {
        let mut router = Router::new();
        router.add(
            Intent::AnyEndParam,
            lit("data").then(lit("abc")).then(any()).query(query::int("id")),
        );
        assert_match(&router, "app://data/abc/123/foo?id=1", Intent::AnyEndParam(1));
    }

    #[test]
    fn alternation_in_path() {
        let mut router = Router::new();
        router.add(
            |_| Intent::OrPattern,
            lit("recipes").then(lit("data").or(lit("info"))),
        );

        assert_match(&router, "app://recipes/data", Intent::OrPattern);
        assert_match(&router, "app://recipes/info", Intent::OrPattern);
        assert_no_match(&router, "app://recipes/foo");

        router.add(
            Intent::EitherIntOrString,
            lit("recipes").then(int().skip(lit("info")).or_either(lit("data").then(string()))),
        );
        assert_match(
            &router,
            "app://recipes/data/abc",
            Intent::EitherIntOrString(Either::Right("abc".to_string())),
        );
        assert_match(
            &router,
            "app://recipes/123/info",
            Intent::EitherIntOrString(Either::Left(123)),
        );
    }

    #[test]
    fn alternation_in_query() {
        let mut router = Router::new();
        router.add(
            Intent::EitherIntOrString,
            lit("recipes").query(query::int("info").or_either(query::string("data"))),
        );

        assert_match(
            &router,
            "app://recipes?data=abc",
            Intent::EitherIntOrString(Either::Right("abc".to_string())),
        );
        assert_match(
            &router,
            "app://recipes?info=123",
            Intent::EitherIntOrString(Either::Left(123)),
        );

        router.add(
            Intent::EitherIntOrString,
            lit("recipes").query(
                lit("info")
                    .query(query::int("recipeId"))
                    .or_either(lit("data").query(query::string("id"))),
            ),
        );
        assert_match(
            &router,
            "app://recipes/data?id=abc",
            Intent::EitherIntOrString(Either::Right("abc".to_string())),
        );
        assert_match(
            &router,
            "app://recipes/info?recipeId=123",
            Intent::EitherIntOrString(Either::Left(123)),
        );
    }

    #[test]
    fn optional_path_elements() {
        let mut router = Router::new();
        router.add(
            |_| Intent::Empty,
            lit("recipes").skip_opt(lit("data")).then(lit("info")),
        );

        assert_match(&router, "app://recipes/data/info", Intent::Empty);
        assert_match(&router, "app://recipes/info", Intent::Empty);
        assert_no_match(&router, "app://recipes/foo/info");
        assert_no_match(&router, "app://recipes/data/abc/info");

        let mut router = Router::new();
        router.add(
            Intent::OptionalParam,
            lit("recipes").then(maybe(int())).skip(lit("info")),
        );

        assert_match(&router, "app://recipes/123/info", Intent::OptionalParam(Some(123)));
        assert_match(&router, "app://recipes/info", Intent::OptionalParam(None));
        assert_no_match(&router, "app://recipes/foo/info");
        assert_no_match(&router, "app://recipes/123/abc/info");
    }

    #[test]
    fn optional_query_params() {
        let mut router = Router::new();
        router.add(
            Intent::OptionalParam,
            lit("recipes").query(maybe(query::int("recipeId"))),
        );
        assert_match(&router, "app://recipes?recipeId=123", Intent::OptionalParam(Some(123)));
        assert_match(&router, "app://recipes", Intent::OptionalParam(None));

        let mut router = Router::new();
        router.add(
            |(id, locale)| Intent::OptionalSecondParam(id, locale),
            lit("recipes")
                .query(query::int("recipeId"))
                .zip(maybe(query::string("locale"))),
        );
        assert_match(
            &router,
            "app://recipes?recipeId=123&locale=en",
            Intent::OptionalSecondParam(123, Some("en".to_string())),
        );
        assert_match(
            &router,
            "app://recipes?recipeId=123",
            Intent::OptionalSecondParam(123, None),
        );
    }

    #[test]
    fn first_registered_match_wins() {
        let mut router = Router::new();
        router.add(Intent::SingleParam, lit("recipes").then(int()));
        router.add(Intent::AnyMiddleParam, lit("recipes").then(int()));

        // Both entries accept the input; the earlier registration wins.
        assert_match(&router, "app://recipes/123", Intent::SingleParam(123));
    }

    #[test]
    fn empty_router_matches_nothing() {
        let router: Router<Intent> = Router::new();
        assert_no_match(&router, "app://recipes/info");
    }

    #[test]
    fn template_registered_routes_match() {
        let mut router = Router::new();
        router
            .add_template(
                |captured| match i64::from_captured(captured) {
                    Some(id) => Intent::SingleParam(id),
                    None => Intent::Empty,
                },
                "subscription/:int",
            )
            .unwrap();

        assert_match(&router, "app://subscription/42", Intent::SingleParam(42));
        assert_no_match(&router, "app://subscription/abc");
    }
}
