//! Signpost &ndash; a bidirectional deep link router that derives URL parsing
//! and printing from one route description.
//!
//! A [`RoutePattern`](pattern::RoutePattern) is a single declarative value
//! that both parses a URL's routable parts into a typed application value and
//! prints such a value back into URL components, with the two directions
//! guaranteed to round-trip by construction. Patterns are built from
//! primitive matchers and composition operators, rendered to textual
//! templates, and reconstructed from those templates by the
//! [`template`] parser. A [`Router`](router::Router) pairs patterns with
//! intent builders and answers the first match for an incoming URL, in
//! registration order.
//!
//! # Examples
//!
//! ```rust
//! use signpost::pattern::path::{int, lit};
//! use signpost::router::Router;
//!
//! #[derive(Debug, PartialEq)]
//! enum Intent {
//!     Recipe(i64),
//! }
//!
//! let mut router = Router::new();
//! router.add(Intent::Recipe, lit("recipes").then(int()));
//!
//! assert_eq!(router.match_url("app://recipes/42"), Some(Intent::Recipe(42)));
//! assert_eq!(router.match_url("app://recipes/nan"), None);
//! ```
#![warn(missing_docs, deprecated)]
#![doc(test(no_crate_inject, attr(deny(warnings))))]

pub mod helpers;
pub mod pattern;
pub mod prelude;
pub mod router;
pub mod template;

pub use crate::helpers::url::RouteComponents;
pub use crate::pattern::RoutePattern;
pub use crate::router::Router;
