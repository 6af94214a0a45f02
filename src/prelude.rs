//! A collection of commonly used items, re-exported.

pub use crate::helpers::url::RouteComponents;
pub use crate::pattern::captured::{Captured, CapturedValue};
pub use crate::pattern::either::Either;
pub use crate::pattern::{maybe, path, query, Path, PatternState, Query, RoutePattern};
pub use crate::router::Router;
pub use crate::template::TemplateError;
