//! Defines `Either`, the value produced by either-alternation.

/// A two-variant tagged value preserving which alternation branch matched.
///
/// Produced by [`or_either`](crate::pattern::RoutePattern::or_either) when
/// the two branches capture differing types; plain
/// [`or`](crate::pattern::RoutePattern::or) discards this information when
/// both branches already produce the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Either<A, B> {
    /// The left branch matched.
    Left(A),
    /// The right branch matched.
    Right(B),
}

impl<A, B> Either<A, B> {
    /// True if the left branch matched.
    pub fn is_left(&self) -> bool {
        matches!(self, Either::Left(_))
    }

    /// True if the right branch matched.
    pub fn is_right(&self) -> bool {
        !self.is_left()
    }
}
