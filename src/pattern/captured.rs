//! Type-erased captured values.
//!
//! Patterns built by the [`template`](crate::template) parser have no static
//! value types to compose with, so their fragments all produce [`Captured`]
//! values: a closed sum covering every shape a route pattern can capture.
//! [`CapturedValue`] converts between statically typed values and their
//! erased form; `Router::add` uses it to erase typed patterns into the
//! registry, always via an explicit fallible conversion rather than a cast.

use crate::pattern::either::Either;

/// A captured value with its static type erased into a closed sum.
///
/// The shape mirrors what the equivalent hand-built typed pattern would
/// capture: unit values are dropped when pairing, so a pattern of literals
/// around a single `:int` captures a bare `Int` rather than a tuple of
/// units.
#[derive(Clone, Debug, PartialEq)]
pub enum Captured {
    /// No captured value (literals, wildcards).
    Unit,
    /// An integer parameter.
    Int(i64),
    /// A floating-point parameter.
    Double(f64),
    /// A boolean parameter.
    Bool(bool),
    /// A string parameter.
    String(String),
    /// Both sides of a sequential join.
    Pair(Box<Captured>, Box<Captured>),
    /// The left branch of an either-alternation.
    Left(Box<Captured>),
    /// The right branch of an either-alternation.
    Right(Box<Captured>),
    /// An optional element that did not match.
    Absent,
}

impl Captured {
    /// Joins two captured values, dropping units so captures keep the shape
    /// of the equivalent typed pattern.
    pub fn flatten(lhs: Captured, rhs: Captured) -> Captured {
        match (lhs, rhs) {
            (Captured::Unit, rhs) => rhs,
            (lhs, Captured::Unit) => lhs,
            (lhs, rhs) => Captured::Pair(Box::new(lhs), Box::new(rhs)),
        }
    }

    /// Shorthand for building a pair without the unit-dropping of
    /// [`flatten`](Captured::flatten).
    pub fn pair(lhs: Captured, rhs: Captured) -> Captured {
        Captured::Pair(Box::new(lhs), Box::new(rhs))
    }
}

/// Conversion between a statically typed captured value and [`Captured`].
///
/// Implemented for the value shapes route patterns produce: unit, the four
/// scalars, pairs, [`Either`], `Option` and `Captured` itself.
pub trait CapturedValue: Sized + 'static {
    /// Erases the value.
    fn into_captured(self) -> Captured;

    /// Recovers the value; fails if the erased shape does not fit.
    fn from_captured(captured: Captured) -> Option<Self>;
}

impl CapturedValue for () {
    fn into_captured(self) -> Captured {
        Captured::Unit
    }

    fn from_captured(captured: Captured) -> Option<Self> {
        match captured {
            Captured::Unit => Some(()),
            _ => None,
        }
    }
}

impl CapturedValue for i64 {
    fn into_captured(self) -> Captured {
        Captured::Int(self)
    }

    fn from_captured(captured: Captured) -> Option<Self> {
        match captured {
            Captured::Int(value) => Some(value),
            _ => None,
        }
    }
}

impl CapturedValue for f64 {
    fn into_captured(self) -> Captured {
        Captured::Double(self)
    }

    fn from_captured(captured: Captured) -> Option<Self> {
        match captured {
            Captured::Double(value) => Some(value),
            _ => None,
        }
    }
}

impl CapturedValue for bool {
    fn into_captured(self) -> Captured {
        Captured::Bool(self)
    }

    fn from_captured(captured: Captured) -> Option<Self> {
        match captured {
            Captured::Bool(value) => Some(value),
            _ => None,
        }
    }
}

impl CapturedValue for String {
    fn into_captured(self) -> Captured {
        Captured::String(self)
    }

    fn from_captured(captured: Captured) -> Option<Self> {
        match captured {
            Captured::String(value) => Some(value),
            _ => None,
        }
    }
}

impl CapturedValue for Captured {
    fn into_captured(self) -> Captured {
        self
    }

    fn from_captured(captured: Captured) -> Option<Self> {
        Some(captured)
    }
}

impl<A, B> CapturedValue for (A, B)
where
    A: CapturedValue,
    B: CapturedValue,
{
    fn into_captured(self) -> Captured {
        Captured::flatten(self.0.into_captured(), self.1.into_captured())
    }

    fn from_captured(captured: Captured) -> Option<Self> {
        if let Captured::Pair(lhs, rhs) = &captured {
            if let (Some(a), Some(b)) = (
                A::from_captured((**lhs).clone()),
                B::from_captured((**rhs).clone()),
            ) {
                return Some((a, b));
            }
        }
        // One side of the pair was a dropped unit.
        if let Some(a) = A::from_captured(Captured::Unit) {
            if let Some(b) = B::from_captured(captured.clone()) {
                return Some((a, b));
            }
        }
        let a = A::from_captured(captured)?;
        let b = B::from_captured(Captured::Unit)?;
        Some((a, b))
    }
}

impl<A, B> CapturedValue for Either<A, B>
where
    A: CapturedValue,
    B: CapturedValue,
{
    fn into_captured(self) -> Captured {
        match self {
            Either::Left(value) => Captured::Left(Box::new(value.into_captured())),
            Either::Right(value) => Captured::Right(Box::new(value.into_captured())),
        }
    }

    fn from_captured(captured: Captured) -> Option<Self> {
        match captured {
            Captured::Left(inner) => A::from_captured(*inner).map(Either::Left),
            Captured::Right(inner) => B::from_captured(*inner).map(Either::Right),
            _ => None,
        }
    }
}

impl<T> CapturedValue for Option<T>
where
    T: CapturedValue,
{
    fn into_captured(self) -> Captured {
        match self {
            Some(value) => value.into_captured(),
            None => Captured::Absent,
        }
    }

    fn from_captured(captured: Captured) -> Option<Self> {
        match captured {
            Captured::Absent => Some(None),
            other => T::from_captured(other).map(Some),
        }
    }
}
