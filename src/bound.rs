//! Extended bounds: a number, or an infinity of either sign.
//!
//! [`Bound`] closes a [`Numeric`] type under the two infinities so that
//! interval endpoints are always representable. Arithmetic is total except
//! for two cases inherited from the mathematics itself:
//!
//! - `(+oo) + (-oo)` is undefined;
//! - division by a zero bound is undefined.
//!
//! The plain operations ([`Bound::add`], [`Bound::div`]) panic on those
//! inputs; callers that cannot rule them out use [`Bound::checked_add`] /
//! [`Bound::checked_div`] and handle the [`DomainError`] explicitly. Inside
//! this crate the interval constructors keep the invariant that a non-empty
//! interval never has a `+oo` lower or a `-oo` upper bound, which is what
//! makes the interval transfer functions total.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::error::DomainError;
use crate::number::{round_to_lower, Numeric};

/// An extended number: `-oo`, a finite value, or `+oo`.
///
/// The derived order is total, with `-oo < finite < +oo` and finite bounds
/// ordered by their values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bound<N> {
    MinusInf,
    Finite(N),
    PlusInf,
}

impl<N: Numeric> Bound<N> {
    /// The bound holding the number zero.
    pub fn zero() -> Self {
        Bound::Finite(N::zero())
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Bound::Finite(_))
    }

    pub fn is_infinite(&self) -> bool {
        !self.is_finite()
    }

    pub fn is_plus_infinity(&self) -> bool {
        matches!(self, Bound::PlusInf)
    }

    pub fn is_minus_infinity(&self) -> bool {
        matches!(self, Bound::MinusInf)
    }

    /// The finite value, if there is one.
    pub fn number(&self) -> Option<&N> {
        match self {
            Bound::Finite(n) => Some(n),
            _ => None,
        }
    }

    /// Sign of the bound: `-1`, `0` (finite zero only), or `1`.
    fn sign(&self) -> i8 {
        match self {
            Bound::MinusInf => -1,
            Bound::PlusInf => 1,
            Bound::Finite(n) => {
                if n.is_negative() {
                    -1
                } else if n.is_positive() {
                    1
                } else {
                    0
                }
            }
        }
    }

    fn infinity_of_sign(sign: i8) -> Self {
        if sign < 0 {
            Bound::MinusInf
        } else {
            Bound::PlusInf
        }
    }

    pub fn neg(&self) -> Self {
        match self {
            Bound::MinusInf => Bound::PlusInf,
            Bound::Finite(n) => Bound::Finite(-n.clone()),
            Bound::PlusInf => Bound::MinusInf,
        }
    }

    /// Addition, defined everywhere except on opposite infinities.
    ///
    /// # Panics
    ///
    /// Panics on `(+oo) + (-oo)`; use [`Bound::checked_add`] when the
    /// operands are not known to exclude that case.
    pub fn add(&self, other: &Self) -> Self {
        match self.checked_add(other) {
            Ok(b) => b,
            Err(e) => panic!("{e}"),
        }
    }

    /// Addition acknowledging the undefined case at the call site.
    pub fn checked_add(&self, other: &Self) -> Result<Self, DomainError> {
        use Bound::*;
        match (self, other) {
            (Finite(a), Finite(b)) => Ok(Finite(a.clone() + b.clone())),
            (Finite(_), inf) => Ok(inf.clone()),
            (inf, Finite(_)) => Ok(inf.clone()),
            (PlusInf, PlusInf) => Ok(PlusInf),
            (MinusInf, MinusInf) => Ok(MinusInf),
            _ => Err(DomainError::OppositeInfinities),
        }
    }

    /// Subtraction: `a - b = a + (-b)`.
    ///
    /// # Panics
    ///
    /// Panics when the sum of `a` and `-b` pairs opposite infinities.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Multiplication. A finite zero absorbs either infinity.
    pub fn mul(&self, other: &Self) -> Self {
        use Bound::*;
        if other.sign() == 0 {
            return other.clone();
        }
        if self.sign() == 0 {
            return self.clone();
        }
        match (self, other) {
            (Finite(a), Finite(b)) => Finite(a.clone() * b.clone()),
            _ => Self::infinity_of_sign(self.sign() * other.sign()),
        }
    }

    /// Division.
    ///
    /// `finite / oo` is zero only for a zero dividend; otherwise it is the
    /// infinity with the product sign, an over-approximation accepted by
    /// callers that gate on singleton divisors. `oo / oo` likewise.
    ///
    /// # Panics
    ///
    /// Panics when the divisor is a zero bound; use [`Bound::checked_div`]
    /// when the divisor is not known to be nonzero.
    pub fn div(&self, other: &Self) -> Self {
        match self.checked_div(other) {
            Ok(b) => b,
            Err(e) => panic!("{e}"),
        }
    }

    /// Division acknowledging the zero-divisor case at the call site.
    pub fn checked_div(&self, other: &Self) -> Result<Self, DomainError> {
        use Bound::*;
        if other.sign() == 0 {
            return Err(DomainError::DivisionByZero);
        }
        Ok(match (self, other) {
            (Finite(a), Finite(b)) => Finite(a.clone() / b.clone()),
            (Finite(_), _) => {
                // finite / oo
                if self.sign() == 0 {
                    self.clone()
                } else {
                    Self::infinity_of_sign(self.sign() * other.sign())
                }
            }
            // oo / finite and oo / oo: the sign rule covers both.
            _ => Self::infinity_of_sign(self.sign() * other.sign()),
        })
    }

    pub fn min(x: Self, y: Self) -> Self {
        if x <= y {
            x
        } else {
            y
        }
    }

    pub fn max(x: Self, y: Self) -> Self {
        if x <= y {
            y
        } else {
            x
        }
    }

    pub fn abs(&self) -> Self {
        if *self >= Self::zero() {
            self.clone()
        } else {
            self.neg()
        }
    }
}

impl<N: Numeric> From<N> for Bound<N> {
    fn from(n: N) -> Self {
        Bound::Finite(n)
    }
}

/// Rational bounds convert to integer bounds by rounding toward `-oo`.
impl From<Bound<BigRational>> for Bound<BigInt> {
    fn from(b: Bound<BigRational>) -> Self {
        match b {
            Bound::MinusInf => Bound::MinusInf,
            Bound::PlusInf => Bound::PlusInf,
            Bound::Finite(q) => Bound::Finite(round_to_lower(&q)),
        }
    }
}

impl From<Bound<BigInt>> for Bound<BigRational> {
    fn from(b: Bound<BigInt>) -> Self {
        match b {
            Bound::MinusInf => Bound::MinusInf,
            Bound::PlusInf => Bound::PlusInf,
            Bound::Finite(z) => Bound::Finite(BigRational::from_integer(z)),
        }
    }
}

impl<N: fmt::Display> fmt::Display for Bound<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::MinusInf => write!(f, "-oo"),
            Bound::Finite(n) => write!(f, "{n}"),
            Bound::PlusInf => write!(f, "+oo"),
        }
    }
}
