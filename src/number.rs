//! Exact numbers used by the domains.
//!
//! Every domain in this crate is generic over a [`Numeric`] type: an exact,
//! totally ordered ring with signs. Two instantiations are provided, both
//! arbitrary precision:
//!
//! - [`BigInt`] (integers `Z`): division truncates toward zero, and the
//!   number line is discrete (`successor`/`predecessor` exist);
//! - [`BigRational`] (rationals `Q`): division is exact, and the number
//!   line is dense (`successor`/`predecessor` do not exist).
//!
//! The discreteness witness is what lets generic code (the constraint
//! solver, constraint negation) refine integer states strictly tighter
//! than rational ones without any type-level dispatch.

use std::fmt::{Debug, Display};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};

/// An exact number: the scalar type underneath bounds and intervals.
pub trait Numeric: Clone + Ord + Debug + Display + Signed {
    /// Embed a machine integer.
    fn from_i64(n: i64) -> Self;

    /// The next value up, for discrete number lines; `None` for dense ones.
    fn successor(&self) -> Option<Self>;

    /// The next value down, for discrete number lines; `None` for dense ones.
    fn predecessor(&self) -> Option<Self>;
}

impl Numeric for BigInt {
    fn from_i64(n: i64) -> Self {
        BigInt::from(n)
    }

    fn successor(&self) -> Option<Self> {
        Some(self.clone() + BigInt::one())
    }

    fn predecessor(&self) -> Option<Self> {
        Some(self.clone() - BigInt::one())
    }
}

impl Numeric for BigRational {
    fn from_i64(n: i64) -> Self {
        BigRational::from_integer(BigInt::from(n))
    }

    fn successor(&self) -> Option<Self> {
        None
    }

    fn predecessor(&self) -> Option<Self> {
        None
    }
}

/// Smallest `2^k - 1` that is `>= n`, for non-negative `n`.
///
/// Used to over-approximate bitwise `or`: every bit position that is set
/// anywhere below `n` fits inside this all-ones mask.
pub fn fill_ones(n: &BigInt) -> BigInt {
    debug_assert!(!n.is_negative());
    (BigInt::one() << (n.bits() as usize)) - BigInt::one()
}

/// Round a rational toward minus infinity, yielding an integer.
pub fn round_to_lower(q: &BigRational) -> BigInt {
    q.floor().to_integer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn fill_ones_covers_the_bit_width() {
        assert_eq!(fill_ones(&BigInt::zero()), BigInt::zero());
        assert_eq!(fill_ones(&BigInt::from(1)), BigInt::from(1));
        assert_eq!(fill_ones(&BigInt::from(5)), BigInt::from(7));
        assert_eq!(fill_ones(&BigInt::from(7)), BigInt::from(7));
        assert_eq!(fill_ones(&BigInt::from(8)), BigInt::from(15));
    }

    #[test]
    fn rational_rounding_goes_down() {
        let q = BigRational::new(BigInt::from(-7), BigInt::from(2));
        assert_eq!(round_to_lower(&q), BigInt::from(-4));
        let q = BigRational::new(BigInt::from(7), BigInt::from(2));
        assert_eq!(round_to_lower(&q), BigInt::from(3));
    }

    #[test]
    fn discreteness_witnesses() {
        assert_eq!(BigInt::from(3).successor(), Some(BigInt::from(4)));
        assert_eq!(BigRational::from_i64(3).successor(), None);
    }
}
