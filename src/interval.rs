//! The interval abstract value.
//!
//! An [`Interval`] is a pair of extended bounds `[lb, ub]` denoting the set
//! `{ x : lb <= x <= ub }`. The lattice:
//!
//! - **Order**: `[l1, u1] ⊑ [l2, u2]` iff `l2 <= l1` and `u1 <= u2`.
//! - **Join**: `[min(l1, l2), max(u1, u2)]` (convex hull).
//! - **Meet**: `[max(l1, l2), min(u1, u2)]` (intersection).
//! - **Top**: `[-oo, +oo]`. **Bottom**: the empty interval.
//! - **Widening**: a bound that grew between iterates jumps to its
//!   infinity (or, with thresholds, to the nearest landmark), so ascending
//!   chains stabilize after at most two moves per side.
//! - **Narrowing**: an infinite bound may be tightened back to a finite
//!   one exactly once per side.
//!
//! # Invariants
//!
//! - Every constructor normalizes an empty pair (`lb > ub`, or an interval
//!   pinned to a single infinity) to the canonical bottom `[0, -1]`, so
//!   structural equality is semantic equality.
//! - A non-bottom interval never has a `+oo` lower or a `-oo` upper bound,
//!   which keeps all bound arithmetic used here away from its two
//!   undefined cases.
//!
//! Division and the bitwise family live behind [`IntervalOps`]: the
//! defaults are the sound "know nothing" answers, and the integer
//! instantiation replaces them with the precise case splits. The interval
//! carries no bit width, so several unsigned/bitwise cases stay at top by
//! design.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::bound::Bound;
use crate::lattice::Lattice;
use crate::number::{fill_ones, Numeric};
use crate::thresholds::{Thresholds, WidenWithThresholds};

/// Shift amounts above this many bits yield top instead of an enormous
/// exact factor.
const MAX_SHIFT: u64 = 128;

/// A closed interval over extended bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval<N> {
    lb: Bound<N>,
    ub: Bound<N>,
}

impl<N: Numeric> Interval<N> {
    /// Build an interval, normalizing every empty form to bottom.
    pub fn new(lb: Bound<N>, ub: Bound<N>) -> Self {
        if lb > ub || lb.is_plus_infinity() || ub.is_minus_infinity() {
            Self::bottom()
        } else {
            Interval { lb, ub }
        }
    }

    /// The interval holding exactly `n`.
    pub fn singleton_of(n: N) -> Self {
        Interval { lb: Bound::Finite(n.clone()), ub: Bound::Finite(n) }
    }

    /// A one-point interval from a bound; an infinite bound has no points,
    /// so the result is bottom.
    pub fn from_bound(b: Bound<N>) -> Self {
        match b {
            Bound::Finite(n) => Self::singleton_of(n),
            _ => Self::bottom(),
        }
    }

    pub fn lb(&self) -> &Bound<N> {
        &self.lb
    }

    pub fn ub(&self) -> &Bound<N> {
        &self.ub
    }

    /// The half-line `[-oo, ub]` through this interval.
    pub fn lower_half_line(&self) -> Self {
        if self.is_bottom() {
            return self.clone();
        }
        Interval::new(Bound::MinusInf, self.ub.clone())
    }

    /// The half-line `[lb, +oo]` through this interval.
    pub fn upper_half_line(&self) -> Self {
        if self.is_bottom() {
            return self.clone();
        }
        Interval::new(self.lb.clone(), Bound::PlusInf)
    }

    /// The single value of a one-point interval.
    pub fn singleton(&self) -> Option<&N> {
        if !self.is_bottom() && self.lb == self.ub {
            self.lb.number()
        } else {
            None
        }
    }

    /// Membership test.
    pub fn contains(&self, n: &N) -> bool {
        if self.is_bottom() {
            return false;
        }
        let b = Bound::Finite(n.clone());
        self.lb <= b && b <= self.ub
    }

    /// Widening toward landmark values: a growing bound snaps to the
    /// nearest threshold instead of all the way to its infinity.
    pub fn widening_thresholds(&self, other: &Self, ts: &Thresholds<N>) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        let lb = if other.lb < self.lb { ts.get_prev(&other.lb) } else { self.lb.clone() };
        let ub = if self.ub < other.ub { ts.get_next(&other.ub) } else { self.ub.clone() };
        Interval::new(lb, ub)
    }

    /// Remove `c` when it sits exactly on an endpoint. Only discrete
    /// number lines can trim (dense ones have no adjacent value).
    pub fn trim(&self, c: &N) -> Self {
        if self.is_bottom() {
            return self.clone();
        }
        let b = Bound::Finite(c.clone());
        if self.lb == b {
            match c.successor() {
                Some(next) => Interval::new(Bound::Finite(next), self.ub.clone()),
                None => self.clone(),
            }
        } else if self.ub == b {
            match c.predecessor() {
                Some(prev) => Interval::new(self.lb.clone(), Bound::Finite(prev)),
                None => self.clone(),
            }
        } else {
            self.clone()
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom();
        }
        Interval::new(self.lb.add(&other.lb), self.ub.add(&other.ub))
    }

    pub fn sub(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom();
        }
        Interval::new(self.lb.sub(&other.ub), self.ub.sub(&other.lb))
    }

    pub fn neg(&self) -> Self {
        if self.is_bottom() {
            return self.clone();
        }
        Interval::new(self.ub.neg(), self.lb.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom();
        }
        let ll = self.lb.mul(&other.lb);
        let lu = self.lb.mul(&other.ub);
        let ul = self.ub.mul(&other.lb);
        let uu = self.ub.mul(&other.ub);
        Interval::new(
            Bound::min(Bound::min(ll.clone(), lu.clone()), Bound::min(ul.clone(), uu.clone())),
            Bound::max(Bound::max(ll, lu), Bound::max(ul, uu)),
        )
    }
}

impl<N: Numeric> Lattice for Interval<N> {
    fn top() -> Self {
        Interval { lb: Bound::MinusInf, ub: Bound::PlusInf }
    }

    fn bottom() -> Self {
        Interval {
            lb: Bound::Finite(N::zero()),
            ub: Bound::Finite(-N::one()),
        }
    }

    fn is_top(&self) -> bool {
        self.lb.is_infinite() && self.ub.is_infinite()
    }

    fn is_bottom(&self) -> bool {
        self.lb > self.ub
    }

    fn leq(&self, other: &Self) -> bool {
        if self.is_bottom() {
            true
        } else if other.is_bottom() {
            false
        } else {
            other.lb <= self.lb && self.ub <= other.ub
        }
    }

    fn join(&self, other: &Self) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        Interval::new(
            Bound::min(self.lb.clone(), other.lb.clone()),
            Bound::max(self.ub.clone(), other.ub.clone()),
        )
    }

    fn meet(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom();
        }
        Interval::new(
            Bound::max(self.lb.clone(), other.lb.clone()),
            Bound::min(self.ub.clone(), other.ub.clone()),
        )
    }

    fn widen(&self, other: &Self) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        Interval::new(
            if other.lb < self.lb { Bound::MinusInf } else { self.lb.clone() },
            if self.ub < other.ub { Bound::PlusInf } else { self.ub.clone() },
        )
    }

    fn narrow(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom();
        }
        Interval::new(
            if self.lb.is_infinite() && other.lb.is_finite() {
                other.lb.clone()
            } else {
                self.lb.clone()
            },
            if self.ub.is_infinite() && other.ub.is_finite() {
                other.ub.clone()
            } else {
                self.ub.clone()
            },
        )
    }
}

impl<N: Numeric> WidenWithThresholds<N> for Interval<N> {
    fn widening_thresholds(&self, other: &Self, ts: &Thresholds<N>) -> Self {
        Interval::widening_thresholds(self, other, ts)
    }
}

impl<N: Numeric + fmt::Display> fmt::Display for Interval<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bottom() {
            write!(f, "_|_")
        } else {
            write!(f, "[{}, {}]", self.lb, self.ub)
        }
    }
}

/// Number-specific interval operations.
///
/// The provided defaults are the sound answers available without knowing
/// anything about the number line: bottom stays bottom, everything else is
/// top. The integer instantiation overrides nearly all of them with the
/// precise case splits; the rational one only supplies division. This is
/// the seam where per-number specialization happens.
pub trait IntervalOps: Numeric {
    /// Signed division.
    fn div(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self>;

    /// Unsigned division. Without a bit width there is no sound way to
    /// reinterpret signed ranges, so the default stays top.
    fn udiv(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        top_unless_bottom(lhs, rhs)
    }

    /// Signed (truncated) remainder.
    fn srem(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        top_unless_bottom(lhs, rhs)
    }

    /// Unsigned remainder.
    fn urem(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        top_unless_bottom(lhs, rhs)
    }

    fn and(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        top_unless_bottom(lhs, rhs)
    }

    fn or(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        top_unless_bottom(lhs, rhs)
    }

    fn xor(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        top_unless_bottom(lhs, rhs)
    }

    fn shl(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        top_unless_bottom(lhs, rhs)
    }

    fn lshr(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        top_unless_bottom(lhs, rhs)
    }

    fn ashr(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        top_unless_bottom(lhs, rhs)
    }
}

fn top_unless_bottom<N: Numeric>(lhs: &Interval<N>, rhs: &Interval<N>) -> Interval<N> {
    if lhs.is_bottom() || rhs.is_bottom() {
        Interval::bottom()
    } else {
        Interval::top()
    }
}

impl<N: IntervalOps> Interval<N> {
    pub fn div(&self, other: &Self) -> Self {
        // Qualified: `N::div` would also resolve to the scalar `Div`.
        <N as IntervalOps>::div(self, other)
    }

    pub fn udiv(&self, other: &Self) -> Self {
        N::udiv(self, other)
    }

    pub fn srem(&self, other: &Self) -> Self {
        N::srem(self, other)
    }

    pub fn urem(&self, other: &Self) -> Self {
        N::urem(self, other)
    }

    pub fn and(&self, other: &Self) -> Self {
        N::and(self, other)
    }

    pub fn or(&self, other: &Self) -> Self {
        N::or(self, other)
    }

    pub fn xor(&self, other: &Self) -> Self {
        N::xor(self, other)
    }

    pub fn shl(&self, other: &Self) -> Self {
        N::shl(self, other)
    }

    pub fn lshr(&self, other: &Self) -> Self {
        N::lshr(self, other)
    }

    pub fn ashr(&self, other: &Self) -> Self {
        N::ashr(self, other)
    }
}

/// The exact shift factor `2^k`, when the shift amount is a usable
/// singleton. Negative shifts and shifts above [`MAX_SHIFT`] are refused.
fn shift_factor(amount: &Interval<BigInt>) -> Option<BigInt> {
    let k = amount.singleton()?;
    if k.is_negative() {
        return None;
    }
    let k = k.to_u64().filter(|&k| k <= MAX_SHIFT)?;
    Some(BigInt::one() << (k as usize))
}

impl IntervalOps for BigInt {
    fn div(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        if lhs.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        // The linear solver performs many divisions by singleton
        // intervals; resolve those without the general split.
        if let Some(c) = rhs.singleton() {
            if c.is_zero() {
                return Interval::bottom();
            }
            if c.is_one() {
                return lhs.clone();
            }
            let c = Bound::Finite(c.clone());
            return if c > Bound::zero() {
                Interval::new(lhs.lb.div(&c), lhs.ub.div(&c))
            } else {
                Interval::new(lhs.ub.div(&c), lhs.lb.div(&c))
            };
        }
        let zero = BigInt::zero();
        if rhs.contains(&zero) {
            // Split the divisor around zero and take the hull of both
            // halves; an empty half divides to bottom and drops out.
            let negative = Interval::new(rhs.lb.clone(), Bound::Finite(BigInt::from(-1)));
            let positive = Interval::new(Bound::Finite(BigInt::one()), rhs.ub.clone());
            return lhs.div(&negative).join(&lhs.div(&positive));
        }
        if lhs.contains(&zero) {
            let negative = Interval::new(lhs.lb.clone(), Bound::Finite(BigInt::from(-1)));
            let positive = Interval::new(Bound::Finite(BigInt::one()), lhs.ub.clone());
            return negative
                .div(rhs)
                .join(&positive.div(rhs))
                .join(&Interval::singleton_of(zero));
        }
        // Neither operand contains zero. A strictly negative dividend is
        // first shifted one divisor-step toward zero to compensate for
        // truncation before taking endpoint quotients.
        let one = Interval::singleton_of(BigInt::one());
        let dividend = if lhs.ub < Bound::zero() {
            let correction = if rhs.ub < Bound::zero() { rhs.add(&one) } else { one.sub(rhs) };
            lhs.add(&correction)
        } else {
            lhs.clone()
        };
        let ll = dividend.lb.div(&rhs.lb);
        let lu = dividend.lb.div(&rhs.ub);
        let ul = dividend.ub.div(&rhs.lb);
        let uu = dividend.ub.div(&rhs.ub);
        Interval::new(
            Bound::min(Bound::min(ll.clone(), lu.clone()), Bound::min(ul.clone(), uu.clone())),
            Bound::max(Bound::max(ll, lu), Bound::max(ul, uu)),
        )
    }

    fn srem(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        // The sign of the divisor does not matter, only its magnitude.
        if lhs.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        if let (Some(dividend), Some(divisor)) = (lhs.singleton(), rhs.singleton()) {
            if divisor.is_zero() {
                return Interval::bottom();
            }
            return Interval::singleton_of(dividend % divisor);
        }
        match (rhs.lb.number(), rhs.ub.number()) {
            (Some(lo), Some(hi)) => {
                let max_divisor = lo.abs().max(hi.abs());
                if max_divisor.is_zero() {
                    return Interval::bottom();
                }
                let m = max_divisor - BigInt::one();
                if lhs.lb < Bound::zero() {
                    if lhs.ub > Bound::zero() {
                        Interval::new(Bound::Finite(-m.clone()), Bound::Finite(m))
                    } else {
                        Interval::new(Bound::Finite(-m), Bound::Finite(BigInt::zero()))
                    }
                } else {
                    Interval::new(Bound::Finite(BigInt::zero()), Bound::Finite(m))
                }
            }
            _ => Interval::top(),
        }
    }

    fn urem(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        if lhs.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        if let (Some(dividend), Some(divisor)) = (lhs.singleton(), rhs.singleton()) {
            return if divisor.is_negative() {
                // Unsigned semantics of a negative divisor need the bit
                // width, which intervals do not carry.
                Interval::top()
            } else if divisor.is_zero() {
                Interval::bottom()
            } else if dividend.is_negative() {
                // The dividend reinterprets as some huge unsigned value;
                // all that survives is the range of the remainder.
                Interval::new(
                    Bound::Finite(BigInt::zero()),
                    Bound::Finite(divisor - BigInt::one()),
                )
            } else {
                Interval::singleton_of(dividend % divisor)
            };
        }
        match (rhs.lb.number(), rhs.ub.number()) {
            (Some(_), Some(hi)) => {
                if rhs.lb < Bound::zero() || rhs.ub < Bound::zero() {
                    return Interval::top();
                }
                if hi.is_zero() {
                    return Interval::bottom();
                }
                Interval::new(
                    Bound::Finite(BigInt::zero()),
                    Bound::Finite(hi - BigInt::one()),
                )
            }
            _ => Interval::top(),
        }
    }

    fn and(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        if lhs.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        if let (Some(a), Some(b)) = (lhs.singleton(), rhs.singleton()) {
            return Interval::singleton_of(a & b);
        }
        if lhs.lb >= Bound::zero() && rhs.lb >= Bound::zero() {
            // `and` can only clear bits of non-negative operands.
            Interval::new(
                Bound::Finite(BigInt::zero()),
                Bound::min(lhs.ub.clone(), rhs.ub.clone()),
            )
        } else {
            Interval::top()
        }
    }

    fn or(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        if lhs.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        if let (Some(a), Some(b)) = (lhs.singleton(), rhs.singleton()) {
            return Interval::singleton_of(a | b);
        }
        if lhs.lb >= Bound::zero() && rhs.lb >= Bound::zero() {
            match (lhs.ub.number(), rhs.ub.number()) {
                (Some(a), Some(b)) => {
                    let m = a.max(b);
                    Interval::new(Bound::Finite(BigInt::zero()), Bound::Finite(fill_ones(m)))
                }
                _ => Interval::new(Bound::Finite(BigInt::zero()), Bound::PlusInf),
            }
        } else {
            Interval::top()
        }
    }

    fn xor(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        if lhs.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        if let (Some(a), Some(b)) = (lhs.singleton(), rhs.singleton()) {
            return Interval::singleton_of(a ^ b);
        }
        Self::or(lhs, rhs)
    }

    fn shl(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        if lhs.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        match shift_factor(rhs) {
            Some(factor) => lhs.mul(&Interval::singleton_of(factor)),
            None => Interval::top(),
        }
    }

    fn lshr(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        if lhs.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        if let Some(k) = rhs.singleton() {
            if !k.is_negative() {
                if let Some(k) = k.to_u64().filter(|&k| k <= MAX_SHIFT) {
                    // A logical shift agrees with the arithmetic one only
                    // for known non-negative, finite dividends.
                    if let (Some(lo), Some(hi)) = (lhs.lb.number(), lhs.ub.number()) {
                        if !lo.is_negative() {
                            return Interval::new(
                                Bound::Finite(lo.clone() >> (k as usize)),
                                Bound::Finite(hi.clone() >> (k as usize)),
                            );
                        }
                    }
                }
            }
        }
        Interval::top()
    }

    fn ashr(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        if lhs.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        match shift_factor(rhs) {
            Some(factor) => lhs.div(&Interval::singleton_of(factor)),
            None => Interval::top(),
        }
    }
}

impl IntervalOps for BigRational {
    fn div(lhs: &Interval<Self>, rhs: &Interval<Self>) -> Interval<Self> {
        if lhs.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        if let Some(d) = rhs.singleton() {
            if d.is_zero() {
                return Interval::bottom();
            }
        }
        if rhs.contains(&BigRational::zero()) {
            return match lhs.singleton() {
                Some(n) if n.is_zero() => Interval::singleton_of(BigRational::zero()),
                _ => Interval::top(),
            };
        }
        let ll = lhs.lb.div(&rhs.lb);
        let lu = lhs.lb.div(&rhs.ub);
        let ul = lhs.ub.div(&rhs.lb);
        let uu = lhs.ub.div(&rhs.ub);
        Interval::new(
            Bound::min(Bound::min(ll.clone(), lu.clone()), Bound::min(ul.clone(), uu.clone())),
            Bound::max(Bound::max(ll, lu), Bound::max(ul, uu)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::tests::check_lattice_laws;

    fn fin(n: i64) -> Bound<BigInt> {
        Bound::Finite(BigInt::from(n))
    }

    fn zi(lo: i64, hi: i64) -> Interval<BigInt> {
        Interval::new(fin(lo), fin(hi))
    }

    fn point(n: i64) -> Interval<BigInt> {
        Interval::singleton_of(BigInt::from(n))
    }

    fn qi(lo: (i64, i64), hi: (i64, i64)) -> Interval<BigRational> {
        Interval::new(
            Bound::Finite(BigRational::new(BigInt::from(lo.0), BigInt::from(lo.1))),
            Bound::Finite(BigRational::new(BigInt::from(hi.0), BigInt::from(hi.1))),
        )
    }

    #[test]
    fn inverted_pairs_normalize_to_bottom() {
        assert_eq!(zi(3, 1), Interval::bottom());
        assert!(zi(3, 1).is_bottom());
        assert_eq!(
            Interval::<BigInt>::new(Bound::PlusInf, Bound::PlusInf),
            Interval::bottom()
        );
        assert_eq!(Interval::<BigInt>::from_bound(Bound::MinusInf), Interval::bottom());
        assert_eq!(Interval::from_bound(fin(4)), point(4));
    }

    #[test]
    fn lattice_laws_hold_on_samples() {
        let samples = vec![
            Interval::bottom(),
            Interval::top(),
            point(0),
            point(5),
            zi(0, 10),
            zi(-5, 5),
            zi(10, 20),
            Interval::new(Bound::MinusInf, fin(3)),
            Interval::new(fin(-3), Bound::PlusInf),
        ];
        check_lattice_laws(&samples);
    }

    #[test]
    fn widening_jumps_per_grown_side() {
        assert_eq!(zi(0, 10).widen(&zi(0, 20)), Interval::new(fin(0), Bound::PlusInf));
        assert_eq!(zi(0, 10).widen(&zi(-1, 10)), Interval::new(Bound::MinusInf, fin(10)));
        assert_eq!(zi(0, 10).widen(&zi(0, 5)), zi(0, 10));
        assert_eq!(Interval::bottom().widen(&zi(1, 2)), zi(1, 2));
    }

    #[test]
    fn widening_with_thresholds_snaps_to_landmarks() {
        let ts: Thresholds<BigInt> = [100i64].iter().map(|&n| BigInt::from(n)).collect();
        assert_eq!(zi(0, 10).widening_thresholds(&zi(0, 20), &ts), zi(0, 100));
        assert_eq!(
            zi(0, 10).widening_thresholds(&zi(-5, 10), &ts),
            Interval::new(Bound::MinusInf, fin(10))
        );
        assert_eq!(
            zi(0, 10).widening_thresholds(&zi(0, 200), &ts),
            Interval::new(fin(0), Bound::PlusInf)
        );
    }

    #[test]
    fn narrowing_tightens_infinite_sides_only() {
        let widened = Interval::new(fin(0), Bound::PlusInf);
        assert_eq!(widened.narrow(&zi(0, 10)), zi(0, 10));
        assert_eq!(zi(0, 10).narrow(&zi(2, 5)), zi(0, 10));
        let m = zi(0, 10).meet(&zi(2, 5));
        assert!(m.leq(&zi(0, 10).narrow(&zi(2, 5))));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(zi(1, 5).add(&zi(-2, 3)), zi(-1, 8));
        assert_eq!(zi(1, 5).sub(&zi(-2, 3)), zi(-2, 7));
        assert_eq!(zi(-2, 3).mul(&zi(4, 5)), zi(-10, 15));
        assert_eq!(zi(-2, 3).neg(), zi(-3, 2));
        assert_eq!(Interval::bottom().add(&zi(0, 1)), Interval::bottom());
        let half = Interval::new(fin(1), Bound::PlusInf);
        assert_eq!(half.add(&point(2)), Interval::new(fin(3), Bound::PlusInf));
    }

    #[test]
    fn division_by_singleton() {
        assert_eq!(zi(2, 9).div(&point(1)), zi(2, 9));
        assert_eq!(zi(2, 9).div(&point(2)), zi(1, 4));
        assert_eq!(zi(2, 9).div(&point(-2)), zi(-4, -1));
        assert_eq!(zi(2, 9).div(&point(0)), Interval::bottom());
    }

    #[test]
    fn division_splits_divisor_around_zero() {
        // [1, 10] / [-3, 2]: hull of [1, 10] / [-3, -1] and [1, 10] / [1, 2].
        assert_eq!(zi(1, 10).div(&zi(-3, 2)), zi(-10, 10));
    }

    #[test]
    fn division_splits_dividend_around_zero() {
        // Singleton divisors do not split; a proper divisor splits the
        // dividend into sign halves (each corrected as needed) plus {0}.
        assert_eq!(zi(-4, 8).div(&point(2)), zi(-2, 4));
        assert_eq!(zi(-4, 8).div(&zi(2, 3)), zi(-3, 4));
    }

    #[test]
    fn division_corrects_negative_dividends() {
        // Strictly negative dividend: the dividend is shifted one
        // divisor-step toward zero before taking endpoint quotients.
        assert_eq!(zi(-7, -5).div(&zi(2, 3)), zi(-4, -2));
        assert_eq!(zi(-7, -5).div(&zi(-3, -2)), zi(2, 4));
    }

    #[test]
    fn rational_division_is_exact() {
        let x = qi((1, 1), (3, 1));
        let y = qi((2, 1), (4, 1));
        assert_eq!(x.div(&y), qi((1, 4), (3, 2)));

        let spans_zero = Interval::new(
            Bound::Finite(BigRational::new(BigInt::from(-1), BigInt::one())),
            Bound::Finite(BigRational::new(BigInt::from(1), BigInt::one())),
        );
        assert_eq!(x.div(&spans_zero), Interval::top());
        let zero = Interval::singleton_of(BigRational::zero());
        assert_eq!(zero.div(&spans_zero), zero);
        assert_eq!(x.div(&zero), Interval::bottom());
    }

    #[test]
    fn signed_remainder() {
        assert_eq!(point(7).srem(&point(3)), point(1));
        assert_eq!(point(-7).srem(&point(3)), point(-1));
        assert_eq!(point(7).srem(&point(0)), Interval::bottom());
        assert_eq!(zi(0, 100).srem(&zi(-4, 6)), zi(0, 5));
        assert_eq!(zi(-100, -1).srem(&zi(2, 4)), zi(-3, 0));
        assert_eq!(zi(-10, 10).srem(&zi(2, 4)), zi(-3, 3));
        assert_eq!(zi(0, 10).srem(&Interval::top()), Interval::top());
    }

    #[test]
    fn unsigned_remainder() {
        assert_eq!(point(7).urem(&point(3)), point(1));
        assert_eq!(point(7).urem(&point(-3)), Interval::top());
        assert_eq!(point(7).urem(&point(0)), Interval::bottom());
        assert_eq!(point(-7).urem(&point(5)), zi(0, 4));
        assert_eq!(zi(0, 100).urem(&zi(2, 8)), zi(0, 7));
        assert_eq!(zi(0, 100).urem(&zi(-2, 8)), Interval::top());
    }

    #[test]
    fn unsigned_division_knows_nothing() {
        assert_eq!(zi(4, 8).udiv(&point(2)), Interval::top());
        assert_eq!(Interval::bottom().udiv(&point(2)), Interval::bottom());
    }

    #[test]
    fn bitwise_and_or_xor() {
        assert_eq!(point(0b1100).and(&point(0b1010)), point(0b1000));
        assert_eq!(zi(0, 12).and(&zi(0, 9)), zi(0, 9));
        assert_eq!(zi(-1, 12).and(&zi(0, 9)), Interval::top());

        assert_eq!(point(0b1100).or(&point(0b1010)), point(0b1110));
        assert_eq!(zi(0, 9).or(&zi(0, 5)), zi(0, 15));
        let unbounded = Interval::new(fin(0), Bound::PlusInf);
        assert_eq!(zi(0, 9).or(&unbounded), unbounded);

        assert_eq!(point(0b1100).xor(&point(0b1010)), point(0b0110));
        assert_eq!(zi(0, 9).xor(&zi(0, 5)), zi(0, 15));
    }

    #[test]
    fn shifts() {
        assert_eq!(point(3).shl(&point(2)), point(12));
        assert_eq!(zi(1, 3).shl(&point(4)), zi(16, 48));
        assert_eq!(point(3).shl(&point(-1)), Interval::top());
        assert_eq!(point(3).shl(&point(129)), Interval::top());
        assert_eq!(point(3).shl(&zi(1, 2)), Interval::top());

        assert_eq!(zi(16, 48).ashr(&point(4)), zi(1, 3));
        assert_eq!(zi(16, 48).ashr(&point(-2)), Interval::top());

        assert_eq!(zi(16, 48).lshr(&point(4)), zi(1, 3));
        assert_eq!(zi(-16, 48).lshr(&point(4)), Interval::top());
        let unbounded = Interval::new(fin(0), Bound::PlusInf);
        assert_eq!(unbounded.lshr(&point(1)), Interval::top());
    }

    #[test]
    fn trim_clips_matching_endpoints() {
        assert_eq!(zi(3, 7).trim(&BigInt::from(3)), zi(4, 7));
        assert_eq!(zi(3, 7).trim(&BigInt::from(7)), zi(3, 6));
        assert_eq!(zi(3, 7).trim(&BigInt::from(5)), zi(3, 7));
        assert_eq!(point(3).trim(&BigInt::from(3)), Interval::bottom());
        // Dense lines cannot trim.
        let q = qi((0, 1), (1, 1));
        assert_eq!(q.trim(&BigRational::zero()), q);
    }

    #[test]
    fn display_tokens() {
        assert_eq!(zi(1, 2).to_string(), "[1, 2]");
        assert_eq!(Interval::<BigInt>::top().to_string(), "[-oo, +oo]");
        assert_eq!(Interval::<BigInt>::bottom().to_string(), "_|_");
    }
}
