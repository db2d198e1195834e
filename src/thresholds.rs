//! Widening thresholds.
//!
//! A small ordered set of landmark numbers (loop bounds, buffer sizes,
//! powers of two) that widening consults before giving up and jumping to an
//! infinity. See [`Interval::widening_thresholds`].
//!
//! [`Interval::widening_thresholds`]: crate::interval::Interval::widening_thresholds

use crate::bound::Bound;
use crate::number::Numeric;

/// An ordered finite set of numbers with logarithmic neighbour queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Thresholds<N> {
    // Sorted, deduplicated, finite bounds.
    values: Vec<Bound<N>>,
}

impl<N: Numeric> Thresholds<N> {
    pub fn new() -> Self {
        Thresholds { values: Vec::new() }
    }

    /// Insert a threshold, keeping the set sorted.
    pub fn add(&mut self, n: N) {
        let b = Bound::Finite(n);
        if let Err(pos) = self.values.binary_search(&b) {
            self.values.insert(pos, b);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Greatest threshold `<= b`, or `-oo` if none exists.
    pub fn get_prev(&self, b: &Bound<N>) -> Bound<N> {
        let below = self.values.partition_point(|t| t <= b);
        if below == 0 {
            Bound::MinusInf
        } else {
            self.values[below - 1].clone()
        }
    }

    /// Least threshold `>= b`, or `+oo` if none exists.
    pub fn get_next(&self, b: &Bound<N>) -> Bound<N> {
        let below = self.values.partition_point(|t| t < b);
        if below == self.values.len() {
            Bound::PlusInf
        } else {
            self.values[below].clone()
        }
    }
}

/// Values that can widen toward a threshold set instead of straight to an
/// infinity. Lets the map domain lift threshold widening pointwise without
/// knowing the value type.
pub trait WidenWithThresholds<N> {
    fn widening_thresholds(&self, other: &Self, ts: &Thresholds<N>) -> Self;
}

impl<N: Numeric> FromIterator<N> for Thresholds<N> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        let mut ts = Thresholds::new();
        for n in iter {
            ts.add(n);
        }
        ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn ts(values: &[i64]) -> Thresholds<BigInt> {
        values.iter().map(|&n| BigInt::from(n)).collect()
    }

    fn fin(n: i64) -> Bound<BigInt> {
        Bound::Finite(BigInt::from(n))
    }

    #[test]
    fn neighbours() {
        let ts = ts(&[0, 16, 100]);
        assert_eq!(ts.get_next(&fin(20)), fin(100));
        assert_eq!(ts.get_next(&fin(16)), fin(16));
        assert_eq!(ts.get_next(&fin(101)), Bound::PlusInf);
        assert_eq!(ts.get_prev(&fin(20)), fin(16));
        assert_eq!(ts.get_prev(&fin(-1)), Bound::MinusInf);
        assert_eq!(ts.get_prev(&fin(0)), fin(0));
    }

    #[test]
    fn empty_set_yields_infinities() {
        let ts = ts(&[]);
        assert_eq!(ts.get_next(&fin(0)), Bound::PlusInf);
        assert_eq!(ts.get_prev(&fin(0)), Bound::MinusInf);
    }

    #[test]
    fn infinite_queries() {
        let ts = ts(&[5]);
        assert_eq!(ts.get_prev(&Bound::MinusInf), Bound::MinusInf);
        assert_eq!(ts.get_next(&Bound::PlusInf), Bound::PlusInf);
        assert_eq!(ts.get_prev(&Bound::PlusInf), fin(5));
        assert_eq!(ts.get_next(&Bound::MinusInf), fin(5));
    }
}
