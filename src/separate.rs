//! The non-relational map domain.
//!
//! [`SeparateDomain`] lifts any value lattice `V` to a lattice of
//! variable-to-value maps, tracked independently per key ("separately").
//! The representation is a persistent Patricia tree plus a distinguished
//! bottom for the unreachable state.
//!
//! # Invariants
//!
//! - Bottom is absorbing: mutating a bottom state leaves it bottom, and
//!   its tree is always empty.
//! - No key is ever bound to `V::top()` (absence means top) and none to
//!   `V::bottom()` (binding bottom collapses the whole map).
//! - The empty tree therefore denotes top.
//!
//! Lattice operations are pointwise, with the one-sided-key policy chosen
//! per operator: join-like operators treat the implicit top as absorbing
//! and drop such keys, meet-like operators keep them and short-circuit the
//! whole merge to bottom as soon as one pointwise result is `V::bottom()`.

use std::fmt;

use crate::lattice::Lattice;
use crate::patricia::{BinaryOp, BottomFound, Iter, Key, PartialOrderOp, PatriciaTree};
use crate::thresholds::{Thresholds, WidenWithThresholds};

/// A map from keys to lattice values, with a distinguished bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparateDomain<K, V> {
    is_bottom: bool,
    tree: PatriciaTree<K, V>,
}

struct JoinOp;

impl<V: Lattice> BinaryOp<V> for JoinOp {
    fn apply(&self, x: &V, y: &V) -> Result<Option<V>, BottomFound> {
        let z = x.join(y);
        Ok(if z.is_top() { None } else { Some(z) })
    }

    fn default_is_absorbing(&self) -> bool {
        true
    }
}

struct WideningOp;

impl<V: Lattice> BinaryOp<V> for WideningOp {
    fn apply(&self, x: &V, y: &V) -> Result<Option<V>, BottomFound> {
        let z = x.widen(y);
        Ok(if z.is_top() { None } else { Some(z) })
    }

    fn default_is_absorbing(&self) -> bool {
        true
    }
}

struct WideningThresholdsOp<'a, N> {
    ts: &'a Thresholds<N>,
}

impl<N, V: Lattice + WidenWithThresholds<N>> BinaryOp<V> for WideningThresholdsOp<'_, N> {
    fn apply(&self, x: &V, y: &V) -> Result<Option<V>, BottomFound> {
        let z = x.widening_thresholds(y, self.ts);
        Ok(if z.is_top() { None } else { Some(z) })
    }

    fn default_is_absorbing(&self) -> bool {
        true
    }
}

struct MeetOp;

impl<V: Lattice> BinaryOp<V> for MeetOp {
    fn apply(&self, x: &V, y: &V) -> Result<Option<V>, BottomFound> {
        let z = x.meet(y);
        if z.is_bottom() {
            Err(BottomFound)
        } else {
            Ok(Some(z))
        }
    }

    fn default_is_absorbing(&self) -> bool {
        false
    }
}

struct NarrowingOp;

impl<V: Lattice> BinaryOp<V> for NarrowingOp {
    fn apply(&self, x: &V, y: &V) -> Result<Option<V>, BottomFound> {
        let z = x.narrow(y);
        if z.is_bottom() {
            Err(BottomFound)
        } else {
            Ok(Some(z))
        }
    }

    fn default_is_absorbing(&self) -> bool {
        false
    }
}

struct PointwiseOrder;

impl<V: Lattice> PartialOrderOp<V> for PointwiseOrder {
    fn leq(&self, x: &V, y: &V) -> bool {
        x.leq(y)
    }

    fn default_is_top(&self) -> bool {
        true
    }
}

impl<K: Key, V: Lattice> SeparateDomain<K, V> {
    fn from_tree(tree: PatriciaTree<K, V>) -> Self {
        SeparateDomain { is_bottom: false, tree }
    }

    /// Bind `k`. Binding `V::bottom()` collapses the state; binding
    /// `V::top()` erases the key.
    pub fn set(&mut self, k: K, v: V) {
        if self.is_bottom {
            return;
        }
        if v.is_bottom() {
            self.set_to_bottom();
        } else if v.is_top() {
            self.tree.remove(&k);
        } else {
            self.tree.insert(k, v);
        }
    }

    /// Drop any binding for `k` (the key reads as top afterwards).
    pub fn forget(&mut self, k: &K) {
        if !self.is_bottom {
            self.tree.remove(k);
        }
    }

    /// The value bound to `k`: `V::bottom()` on a bottom state, `V::top()`
    /// for absent keys.
    pub fn get(&self, k: &K) -> V {
        if self.is_bottom {
            return V::bottom();
        }
        match self.tree.lookup(k) {
            Some(v) => v.clone(),
            None => V::top(),
        }
    }

    pub fn set_to_top(&mut self) {
        self.is_bottom = false;
        self.tree = PatriciaTree::new();
    }

    pub fn set_to_bottom(&mut self) {
        self.is_bottom = true;
        self.tree = PatriciaTree::new();
    }

    /// Iterate the bound keys and their values.
    ///
    /// # Panics
    ///
    /// Panics on a bottom state: the unreachable state has no bindings to
    /// show, and asking for them is a caller bug.
    pub fn iter(&self) -> Iter<'_, K, V> {
        assert!(!self.is_bottom, "separate domain: cannot iterate a bottom state");
        self.tree.iter()
    }

    /// Pointwise widening toward a threshold set.
    pub fn widening_thresholds<N>(&self, other: &Self, ts: &Thresholds<N>) -> Self
    where
        V: WidenWithThresholds<N>,
    {
        if self.is_bottom {
            return other.clone();
        }
        if other.is_bottom {
            return self.clone();
        }
        match self.tree.merge_with(&other.tree, &WideningThresholdsOp { ts }) {
            Ok(tree) => Self::from_tree(tree),
            Err(BottomFound) => unreachable!("widening cannot produce bottom values"),
        }
    }
}

impl<K: Key + fmt::Debug + PartialEq, V: Lattice> Lattice for SeparateDomain<K, V> {
    fn top() -> Self {
        SeparateDomain { is_bottom: false, tree: PatriciaTree::new() }
    }

    fn bottom() -> Self {
        SeparateDomain { is_bottom: true, tree: PatriciaTree::new() }
    }

    fn is_top(&self) -> bool {
        !self.is_bottom && self.tree.is_empty()
    }

    fn is_bottom(&self) -> bool {
        self.is_bottom
    }

    fn leq(&self, other: &Self) -> bool {
        if self.is_bottom {
            true
        } else if other.is_bottom {
            false
        } else {
            self.tree.leq(&other.tree, &PointwiseOrder)
        }
    }

    fn join(&self, other: &Self) -> Self {
        if self.is_bottom {
            return other.clone();
        }
        if other.is_bottom {
            return self.clone();
        }
        match self.tree.merge_with(&other.tree, &JoinOp) {
            Ok(tree) => Self::from_tree(tree),
            Err(BottomFound) => unreachable!("join cannot produce bottom values"),
        }
    }

    fn meet(&self, other: &Self) -> Self {
        if self.is_bottom || other.is_bottom {
            return Self::bottom();
        }
        match self.tree.merge_with(&other.tree, &MeetOp) {
            Ok(tree) => Self::from_tree(tree),
            Err(BottomFound) => Self::bottom(),
        }
    }

    fn widen(&self, other: &Self) -> Self {
        if self.is_bottom {
            return other.clone();
        }
        if other.is_bottom {
            return self.clone();
        }
        match self.tree.merge_with(&other.tree, &WideningOp) {
            Ok(tree) => Self::from_tree(tree),
            Err(BottomFound) => unreachable!("widening cannot produce bottom values"),
        }
    }

    fn narrow(&self, other: &Self) -> Self {
        if self.is_bottom || other.is_bottom {
            return Self::bottom();
        }
        match self.tree.merge_with(&other.tree, &NarrowingOp) {
            Ok(tree) => Self::from_tree(tree),
            Err(BottomFound) => Self::bottom(),
        }
    }
}

impl<K: Key + fmt::Display, V: Lattice + fmt::Display> fmt::Display for SeparateDomain<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bottom {
            return write!(f, "_|_");
        }
        write!(f, "{{")?;
        for (i, (k, v)) in self.tree.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{k} -> {v}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::Bound;
    use crate::interval::Interval;
    use crate::lattice::tests::check_lattice_laws;
    use num_bigint::BigInt;

    type Env = SeparateDomain<u64, Interval<BigInt>>;

    fn zi(lo: i64, hi: i64) -> Interval<BigInt> {
        Interval::new(Bound::Finite(BigInt::from(lo)), Bound::Finite(BigInt::from(hi)))
    }

    fn env(pairs: &[(u64, (i64, i64))]) -> Env {
        let mut e = Env::top();
        for &(k, (lo, hi)) in pairs {
            e.set(k, zi(lo, hi));
        }
        e
    }

    #[test]
    fn absent_keys_are_top_and_bottom_absorbs() {
        let mut e = env(&[(1, (0, 5))]);
        assert_eq!(e.get(&1), zi(0, 5));
        assert_eq!(e.get(&2), Interval::top());

        e.set(7, Interval::bottom());
        assert!(e.is_bottom());
        assert_eq!(e.get(&1), Interval::bottom());

        e.set(1, zi(0, 1));
        e.forget(&1);
        assert!(e.is_bottom());
    }

    #[test]
    fn binding_top_erases_the_key() {
        let mut e = env(&[(1, (0, 5))]);
        e.set(1, Interval::top());
        assert!(e.is_top());
    }

    #[test]
    fn forget_reads_back_as_top() {
        let mut e = env(&[(1, (0, 5)), (2, (1, 1))]);
        e.forget(&1);
        assert_eq!(e.get(&1), Interval::top());
        assert_eq!(e.get(&2), zi(1, 1));
    }

    #[test]
    fn join_is_pointwise_with_implicit_top() {
        let a = env(&[(1, (0, 5)), (2, (0, 0))]);
        let b = env(&[(1, (3, 9))]);
        let j = a.join(&b);
        assert_eq!(j.get(&1), zi(0, 9));
        // Key 2 is top in `b`, so it is top in the join.
        assert_eq!(j.get(&2), Interval::top());
        assert!(a.leq(&j) && b.leq(&j));
    }

    #[test]
    fn meet_keeps_one_sided_keys_and_collapses_on_conflict() {
        let a = env(&[(1, (0, 5)), (2, (0, 0))]);
        let b = env(&[(1, (3, 9))]);
        let m = a.meet(&b);
        assert_eq!(m.get(&1), zi(3, 5));
        assert_eq!(m.get(&2), zi(0, 0));

        let c = env(&[(1, (10, 20))]);
        assert!(a.meet(&c).is_bottom());
    }

    #[test]
    fn widening_and_narrowing_are_pointwise() {
        let a = env(&[(1, (0, 10))]);
        let b = env(&[(1, (0, 20))]);
        let w = a.widen(&b);
        assert_eq!(w.get(&1), Interval::new(Bound::Finite(BigInt::from(0)), Bound::PlusInf));
        let n = w.narrow(&b);
        assert_eq!(n.get(&1), zi(0, 20));
    }

    #[test]
    fn threshold_widening_is_pointwise() {
        let ts: Thresholds<BigInt> = [64i64].iter().map(|&n| BigInt::from(n)).collect();
        let a = env(&[(1, (0, 10))]);
        let b = env(&[(1, (0, 20))]);
        let w = a.widening_thresholds(&b, &ts);
        assert_eq!(w.get(&1), zi(0, 64));
    }

    #[test]
    fn lattice_laws_hold_on_samples() {
        let samples = vec![
            Env::bottom(),
            Env::top(),
            env(&[(1, (0, 5))]),
            env(&[(1, (3, 9))]),
            env(&[(1, (0, 5)), (2, (-1, 1))]),
            env(&[(2, (4, 4))]),
        ];
        check_lattice_laws(&samples);
    }

    #[test]
    #[should_panic(expected = "bottom state")]
    fn iterating_bottom_is_a_caller_bug() {
        let _ = Env::bottom().iter();
    }

    #[test]
    fn printing() {
        let mut e = env(&[(1, (0, 5))]);
        assert_eq!(e.to_string(), "{1 -> [0, 5]}");
        e.set_to_bottom();
        assert_eq!(e.to_string(), "_|_");
    }
}
