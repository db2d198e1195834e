//! The value-lattice interface.
//!
//! Every abstract value in this crate — an interval, a variable map, a
//! whole domain state — is an element of a lattice `⟨D, ⊑, ⊥, ⊤, ⊔, ⊓⟩`
//! extended with widening and narrowing:
//!
//! - **Order** (`leq`): `x ⊑ y` means `x` describes fewer concrete
//!   behaviours than `y`.
//! - **Join** (`⊔`): least upper bound; merges control-flow paths.
//! - **Meet** (`⊓`): greatest lower bound; refines at conditionals.
//! - **Widening** (`∇`): join-like, but extrapolates growing components to
//!   a limit so that ascending chains stabilize in finitely many steps.
//! - **Narrowing**: meet-like recovery of precision after widening that
//!   never undoes soundness.
//!
//! The operations are named rather than spelled with `|`/`&` so that they
//! cannot be mistaken for the bitwise transfer functions living next door.

use std::fmt::Debug;

/// A lattice of abstract values.
///
/// # Laws
///
/// Implementations must keep join and meet commutative, associative, and
/// idempotent, with `bottom ⊑ x ⊑ top`, `x ⊑ x.join(y)`, and
/// `x.meet(y) ⊑ x`. Widening must over-approximate both arguments and
/// stabilize every ascending chain; narrowing must stay between
/// `x.meet(y)` and `x`. The checker in [`tests`] exercises these laws over
/// sample sets.
pub trait Lattice: Clone + Debug + PartialEq + Sized {
    fn top() -> Self;

    fn bottom() -> Self;

    fn is_top(&self) -> bool;

    fn is_bottom(&self) -> bool;

    /// Partial order: `self ⊑ other`.
    fn leq(&self, other: &Self) -> bool;

    fn join(&self, other: &Self) -> Self;

    fn meet(&self, other: &Self) -> Self;

    /// Widening. Not defaulted to `join`: finite-height reasoning does not
    /// transfer, and every infinite-height lattice needs its own
    /// extrapolation.
    fn widen(&self, other: &Self) -> Self;

    /// Narrowing. Meet is a sound default; domains with a real narrowing
    /// (intervals tightening infinite endpoints) override it.
    fn narrow(&self, other: &Self) -> Self {
        self.meet(other)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Check the lattice laws over a sample of elements.
    pub fn check_lattice_laws<L: Lattice>(samples: &[L]) {
        let top = L::top();
        let bottom = L::bottom();
        assert!(bottom.leq(&top), "bottom must be below top");

        for a in samples {
            assert!(a.leq(a), "order must be reflexive");
            assert!(bottom.leq(a), "bottom must be least");
            assert!(a.leq(&top), "top must be greatest");
            assert_eq!(&a.join(&bottom), a, "join with bottom must be identity");
            assert_eq!(&a.meet(&top), a, "meet with top must be identity");
            assert_eq!(&a.join(a), a, "join must be idempotent");
            assert_eq!(&a.meet(a), a, "meet must be idempotent");
        }

        for a in samples {
            for b in samples {
                let ab = a.join(b);
                assert_eq!(ab, b.join(a), "join must be commutative");
                assert!(a.leq(&ab), "join must bound its left argument");
                assert!(b.leq(&ab), "join must bound its right argument");

                let m = a.meet(b);
                assert_eq!(m, b.meet(a), "meet must be commutative");
                assert!(m.leq(a), "meet must be below its left argument");
                assert!(m.leq(b), "meet must be below its right argument");

                let w = a.widen(b);
                assert!(a.leq(&w), "widening must cover its left argument");
                assert!(b.leq(&w), "widening must cover its right argument");

                let n = a.narrow(b);
                assert!(m.leq(&n) && n.leq(a), "narrowing must sit between meet and left");
            }
        }

        for a in samples {
            for b in samples {
                for c in samples {
                    assert_eq!(
                        a.join(b).join(c),
                        a.join(&b.join(c)),
                        "join must be associative"
                    );
                    assert_eq!(
                        a.meet(b).meet(c),
                        a.meet(&b.meet(c)),
                        "meet must be associative"
                    );
                }
            }
        }
    }
}
