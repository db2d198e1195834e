//! # abstract-domains: lattice-based numeric abstract domains
//!
//! **`abstract-domains`** is the value-analysis core of an abstract
//! interpreter: a family of lattices that over-approximate the numeric
//! state of a program, built for soundness first and precision second.
//!
//! ## What is an abstract domain?
//!
//! Instead of executing a program with concrete values (`x = 5`), an
//! analyzer executes it with **abstract values** (`x ∈ [0, 10]`) that
//! stand for *sets* of concrete states. An abstract domain is the algebra
//! of those values: a lattice `⟨D, ⊑, ⊥, ⊤, ⊔, ⊓⟩` with widening and
//! narrowing for loops, plus one transfer function per program statement.
//! Every operation here **over-approximates** — whatever the program can
//! really do is inside what the domain says it can do — and is monotone,
//! which is what lets a fixpoint engine drive the analysis to a sound
//! result.
//!
//! ## Layout
//!
//! The crate is three layers deep:
//!
//! 1. **Values** — [`Bound`] (numbers closed under ±oo) and [`Interval`]
//!    (pairs of bounds with the full arithmetic, bitwise, and
//!    shift/remainder transfer functions), generic over exact integers
//!    ([`num_bigint::BigInt`]) and rationals ([`num_rational::BigRational`]).
//! 2. **Maps** — [`SeparateDomain`], the non-relational lifting of any
//!    value lattice to a variable→value map over a persistent
//!    [`PatriciaTree`]; absent keys are implicitly top and a distinguished
//!    bottom marks unreachable code.
//! 3. **Domains** — [`IntervalDomain`] (with the [`ZIntervalDomain`] and
//!    [`QIntervalDomain`] aliases) implementing the full
//!    [`AbstractDomain`] contract: assignment, arithmetic, constraint
//!    assimilation through the [`LinearIntervalSolver`], booleans, arrays,
//!    references, backward transfer functions, and export back to linear
//!    constraints.
//!
//! Widening can be steered by a [`Thresholds`] set so that loop bounds are
//! found instead of jumped over.
//!
//! ## Basic usage
//!
//! ```rust
//! use abstract_domains::{
//!     AbstractDomain, ArithOp, Lattice, LinearConstraint, LinearConstraintSystem,
//!     LinearExpression, VariableFactory, ZIntervalDomain,
//! };
//! use num_bigint::BigInt;
//!
//! let mut vf = VariableFactory::new();
//! let (x, y, z) = (vf.var("x"), vf.var("y"), vf.var("z"));
//!
//! // Start from the unconstrained state and assume 1 <= x <= 5.
//! let mut state = ZIntervalDomain::top();
//! let mut assumptions = LinearConstraintSystem::new();
//! assumptions.add(LinearConstraint::inequality(
//!     LinearExpression::constant(BigInt::from(1)).sub(&LinearExpression::variable(x.clone())),
//! ));
//! assumptions.add(LinearConstraint::inequality(
//!     LinearExpression::variable(x.clone()).add_constant(BigInt::from(-5)),
//! ));
//! state.add_constraints(&assumptions);
//! assert_eq!(state.get(&x).to_string(), "[1, 5]");
//!
//! // y := x + 3; z := x * y.
//! state.assign(&y, &LinearExpression::variable(x.clone()).add_constant(BigInt::from(3)));
//! state.apply(ArithOp::Mul, &z, &x, &y);
//! assert_eq!(state.get(&y).to_string(), "[4, 8]");
//! assert_eq!(state.get(&z).to_string(), "[4, 40]");
//! ```
//!
//! ## Soundness ground rules
//!
//! - Unknown variables read as top; operations on bottom stay bottom.
//! - Interval division splits around a zero-spanning divisor; shifts with
//!   negative or enormous amounts, and bitwise cases that would need a bit
//!   width, return top rather than guess.
//! - Widening guarantees termination of ascending chains; narrowing only
//!   ever tightens a widened bound, never below the sound answer.
//!
//! The two undefined bound operations (`+oo + -oo`, division by a zero
//! bound) panic in their plain forms and are available as `checked_*`
//! methods; see [`bound`] for the policy.

pub mod backward;
pub mod bound;
pub mod domain;
pub mod error;
pub mod interval;
pub mod interval_domain;
pub mod lattice;
pub mod linear;
pub mod number;
pub mod patricia;
pub mod separate;
pub mod solver;
pub mod thresholds;
pub mod variable;

// Re-exports for convenience
pub use bound::Bound;
pub use domain::{
    AbstractDomain, ArithOp, BitwiseOp, BoolOp, CastOp, DivOp, MemoryRegion, ReferenceConstraint,
};
pub use error::DomainError;
pub use interval::{Interval, IntervalOps};
pub use interval_domain::{IntervalDomain, QIntervalDomain, ZIntervalDomain};
pub use lattice::Lattice;
pub use linear::{
    ConstraintKind, DisjunctiveLinearConstraintSystem, LinearConstraint, LinearConstraintSystem,
    LinearExpression,
};
pub use number::Numeric;
pub use patricia::{BinaryOp, BottomFound, Key, PartialOrderOp, PatriciaTree};
pub use separate::SeparateDomain;
pub use solver::{LinearIntervalSolver, DEFAULT_REDUCTION_CYCLES};
pub use thresholds::{Thresholds, WidenWithThresholds};
pub use variable::{Var, VariableFactory};
