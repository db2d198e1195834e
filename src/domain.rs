//! The abstract-domain contract.
//!
//! [`AbstractDomain`] is the capability set every numeric domain exposes
//! to the analyzer: lattice structure (via [`Lattice`]), transfer
//! functions for assignments, arithmetic, bitwise, boolean, array, and
//! reference statements, their backward (inverse) counterparts, and a
//! handful of state-management utilities.
//!
//! Every operation must be a sound over-approximation of the concrete
//! semantics and monotone in all of its abstract inputs; fixpoint engines
//! rely on both. Operations mutate the receiver — states are values, so
//! callers clone before branching.

use std::fmt;

use crate::error::DomainError;
use crate::lattice::Lattice;
use crate::linear::{
    ConstraintKind, DisjunctiveLinearConstraintSystem, LinearConstraint, LinearConstraintSystem,
    LinearExpression,
};
use crate::number::Numeric;
use crate::thresholds::Thresholds;
use crate::variable::Var;

/// Arithmetic operations `x := y op z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    /// Signed division.
    Div,
}

/// Division and remainder operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivOp {
    SDiv,
    UDiv,
    SRem,
    URem,
}

/// Bitwise and shift operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,
}

/// Boolean operations `x := y op z` over truth values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
    Xor,
}

/// Integer conversions. Numeric domains without bit widths treat all of
/// them as plain copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOp {
    Trunc,
    ZExt,
    SExt,
}

/// A named storage: the memory abstraction behind references.
///
/// Non-relational domains summarize a whole region by a single cell
/// variable; every load reads the summary and every store updates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    summary: Var,
}

impl MemoryRegion {
    pub fn new(summary: Var) -> Self {
        MemoryRegion { summary }
    }

    /// The variable summarizing all cells of the region.
    pub fn summary(&self) -> &Var {
        &self.summary
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region({})", self.summary)
    }
}

/// A constraint between references, over their numeric addresses:
/// `lhs + offset ⋈ 0` or `lhs - rhs + offset ⋈ 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceConstraint<N> {
    lhs: Var,
    rhs: Option<Var>,
    offset: N,
    kind: ConstraintKind,
}

impl<N: Numeric> ReferenceConstraint<N> {
    pub fn unary(lhs: Var, offset: N, kind: ConstraintKind) -> Self {
        ReferenceConstraint { lhs, rhs: None, offset, kind }
    }

    pub fn binary(lhs: Var, rhs: Var, offset: N, kind: ConstraintKind) -> Self {
        ReferenceConstraint { lhs, rhs: Some(rhs), offset, kind }
    }

    /// `r = null` (addresses model null as zero).
    pub fn is_null(r: Var) -> Self {
        Self::unary(r, N::zero(), ConstraintKind::Equality)
    }

    /// `r ≠ null`.
    pub fn is_not_null(r: Var) -> Self {
        Self::unary(r, N::zero(), ConstraintKind::Disequation)
    }

    /// Rendered over the reference variables' addresses.
    pub fn to_linear_constraint(&self) -> LinearConstraint<N> {
        let mut e = LinearExpression::variable(self.lhs.clone());
        if let Some(rhs) = &self.rhs {
            e = e.sub(&LinearExpression::variable(rhs.clone()));
        }
        let e = e.add_constant(self.offset.clone());
        match self.kind {
            ConstraintKind::Equality => LinearConstraint::equality(e),
            ConstraintKind::Disequation => LinearConstraint::disequation(e),
            ConstraintKind::Inequality => LinearConstraint::inequality(e),
        }
    }
}

/// The full capability set of a numeric abstract domain.
///
/// Unknown variables read as top; operations on a bottom state leave it
/// bottom. See the module documentation for the soundness and
/// monotonicity obligations.
pub trait AbstractDomain: Lattice + fmt::Display {
    type Number: Numeric;

    // ---- lattice management --------------------------------------------

    fn set_to_top(&mut self);

    fn set_to_bottom(&mut self);

    /// Widening that snaps growing components to the nearest threshold.
    fn widening_thresholds(&self, other: &Self, ts: &Thresholds<Self::Number>) -> Self;

    // ---- assignment and arithmetic -------------------------------------

    /// `x := e`.
    fn assign(&mut self, x: &Var, e: &LinearExpression<Self::Number>);

    /// `x := y op z`.
    fn apply(&mut self, op: ArithOp, x: &Var, y: &Var, z: &Var);

    /// `x := y op k`.
    fn apply_const(&mut self, op: ArithOp, x: &Var, y: &Var, k: &Self::Number);

    /// `x := y op z` for division/remainder operators.
    fn apply_div(&mut self, op: DivOp, x: &Var, y: &Var, z: &Var);

    /// `x := y op k` for division/remainder operators.
    fn apply_div_const(&mut self, op: DivOp, x: &Var, y: &Var, k: &Self::Number);

    /// `x := y op z` for bitwise operators.
    fn apply_bitwise(&mut self, op: BitwiseOp, x: &Var, y: &Var, z: &Var);

    /// `x := y op k` for bitwise operators.
    fn apply_bitwise_const(&mut self, op: BitwiseOp, x: &Var, y: &Var, k: &Self::Number);

    /// `dst := cast(src)`.
    fn apply_cast(&mut self, op: CastOp, dst: &Var, src: &Var);

    // ---- constraints ---------------------------------------------------

    /// Assimilate a conjunction of constraints, refining the state.
    fn add_constraints(&mut self, csts: &LinearConstraintSystem<Self::Number>);

    fn add_constraint(&mut self, cst: &LinearConstraint<Self::Number>) {
        self.add_constraints(&LinearConstraintSystem::from(cst.clone()));
    }

    // ---- booleans ------------------------------------------------------

    /// `lhs := (rhs holds)`.
    fn assign_bool_cst(&mut self, lhs: &Var, rhs: &LinearConstraint<Self::Number>);

    /// `lhs := rhs`, or `lhs := not rhs` when `negate` is set.
    fn assign_bool_var(&mut self, lhs: &Var, rhs: &Var, negate: bool);

    /// `x := y op z` over truth values.
    fn apply_binary_bool(&mut self, op: BoolOp, x: &Var, y: &Var, z: &Var);

    /// `assume(v)`, or `assume(not v)` when `negated` is set.
    fn assume_bool(&mut self, v: &Var, negated: bool);

    // ---- arrays --------------------------------------------------------

    /// Fresh array `a` with every cell in `[lb_idx, ub_idx]` set to `val`.
    fn array_init(
        &mut self,
        a: &Var,
        elem_size: &LinearExpression<Self::Number>,
        lb_idx: &LinearExpression<Self::Number>,
        ub_idx: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
    );

    /// `lhs := a[idx]`.
    fn array_load(
        &mut self,
        lhs: &Var,
        a: &Var,
        elem_size: &LinearExpression<Self::Number>,
        idx: &LinearExpression<Self::Number>,
    );

    /// `a[idx] := val`. A strong update overwrites; a weak update joins
    /// with the previous contents (sound under aliasing).
    fn array_store(
        &mut self,
        a: &Var,
        elem_size: &LinearExpression<Self::Number>,
        idx: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
        is_strong_update: bool,
    );

    /// SSA form: `a_new := a_old[idx <- val]`.
    #[allow(clippy::too_many_arguments)]
    fn array_store_versioned(
        &mut self,
        a_new: &Var,
        a_old: &Var,
        elem_size: &LinearExpression<Self::Number>,
        idx: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
        is_strong_update: bool,
    );

    /// `a[k] := val` for every `k` in `[lo_idx, hi_idx)`.
    fn array_store_range(
        &mut self,
        a: &Var,
        elem_size: &LinearExpression<Self::Number>,
        lo_idx: &LinearExpression<Self::Number>,
        hi_idx: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
    );

    /// SSA form of [`array_store_range`].
    ///
    /// [`array_store_range`]: AbstractDomain::array_store_range
    #[allow(clippy::too_many_arguments)]
    fn array_store_range_versioned(
        &mut self,
        a_new: &Var,
        a_old: &Var,
        elem_size: &LinearExpression<Self::Number>,
        lo_idx: &LinearExpression<Self::Number>,
        hi_idx: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
    );

    /// `a[i] := b[i]` for all `i`.
    fn array_assign(&mut self, a: &Var, b: &Var);

    // ---- references ----------------------------------------------------

    /// Bring a region into scope with unknown contents.
    fn region_init(&mut self, reg: &MemoryRegion);

    /// Create a reference `r` into `reg` at a non-deterministic address.
    fn ref_make(&mut self, r: &Var, reg: &MemoryRegion);

    /// `res := *r` within `reg`.
    fn ref_load(&mut self, r: &Var, reg: &MemoryRegion, res: &Var);

    /// `*r := val` within `reg`.
    fn ref_store(&mut self, r: &Var, reg: &MemoryRegion, val: &LinearExpression<Self::Number>);

    /// `r2 := r1 + offset`, re-targeted at `reg2` (pointer arithmetic
    /// across regions).
    fn ref_gep(
        &mut self,
        r1: &Var,
        reg1: &MemoryRegion,
        r2: &Var,
        reg2: &MemoryRegion,
        offset: &LinearExpression<Self::Number>,
    );

    /// Treat the memory behind `r` as an array and load from it.
    fn ref_load_from_array(
        &mut self,
        lhs: &Var,
        r: &Var,
        reg: &MemoryRegion,
        idx: &LinearExpression<Self::Number>,
        elem_size: &LinearExpression<Self::Number>,
    );

    /// Treat the memory behind `r` as an array and store to it.
    fn ref_store_to_array(
        &mut self,
        r: &Var,
        reg: &MemoryRegion,
        idx: &LinearExpression<Self::Number>,
        elem_size: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
    );

    /// Assume a constraint between references.
    fn ref_assume(&mut self, cst: &ReferenceConstraint<Self::Number>);

    // ---- backward transfer functions -----------------------------------
    //
    // Each backward operation substitutes the statement's effect out of
    // the (post-)state and meets the result with `inv`, the invariant
    // known to hold before the statement.

    /// Inverse of `x := e`.
    fn backward_assign(&mut self, x: &Var, e: &LinearExpression<Self::Number>, inv: &Self);

    /// Inverse of `x := y op z`.
    fn backward_apply(&mut self, op: ArithOp, x: &Var, y: &Var, z: &Var, inv: &Self);

    /// Inverse of `x := y op k`.
    fn backward_apply_const(&mut self, op: ArithOp, x: &Var, y: &Var, k: &Self::Number, inv: &Self);

    /// Inverse of [`assign_bool_cst`].
    ///
    /// [`assign_bool_cst`]: AbstractDomain::assign_bool_cst
    fn backward_assign_bool_cst(
        &mut self,
        lhs: &Var,
        rhs: &LinearConstraint<Self::Number>,
        inv: &Self,
    );

    /// Inverse of [`assign_bool_var`].
    ///
    /// [`assign_bool_var`]: AbstractDomain::assign_bool_var
    fn backward_assign_bool_var(&mut self, lhs: &Var, rhs: &Var, negate: bool, inv: &Self);

    /// Inverse of [`apply_binary_bool`].
    ///
    /// [`apply_binary_bool`]: AbstractDomain::apply_binary_bool
    fn backward_apply_binary_bool(&mut self, op: BoolOp, x: &Var, y: &Var, z: &Var, inv: &Self);

    /// Inverse of [`array_init`].
    ///
    /// [`array_init`]: AbstractDomain::array_init
    fn backward_array_init(
        &mut self,
        a: &Var,
        elem_size: &LinearExpression<Self::Number>,
        lb_idx: &LinearExpression<Self::Number>,
        ub_idx: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
        inv: &Self,
    );

    /// Inverse of [`array_load`].
    ///
    /// [`array_load`]: AbstractDomain::array_load
    fn backward_array_load(
        &mut self,
        lhs: &Var,
        a: &Var,
        elem_size: &LinearExpression<Self::Number>,
        idx: &LinearExpression<Self::Number>,
        inv: &Self,
    );

    /// Inverse of [`array_store`].
    ///
    /// [`array_store`]: AbstractDomain::array_store
    #[allow(clippy::too_many_arguments)]
    fn backward_array_store(
        &mut self,
        a: &Var,
        elem_size: &LinearExpression<Self::Number>,
        idx: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
        is_strong_update: bool,
        inv: &Self,
    );

    /// Inverse of [`array_store_versioned`].
    ///
    /// [`array_store_versioned`]: AbstractDomain::array_store_versioned
    #[allow(clippy::too_many_arguments)]
    fn backward_array_store_versioned(
        &mut self,
        a_new: &Var,
        a_old: &Var,
        elem_size: &LinearExpression<Self::Number>,
        idx: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
        is_strong_update: bool,
        inv: &Self,
    );

    /// Inverse of [`array_store_range`].
    ///
    /// [`array_store_range`]: AbstractDomain::array_store_range
    #[allow(clippy::too_many_arguments)]
    fn backward_array_store_range(
        &mut self,
        a: &Var,
        elem_size: &LinearExpression<Self::Number>,
        lo_idx: &LinearExpression<Self::Number>,
        hi_idx: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
        inv: &Self,
    );

    /// Inverse of [`array_store_range_versioned`].
    ///
    /// [`array_store_range_versioned`]: AbstractDomain::array_store_range_versioned
    #[allow(clippy::too_many_arguments)]
    fn backward_array_store_range_versioned(
        &mut self,
        a_new: &Var,
        a_old: &Var,
        elem_size: &LinearExpression<Self::Number>,
        lo_idx: &LinearExpression<Self::Number>,
        hi_idx: &LinearExpression<Self::Number>,
        val: &LinearExpression<Self::Number>,
        inv: &Self,
    );

    /// Inverse of [`array_assign`].
    ///
    /// [`array_assign`]: AbstractDomain::array_assign
    fn backward_array_assign(&mut self, a: &Var, b: &Var, inv: &Self);

    // ---- utilities -----------------------------------------------------

    /// Drop all knowledge about `v`.
    fn forget(&mut self, v: &Var);

    fn forget_all(&mut self, vars: &[Var]) {
        for v in vars {
            self.forget(v);
        }
    }

    /// Keep only the listed variables (dual to forget).
    fn project(&mut self, vars: &[Var]);

    /// Rename `from[i]` to `to[i]`.
    ///
    /// The target names must not already be bound in the state.
    ///
    /// # Panics
    ///
    /// Panics when `from` and `to` differ in length.
    fn rename(&mut self, from: &[Var], to: &[Var]) -> Result<(), DomainError>;

    /// Duplicate `v` into `duplicate` without relating the two.
    fn expand(&mut self, v: &Var, duplicate: &Var);

    /// Restore the canonical form, where the domain has one.
    fn normalize(&mut self);

    /// Shrink the representation without changing the denotation.
    fn minimize(&mut self);

    /// A named, uninterpreted operation: outputs become unknown.
    fn intrinsic(&mut self, name: &str, inputs: &[Var], outputs: &[Var]);

    /// Backward counterpart of [`intrinsic`].
    ///
    /// [`intrinsic`]: AbstractDomain::intrinsic
    fn backward_intrinsic(&mut self, name: &str, inputs: &[Var], outputs: &[Var], inv: &Self);

    /// Export the state as a conjunction of linear constraints.
    fn to_linear_constraint_system(&self) -> LinearConstraintSystem<Self::Number>;

    /// Export the state as a disjunction of conjunctions.
    fn to_disjunctive_linear_constraint_system(&self)
        -> DisjunctiveLinearConstraintSystem<Self::Number>;
}
