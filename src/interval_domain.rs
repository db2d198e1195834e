//! The interval domain: the non-relational map domain instantiated with
//! interval values.
//!
//! A state maps variables to intervals; absent variables read as top and
//! a distinguished bottom marks unreachable code. Linear expressions
//! evaluate by interval arithmetic, constraint systems assimilate through
//! the [`LinearIntervalSolver`], and the backward operations delegate to
//! the shared helpers in [`backward`].
//!
//! Booleans are encoded as `[0, 1]` intervals (`0` false, `1` true).
//! Arrays and memory regions are summarized by a single cell each: a
//! strong update overwrites the summary, a weak update joins with it.
//!
//! [`backward`]: crate::backward

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::backward;
use crate::bound::Bound;
use crate::domain::{
    AbstractDomain, ArithOp, BitwiseOp, BoolOp, CastOp, DivOp, MemoryRegion, ReferenceConstraint,
};
use crate::error::DomainError;
use crate::interval::{Interval, IntervalOps};
use crate::lattice::Lattice;
use crate::linear::{
    DisjunctiveLinearConstraintSystem, LinearConstraint, LinearConstraintSystem, LinearExpression,
};
use crate::patricia::Iter;
use crate::separate::SeparateDomain;
use crate::solver::{LinearIntervalSolver, DEFAULT_REDUCTION_CYCLES};
use crate::thresholds::Thresholds;
use crate::variable::Var;

/// The interval domain over the integers.
pub type ZIntervalDomain = IntervalDomain<BigInt>;

/// The interval domain over the rationals.
pub type QIntervalDomain = IntervalDomain<BigRational>;

/// An abstract state mapping variables to intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalDomain<N> {
    env: SeparateDomain<Var, Interval<N>>,
}

impl<N: IntervalOps> IntervalDomain<N> {
    /// The interval currently bound to `v` (top when unknown).
    pub fn get(&self, v: &Var) -> Interval<N> {
        self.env.get(v)
    }

    /// Bind `v`. Binding bottom collapses the state.
    pub fn set(&mut self, v: Var, value: Interval<N>) {
        self.env.set(v, value);
    }

    /// Evaluate a linear expression in the current state.
    pub fn eval(&self, e: &LinearExpression<N>) -> Interval<N> {
        let mut r = Interval::singleton_of(e.constant_term().clone());
        for (c, v) in e.iter() {
            r = r.add(&Interval::singleton_of(c.clone()).mul(&self.env.get(v)));
        }
        r
    }

    /// Iterate the bound `(variable, interval)` pairs.
    ///
    /// # Panics
    ///
    /// Panics on a bottom state, like the underlying map.
    pub fn iter(&self) -> Iter<'_, Var, Interval<N>> {
        self.env.iter()
    }

    fn boolean_range() -> Interval<N> {
        Interval::new(Bound::Finite(N::zero()), Bound::Finite(N::one()))
    }

    fn truth_value(b: bool) -> Interval<N> {
        if b {
            Interval::singleton_of(N::one())
        } else {
            Interval::singleton_of(N::zero())
        }
    }

    /// The truth of `rhs` as seen from this state, meet-closed to `[0, 1]`.
    fn constraint_truth(&self, rhs: &LinearConstraint<N>) -> Interval<N> {
        let mut assuming = self.clone();
        assuming.add_constraint(rhs);
        if assuming.is_bottom() {
            return Self::truth_value(false);
        }
        if let Some(negated) = rhs.negate() {
            let mut refuting = self.clone();
            refuting.add_constraint(&negated);
            if refuting.is_bottom() {
                return Self::truth_value(true);
            }
        }
        Self::boolean_range()
    }

    fn meet_state(&mut self, inv: &Self) {
        *self = Lattice::meet(self, inv);
    }
}

impl<N: IntervalOps> Default for IntervalDomain<N> {
    fn default() -> Self {
        Self::top()
    }
}

impl<N: IntervalOps> Lattice for IntervalDomain<N> {
    fn top() -> Self {
        IntervalDomain { env: SeparateDomain::top() }
    }

    fn bottom() -> Self {
        IntervalDomain { env: SeparateDomain::bottom() }
    }

    fn is_top(&self) -> bool {
        self.env.is_top()
    }

    fn is_bottom(&self) -> bool {
        self.env.is_bottom()
    }

    fn leq(&self, other: &Self) -> bool {
        self.env.leq(&other.env)
    }

    fn join(&self, other: &Self) -> Self {
        IntervalDomain { env: self.env.join(&other.env) }
    }

    fn meet(&self, other: &Self) -> Self {
        IntervalDomain { env: self.env.meet(&other.env) }
    }

    fn widen(&self, other: &Self) -> Self {
        IntervalDomain { env: self.env.widen(&other.env) }
    }

    fn narrow(&self, other: &Self) -> Self {
        IntervalDomain { env: self.env.narrow(&other.env) }
    }
}

impl<N: IntervalOps> fmt::Display for IntervalDomain<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.env, f)
    }
}

impl<N: IntervalOps> AbstractDomain for IntervalDomain<N> {
    type Number = N;

    fn set_to_top(&mut self) {
        self.env.set_to_top();
    }

    fn set_to_bottom(&mut self) {
        self.env.set_to_bottom();
    }

    fn widening_thresholds(&self, other: &Self, ts: &Thresholds<N>) -> Self {
        IntervalDomain { env: self.env.widening_thresholds(&other.env, ts) }
    }

    fn assign(&mut self, x: &Var, e: &LinearExpression<N>) {
        // Plain copies skip the evaluator.
        if let Some(v) = e.get_variable() {
            let value = self.env.get(v);
            self.env.set(x.clone(), value);
        } else {
            let value = self.eval(e);
            self.env.set(x.clone(), value);
        }
    }

    fn apply(&mut self, op: ArithOp, x: &Var, y: &Var, z: &Var) {
        let yi = self.env.get(y);
        let zi = self.env.get(z);
        let xi = match op {
            ArithOp::Add => yi.add(&zi),
            ArithOp::Sub => yi.sub(&zi),
            ArithOp::Mul => yi.mul(&zi),
            ArithOp::Div => yi.div(&zi),
        };
        self.env.set(x.clone(), xi);
    }

    fn apply_const(&mut self, op: ArithOp, x: &Var, y: &Var, k: &N) {
        let yi = self.env.get(y);
        let zi = Interval::singleton_of(k.clone());
        let xi = match op {
            ArithOp::Add => yi.add(&zi),
            ArithOp::Sub => yi.sub(&zi),
            ArithOp::Mul => yi.mul(&zi),
            ArithOp::Div => yi.div(&zi),
        };
        self.env.set(x.clone(), xi);
    }

    fn apply_div(&mut self, op: DivOp, x: &Var, y: &Var, z: &Var) {
        let yi = self.env.get(y);
        let zi = self.env.get(z);
        let xi = match op {
            DivOp::SDiv => yi.div(&zi),
            DivOp::UDiv => yi.udiv(&zi),
            DivOp::SRem => yi.srem(&zi),
            DivOp::URem => yi.urem(&zi),
        };
        self.env.set(x.clone(), xi);
    }

    fn apply_div_const(&mut self, op: DivOp, x: &Var, y: &Var, k: &N) {
        let yi = self.env.get(y);
        let zi = Interval::singleton_of(k.clone());
        let xi = match op {
            DivOp::SDiv => yi.div(&zi),
            DivOp::UDiv => yi.udiv(&zi),
            DivOp::SRem => yi.srem(&zi),
            DivOp::URem => yi.urem(&zi),
        };
        self.env.set(x.clone(), xi);
    }

    fn apply_bitwise(&mut self, op: BitwiseOp, x: &Var, y: &Var, z: &Var) {
        let yi = self.env.get(y);
        let zi = self.env.get(z);
        let xi = match op {
            BitwiseOp::And => yi.and(&zi),
            BitwiseOp::Or => yi.or(&zi),
            BitwiseOp::Xor => yi.xor(&zi),
            BitwiseOp::Shl => yi.shl(&zi),
            BitwiseOp::LShr => yi.lshr(&zi),
            BitwiseOp::AShr => yi.ashr(&zi),
        };
        self.env.set(x.clone(), xi);
    }

    fn apply_bitwise_const(&mut self, op: BitwiseOp, x: &Var, y: &Var, k: &N) {
        let yi = self.env.get(y);
        let zi = Interval::singleton_of(k.clone());
        let xi = match op {
            BitwiseOp::And => yi.and(&zi),
            BitwiseOp::Or => yi.or(&zi),
            BitwiseOp::Xor => yi.xor(&zi),
            BitwiseOp::Shl => yi.shl(&zi),
            BitwiseOp::LShr => yi.lshr(&zi),
            BitwiseOp::AShr => yi.ashr(&zi),
        };
        self.env.set(x.clone(), xi);
    }

    fn apply_cast(&mut self, _op: CastOp, dst: &Var, src: &Var) {
        // Intervals carry no widths; every conversion is a copy.
        let value = self.env.get(src);
        self.env.set(dst.clone(), value);
    }

    fn add_constraints(&mut self, csts: &LinearConstraintSystem<N>) {
        if self.is_bottom() {
            return;
        }
        let signed: LinearConstraintSystem<N> = csts
            .iter()
            .filter(|c| {
                if c.is_inequality() && c.is_unsigned() {
                    log::debug!("skipping unsigned inequality {c}");
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect();
        LinearIntervalSolver::new(&signed, DEFAULT_REDUCTION_CYCLES).run(&mut self.env);
    }

    fn assign_bool_cst(&mut self, lhs: &Var, rhs: &LinearConstraint<N>) {
        if self.is_bottom() {
            return;
        }
        let truth = self.constraint_truth(rhs);
        self.env.set(lhs.clone(), truth);
    }

    fn assign_bool_var(&mut self, lhs: &Var, rhs: &Var, negate: bool) {
        if self.is_bottom() {
            return;
        }
        let r = self.env.get(rhs).meet(&Self::boolean_range());
        let value = if negate {
            Interval::singleton_of(N::one()).sub(&r).meet(&Self::boolean_range())
        } else {
            r
        };
        self.env.set(lhs.clone(), value);
    }

    fn apply_binary_bool(&mut self, op: BoolOp, x: &Var, y: &Var, z: &Var) {
        if self.is_bottom() {
            return;
        }
        let yi = self.env.get(y).meet(&Self::boolean_range());
        let zi = self.env.get(z).meet(&Self::boolean_range());
        // Arithmetic renderings over the {0, 1} encoding; exact on
        // singletons, [0, 1] otherwise.
        let xi = match op {
            BoolOp::And => yi.mul(&zi),
            BoolOp::Or => yi.add(&zi).sub(&yi.mul(&zi)),
            BoolOp::Xor => {
                let two_yz = yi.mul(&zi).add(&yi.mul(&zi));
                yi.add(&zi).sub(&two_yz)
            }
        };
        self.env.set(x.clone(), xi.meet(&Self::boolean_range()));
    }

    fn assume_bool(&mut self, v: &Var, negated: bool) {
        if self.is_bottom() {
            return;
        }
        let assumed = self.env.get(v).meet(&Self::truth_value(!negated));
        self.env.set(v.clone(), assumed);
    }

    fn array_init(
        &mut self,
        a: &Var,
        _elem_size: &LinearExpression<N>,
        _lb_idx: &LinearExpression<N>,
        _ub_idx: &LinearExpression<N>,
        val: &LinearExpression<N>,
    ) {
        let value = self.eval(val);
        self.env.set(a.clone(), value);
    }

    fn array_load(
        &mut self,
        lhs: &Var,
        a: &Var,
        _elem_size: &LinearExpression<N>,
        _idx: &LinearExpression<N>,
    ) {
        let value = self.env.get(a);
        self.env.set(lhs.clone(), value);
    }

    fn array_store(
        &mut self,
        a: &Var,
        _elem_size: &LinearExpression<N>,
        _idx: &LinearExpression<N>,
        val: &LinearExpression<N>,
        is_strong_update: bool,
    ) {
        let value = self.eval(val);
        let stored = if is_strong_update { value } else { self.env.get(a).join(&value) };
        self.env.set(a.clone(), stored);
    }

    fn array_store_versioned(
        &mut self,
        a_new: &Var,
        a_old: &Var,
        _elem_size: &LinearExpression<N>,
        _idx: &LinearExpression<N>,
        val: &LinearExpression<N>,
        is_strong_update: bool,
    ) {
        let value = self.eval(val);
        let stored = if is_strong_update { value } else { self.env.get(a_old).join(&value) };
        self.env.set(a_new.clone(), stored);
    }

    fn array_store_range(
        &mut self,
        a: &Var,
        _elem_size: &LinearExpression<N>,
        _lo_idx: &LinearExpression<N>,
        _hi_idx: &LinearExpression<N>,
        val: &LinearExpression<N>,
    ) {
        // A range store may leave cells outside the range untouched.
        let value = self.eval(val);
        let stored = self.env.get(a).join(&value);
        self.env.set(a.clone(), stored);
    }

    fn array_store_range_versioned(
        &mut self,
        a_new: &Var,
        a_old: &Var,
        _elem_size: &LinearExpression<N>,
        _lo_idx: &LinearExpression<N>,
        _hi_idx: &LinearExpression<N>,
        val: &LinearExpression<N>,
    ) {
        let value = self.eval(val);
        let stored = self.env.get(a_old).join(&value);
        self.env.set(a_new.clone(), stored);
    }

    fn array_assign(&mut self, a: &Var, b: &Var) {
        let value = self.env.get(b);
        self.env.set(a.clone(), value);
    }

    fn region_init(&mut self, reg: &MemoryRegion) {
        self.env.forget(reg.summary());
    }

    fn ref_make(&mut self, r: &Var, _reg: &MemoryRegion) {
        // The address within the region is non-deterministic.
        self.env.forget(r);
    }

    fn ref_load(&mut self, _r: &Var, reg: &MemoryRegion, res: &Var) {
        let value = self.env.get(reg.summary());
        self.env.set(res.clone(), value);
    }

    fn ref_store(&mut self, _r: &Var, reg: &MemoryRegion, val: &LinearExpression<N>) {
        // The reference may point at any cell of the region.
        let value = self.eval(val);
        let stored = self.env.get(reg.summary()).join(&value);
        self.env.set(reg.summary().clone(), stored);
    }

    fn ref_gep(
        &mut self,
        r1: &Var,
        _reg1: &MemoryRegion,
        r2: &Var,
        _reg2: &MemoryRegion,
        offset: &LinearExpression<N>,
    ) {
        let address = self.env.get(r1).add(&self.eval(offset));
        self.env.set(r2.clone(), address);
    }

    fn ref_load_from_array(
        &mut self,
        lhs: &Var,
        _r: &Var,
        reg: &MemoryRegion,
        _idx: &LinearExpression<N>,
        _elem_size: &LinearExpression<N>,
    ) {
        let value = self.env.get(reg.summary());
        self.env.set(lhs.clone(), value);
    }

    fn ref_store_to_array(
        &mut self,
        _r: &Var,
        reg: &MemoryRegion,
        _idx: &LinearExpression<N>,
        _elem_size: &LinearExpression<N>,
        val: &LinearExpression<N>,
    ) {
        let value = self.eval(val);
        let stored = self.env.get(reg.summary()).join(&value);
        self.env.set(reg.summary().clone(), stored);
    }

    fn ref_assume(&mut self, cst: &ReferenceConstraint<N>) {
        self.add_constraint(&cst.to_linear_constraint());
    }

    fn backward_assign(&mut self, x: &Var, e: &LinearExpression<N>, inv: &Self) {
        backward::assign(self, x, e, inv);
    }

    fn backward_apply(&mut self, op: ArithOp, x: &Var, y: &Var, z: &Var, inv: &Self) {
        backward::apply(self, op, x, y, z, inv);
    }

    fn backward_apply_const(&mut self, op: ArithOp, x: &Var, y: &Var, k: &N, inv: &Self) {
        backward::apply_const(self, op, x, y, k, inv);
    }

    fn backward_assign_bool_cst(&mut self, lhs: &Var, rhs: &LinearConstraint<N>, inv: &Self) {
        if self.is_bottom() {
            return;
        }
        let lv = self.env.get(lhs).meet(&Self::boolean_range());
        if lv == Self::truth_value(true) {
            self.add_constraint(rhs);
        } else if lv == Self::truth_value(false) {
            if let Some(negated) = rhs.negate() {
                self.add_constraint(&negated);
            }
        }
        self.env.forget(lhs);
        self.meet_state(inv);
    }

    fn backward_assign_bool_var(&mut self, lhs: &Var, rhs: &Var, negate: bool, inv: &Self) {
        if self.is_bottom() {
            return;
        }
        let lv = self.env.get(lhs).meet(&Self::boolean_range());
        let rv = if negate {
            Interval::singleton_of(N::one()).sub(&lv).meet(&Self::boolean_range())
        } else {
            lv
        };
        let refined = self.env.get(rhs).meet(&rv);
        self.env.set(rhs.clone(), refined);
        self.env.forget(lhs);
        self.meet_state(inv);
    }

    fn backward_apply_binary_bool(&mut self, _op: BoolOp, x: &Var, _y: &Var, _z: &Var, inv: &Self) {
        if self.is_bottom() {
            return;
        }
        self.env.forget(x);
        self.meet_state(inv);
    }

    fn backward_array_init(
        &mut self,
        a: &Var,
        _elem_size: &LinearExpression<N>,
        _lb_idx: &LinearExpression<N>,
        _ub_idx: &LinearExpression<N>,
        _val: &LinearExpression<N>,
        inv: &Self,
    ) {
        if self.is_bottom() {
            return;
        }
        self.env.forget(a);
        self.meet_state(inv);
    }

    fn backward_array_load(
        &mut self,
        lhs: &Var,
        _a: &Var,
        _elem_size: &LinearExpression<N>,
        _idx: &LinearExpression<N>,
        inv: &Self,
    ) {
        if self.is_bottom() {
            return;
        }
        self.env.forget(lhs);
        self.meet_state(inv);
    }

    fn backward_array_store(
        &mut self,
        a: &Var,
        _elem_size: &LinearExpression<N>,
        _idx: &LinearExpression<N>,
        _val: &LinearExpression<N>,
        is_strong_update: bool,
        inv: &Self,
    ) {
        if self.is_bottom() {
            return;
        }
        // A weak update only grew the summary, so the post-state bound
        // still covers the pre-state contents; a strong update severed
        // that link.
        if is_strong_update {
            self.env.forget(a);
        }
        self.meet_state(inv);
    }

    fn backward_array_store_versioned(
        &mut self,
        a_new: &Var,
        a_old: &Var,
        _elem_size: &LinearExpression<N>,
        _idx: &LinearExpression<N>,
        _val: &LinearExpression<N>,
        is_strong_update: bool,
        inv: &Self,
    ) {
        if self.is_bottom() {
            return;
        }
        if !is_strong_update && a_new != a_old {
            let refined = self.env.get(a_old).meet(&self.env.get(a_new));
            self.env.set(a_old.clone(), refined);
        }
        self.env.forget(a_new);
        self.meet_state(inv);
    }

    fn backward_array_store_range(
        &mut self,
        _a: &Var,
        _elem_size: &LinearExpression<N>,
        _lo_idx: &LinearExpression<N>,
        _hi_idx: &LinearExpression<N>,
        _val: &LinearExpression<N>,
        inv: &Self,
    ) {
        if self.is_bottom() {
            return;
        }
        // Range stores are weak; the post-state summary covers the
        // pre-state contents.
        self.meet_state(inv);
    }

    fn backward_array_store_range_versioned(
        &mut self,
        a_new: &Var,
        a_old: &Var,
        _elem_size: &LinearExpression<N>,
        _lo_idx: &LinearExpression<N>,
        _hi_idx: &LinearExpression<N>,
        _val: &LinearExpression<N>,
        inv: &Self,
    ) {
        if self.is_bottom() {
            return;
        }
        if a_new != a_old {
            let refined = self.env.get(a_old).meet(&self.env.get(a_new));
            self.env.set(a_old.clone(), refined);
        }
        self.env.forget(a_new);
        self.meet_state(inv);
    }

    fn backward_array_assign(&mut self, a: &Var, b: &Var, inv: &Self) {
        if self.is_bottom() {
            return;
        }
        if a != b {
            let refined = self.env.get(b).meet(&self.env.get(a));
            self.env.set(b.clone(), refined);
            self.env.forget(a);
        }
        self.meet_state(inv);
    }

    fn forget(&mut self, v: &Var) {
        self.env.forget(v);
    }

    fn project(&mut self, vars: &[Var]) {
        if self.is_bottom() {
            return;
        }
        let dropped: Vec<Var> = self
            .env
            .iter()
            .map(|(v, _)| v.clone())
            .filter(|v| !vars.contains(v))
            .collect();
        for v in &dropped {
            self.env.forget(v);
        }
    }

    fn rename(&mut self, from: &[Var], to: &[Var]) -> Result<(), DomainError> {
        assert_eq!(from.len(), to.len(), "rename: variable vectors differ in length");
        if self.is_bottom() {
            return Ok(());
        }
        for (f, t) in from.iter().zip(to) {
            if f == t {
                continue;
            }
            if !self.env.get(t).is_top() {
                return Err(DomainError::VariableInScope(t.name().to_string()));
            }
            let value = self.env.get(f);
            self.env.forget(f);
            if !value.is_top() {
                self.env.set(t.clone(), value);
            }
        }
        Ok(())
    }

    fn expand(&mut self, v: &Var, duplicate: &Var) {
        let value = self.env.get(v);
        self.env.set(duplicate.clone(), value);
    }

    fn normalize(&mut self) {
        // Intervals are kept canonical by construction.
    }

    fn minimize(&mut self) {
        // The tree never stores top values; nothing to shrink.
    }

    fn intrinsic(&mut self, name: &str, _inputs: &[Var], outputs: &[Var]) {
        log::debug!("uninterpreted intrinsic `{name}`: havocking {} output(s)", outputs.len());
        for v in outputs {
            self.env.forget(v);
        }
    }

    fn backward_intrinsic(&mut self, name: &str, _inputs: &[Var], outputs: &[Var], inv: &Self) {
        if self.is_bottom() {
            return;
        }
        log::debug!("uninterpreted intrinsic `{name}` (backward)");
        for v in outputs {
            self.env.forget(v);
        }
        self.meet_state(inv);
    }

    fn to_linear_constraint_system(&self) -> LinearConstraintSystem<N> {
        let mut csts = LinearConstraintSystem::new();
        if self.is_bottom() {
            csts.add(LinearConstraint::always_false());
            return csts;
        }
        for (v, value) in self.env.iter() {
            if let Some(lb) = value.lb().number() {
                // v >= lb, as lb - v <= 0.
                csts.add(LinearConstraint::inequality(
                    LinearExpression::constant(lb.clone())
                        .sub(&LinearExpression::variable(v.clone())),
                ));
            }
            if let Some(ub) = value.ub().number() {
                // v <= ub, as v - ub <= 0.
                csts.add(LinearConstraint::inequality(
                    LinearExpression::variable(v.clone()).add_constant(-ub.clone()),
                ));
            }
        }
        csts
    }

    fn to_disjunctive_linear_constraint_system(&self) -> DisjunctiveLinearConstraintSystem<N> {
        let csts = self.to_linear_constraint_system();
        if csts.is_false() {
            DisjunctiveLinearConstraintSystem::unsat()
        } else if csts.is_true() {
            DisjunctiveLinearConstraintSystem::tautology()
        } else {
            DisjunctiveLinearConstraintSystem::from(csts)
        }
    }
}
