//! The linear interval solver.
//!
//! Assimilates a system of linear constraints into an interval
//! environment by residual propagation: for each constraint
//! `Σ cᵢ·vᵢ + c ⋈ 0` and each of its variables, the rest of the
//! expression is evaluated to an interval and the variable is met with
//! the admissible range derived from it. Passes repeat until nothing
//! changes or the cycle budget runs out; an empty meet collapses the
//! whole environment to bottom.
//!
//! Every individual refinement over-approximates the admissible set
//! (truncating division only ever widens it), so stopping early is
//! always sound.

use crate::interval::{Interval, IntervalOps};
use crate::lattice::Lattice;
use crate::linear::{ConstraintKind, LinearConstraint, LinearConstraintSystem, LinearExpression};
use crate::separate::SeparateDomain;
use crate::variable::Var;

/// Propagation passes over the full system before giving up; enough for
/// a local fixpoint on all but adversarial systems.
pub const DEFAULT_REDUCTION_CYCLES: usize = 10;

type Env<N> = SeparateDomain<Var, Interval<N>>;

/// A one-shot solver for one constraint system.
#[derive(Debug, Clone)]
pub struct LinearIntervalSolver<N> {
    csts: Vec<LinearConstraint<N>>,
    max_cycles: usize,
}

impl<N: IntervalOps> LinearIntervalSolver<N> {
    pub fn new(csts: &LinearConstraintSystem<N>, max_cycles: usize) -> Self {
        LinearIntervalSolver { csts: csts.iter().cloned().collect(), max_cycles }
    }

    /// Refine `env` toward a local fixpoint of the system.
    pub fn run(&self, env: &mut Env<N>) {
        if env.is_bottom() {
            return;
        }
        for cycle in 0..self.max_cycles {
            let mut changed = false;
            for cst in &self.csts {
                if !Self::refine(env, cst, &mut changed) {
                    env.set_to_bottom();
                    return;
                }
            }
            if !changed {
                log::trace!("linear interval solver converged after {} cycle(s)", cycle + 1);
                return;
            }
        }
        log::debug!(
            "linear interval solver stopped at its cycle budget ({})",
            self.max_cycles
        );
    }

    /// One propagation step for one constraint. Returns false when the
    /// constraint is unsatisfiable under `env`.
    fn refine(env: &mut Env<N>, cst: &LinearConstraint<N>, changed: &mut bool) -> bool {
        if cst.is_contradiction() {
            return false;
        }
        if cst.is_tautology() {
            return true;
        }
        let expr = cst.expression();
        for (coefficient, v) in expr.iter() {
            // coefficient·v must land in the negated residual of the rest.
            let target = Self::residual(env, expr, v).neg();
            let coefficient_iv = Interval::singleton_of(coefficient.clone());
            let old = env.get(v);
            let refined = match cst.kind() {
                ConstraintKind::Equality => old.meet(&target.div(&coefficient_iv)),
                ConstraintKind::Inequality => {
                    old.meet(&target.lower_half_line().div(&coefficient_iv))
                }
                ConstraintKind::Disequation => {
                    Self::trim_disequation(&old, &target, coefficient)
                }
            };
            if refined.is_bottom() {
                return false;
            }
            if refined != old {
                *changed = true;
                env.set(v.clone(), refined);
            }
        }
        true
    }

    /// The constraint expression without its `v` term, evaluated in `env`.
    fn residual(env: &Env<N>, expr: &LinearExpression<N>, v: &Var) -> Interval<N> {
        let mut r = Interval::singleton_of(expr.constant_term().clone());
        for (c, w) in expr.iter() {
            if w != v {
                r = r.add(&Interval::singleton_of(c.clone()).mul(&env.get(w)));
            }
        }
        r
    }

    /// `coefficient·v ≠ target`: clip `v`'s interval when the excluded
    /// value is exactly representable and sits on an endpoint.
    fn trim_disequation(old: &Interval<N>, target: &Interval<N>, coefficient: &N) -> Interval<N> {
        let Some(t) = target.singleton() else {
            return old.clone();
        };
        let excluded = t.clone() / coefficient.clone();
        if excluded.clone() * coefficient.clone() == *t {
            old.trim(&excluded)
        } else {
            // No value of v satisfies coefficient·v = target at all.
            old.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::Bound;
    use crate::variable::VariableFactory;
    use num_bigint::BigInt;

    fn n(v: i64) -> BigInt {
        BigInt::from(v)
    }

    fn zi(lo: i64, hi: i64) -> Interval<BigInt> {
        Interval::new(Bound::Finite(n(lo)), Bound::Finite(n(hi)))
    }

    // x >= lo as `lo - x <= 0`
    fn ge(x: &Var, lo: i64) -> LinearConstraint<BigInt> {
        LinearConstraint::inequality(
            LinearExpression::constant(n(lo)).sub(&LinearExpression::variable(x.clone())),
        )
    }

    // x <= hi as `x - hi <= 0`
    fn le(x: &Var, hi: i64) -> LinearConstraint<BigInt> {
        LinearConstraint::inequality(LinearExpression::variable(x.clone()).add_constant(n(-hi)))
    }

    #[test]
    fn inequalities_bound_a_variable() {
        let mut vf = VariableFactory::new();
        let x = vf.var("x");
        let csts: LinearConstraintSystem<BigInt> =
            [ge(&x, 0), le(&x, 10)].into_iter().collect();
        let mut env = Env::top();
        LinearIntervalSolver::new(&csts, DEFAULT_REDUCTION_CYCLES).run(&mut env);
        assert_eq!(env.get(&x), zi(0, 10));
    }

    #[test]
    fn equalities_propagate_both_ways() {
        let mut vf = VariableFactory::new();
        let x = vf.var("x");
        let y = vf.var("y");
        // x - y = 0, x in [2, 5]
        let mut csts = LinearConstraintSystem::new();
        csts.add(LinearConstraint::equality(
            LinearExpression::variable(x.clone()).sub(&LinearExpression::variable(y.clone())),
        ));
        let mut env = Env::top();
        env.set(x.clone(), zi(2, 5));
        LinearIntervalSolver::new(&csts, DEFAULT_REDUCTION_CYCLES).run(&mut env);
        assert_eq!(env.get(&y), zi(2, 5));

        // Tighten y and re-run: x follows.
        env.set(y.clone(), zi(3, 4));
        LinearIntervalSolver::new(&csts, DEFAULT_REDUCTION_CYCLES).run(&mut env);
        assert_eq!(env.get(&x), zi(3, 4));
    }

    #[test]
    fn coefficients_divide_soundly() {
        let mut vf = VariableFactory::new();
        let x = vf.var("x");
        // 2x - 7 <= 0: x <= 3 over the integers.
        let csts: LinearConstraintSystem<BigInt> = [LinearConstraint::inequality(
            LinearExpression::term(n(2), x.clone()).add_constant(n(-7)),
        )]
        .into_iter()
        .collect();
        let mut env = Env::top();
        env.set(x.clone(), zi(0, 100));
        LinearIntervalSolver::new(&csts, DEFAULT_REDUCTION_CYCLES).run(&mut env);
        assert_eq!(env.get(&x), zi(0, 3));
    }

    #[test]
    fn conflicting_constraints_collapse_to_bottom() {
        let mut vf = VariableFactory::new();
        let x = vf.var("x");
        let csts: LinearConstraintSystem<BigInt> =
            [ge(&x, 1), le(&x, 0)].into_iter().collect();
        let mut env = Env::top();
        LinearIntervalSolver::new(&csts, DEFAULT_REDUCTION_CYCLES).run(&mut env);
        assert!(env.is_bottom());
    }

    #[test]
    fn disequations_trim_endpoints() {
        let mut vf = VariableFactory::new();
        let x = vf.var("x");
        let csts: LinearConstraintSystem<BigInt> = [LinearConstraint::disequation(
            LinearExpression::variable(x.clone()),
        )]
        .into_iter()
        .collect();
        let solver = LinearIntervalSolver::new(&csts, DEFAULT_REDUCTION_CYCLES);

        let mut env = Env::top();
        env.set(x.clone(), zi(0, 5));
        solver.run(&mut env);
        assert_eq!(env.get(&x), zi(1, 5));

        // Interior exclusions cannot be represented.
        let mut env = Env::top();
        env.set(x.clone(), zi(-5, 5));
        solver.run(&mut env);
        assert_eq!(env.get(&x), zi(-5, 5));

        // x = 0 exactly: unsatisfiable.
        let mut env = Env::top();
        env.set(x.clone(), zi(0, 0));
        solver.run(&mut env);
        assert!(env.is_bottom());
    }

    #[test]
    fn assimilation_is_idempotent() {
        let mut vf = VariableFactory::new();
        let x = vf.var("x");
        let y = vf.var("y");
        let mut csts = LinearConstraintSystem::new();
        csts.add(ge(&x, 0));
        csts.add(le(&x, 10));
        csts.add(LinearConstraint::equality(
            LinearExpression::variable(x.clone()).sub(&LinearExpression::variable(y.clone())),
        ));
        let solver = LinearIntervalSolver::new(&csts, DEFAULT_REDUCTION_CYCLES);
        let mut once = Env::top();
        solver.run(&mut once);
        let mut twice = once.clone();
        solver.run(&mut twice);
        assert_eq!(once, twice);
    }
}
