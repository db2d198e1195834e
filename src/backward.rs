//! Backward (inverse) transfer helpers.
//!
//! Backward analysis runs transfer functions against the statement
//! direction: given an abstract post-state, compute an over-approximation
//! of the pre-states that can reach it, meet with the forward invariant
//! `inv` known at the program point.
//!
//! The helpers express each statement's input/output relation as linear
//! constraints and let the domain's own assimilation do the refinement,
//! which keeps them generic over any [`AbstractDomain`]. Relations that
//! are not linear (variable×variable products, variable divisors) fall
//! back to forgetting the defined variable, which is sound.

use crate::domain::{AbstractDomain, ArithOp};
use crate::linear::{LinearConstraint, LinearExpression};
use crate::variable::Var;
use num_traits::{One, Signed, Zero};

/// Inverse of `x := e`.
pub fn assign<D: AbstractDomain>(dom: &mut D, x: &Var, e: &LinearExpression<D::Number>, inv: &D) {
    if dom.is_bottom() {
        return;
    }
    if !e.occurs(x) {
        // In the post-state x equals e, so x's knowledge flows into e's
        // variables before x is erased.
        let relation = e.sub(&LinearExpression::variable(x.clone()));
        dom.add_constraint(&LinearConstraint::equality(relation));
    }
    dom.forget(x);
    *dom = dom.meet(inv);
}

/// Inverse of `x := y op z`.
pub fn apply<D: AbstractDomain>(dom: &mut D, op: ArithOp, x: &Var, y: &Var, z: &Var, inv: &D) {
    if dom.is_bottom() {
        return;
    }
    if x != y && x != z {
        let x_e = LinearExpression::variable(x.clone());
        let y_e = LinearExpression::variable(y.clone());
        let z_e = LinearExpression::variable(z.clone());
        match op {
            ArithOp::Add => {
                dom.add_constraint(&LinearConstraint::equality(y_e.add(&z_e).sub(&x_e)));
            }
            ArithOp::Sub => {
                dom.add_constraint(&LinearConstraint::equality(y_e.sub(&z_e).sub(&x_e)));
            }
            // The product/quotient relations are not linear in two
            // unknowns; erasing x below is the sound fallback.
            ArithOp::Mul | ArithOp::Div => {}
        }
    }
    dom.forget(x);
    *dom = dom.meet(inv);
}

/// Inverse of `x := y op k`.
pub fn apply_const<D: AbstractDomain>(
    dom: &mut D,
    op: ArithOp,
    x: &Var,
    y: &Var,
    k: &D::Number,
    inv: &D,
) {
    if dom.is_bottom() {
        return;
    }
    if x != y {
        let x_e = LinearExpression::variable(x.clone());
        let y_e = LinearExpression::variable(y.clone());
        match op {
            ArithOp::Add => {
                // y + k - x = 0
                dom.add_constraint(&LinearConstraint::equality(
                    y_e.add_constant(k.clone()).sub(&x_e),
                ));
            }
            ArithOp::Sub => {
                dom.add_constraint(&LinearConstraint::equality(
                    y_e.add_constant(-k.clone()).sub(&x_e),
                ));
            }
            ArithOp::Mul => {
                // k·y - x = 0; a zero k pins x to zero and leaves y free.
                dom.add_constraint(&LinearConstraint::equality(
                    LinearExpression::term(k.clone(), y.clone()).sub(&x_e),
                ));
            }
            ArithOp::Div => {
                // x = y / k truncates, so y sits within |k| - 1 of k·x:
                // both y - k·x - (|k|-1) <= 0 and k·x - y - (|k|-1) <= 0.
                if !k.is_zero() {
                    let slack = k.abs() - D::Number::one();
                    let k_x = LinearExpression::term(k.clone(), x.clone());
                    dom.add_constraint(&LinearConstraint::inequality(
                        y_e.sub(&k_x).add_constant(-slack.clone()),
                    ));
                    dom.add_constraint(&LinearConstraint::inequality(
                        k_x.sub(&y_e).add_constant(-slack),
                    ));
                }
            }
        }
    }
    dom.forget(x);
    *dom = dom.meet(inv);
}
