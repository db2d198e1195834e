//! End-to-end scenarios for the interval domain: transfer functions,
//! widening/narrowing sequences, and the constraint round-trip.

use abstract_domains::*;
use num_bigint::BigInt;

fn n(v: i64) -> BigInt {
    BigInt::from(v)
}

fn zi(lo: i64, hi: i64) -> Interval<BigInt> {
    Interval::new(Bound::Finite(n(lo)), Bound::Finite(n(hi)))
}

fn var_expr(v: &Var) -> LinearExpression<BigInt> {
    LinearExpression::variable(v.clone())
}

#[test]
fn addition_of_two_ranges() {
    // x := [1, 5]; y := [-2, 3]; z := x + y.
    let mut vf = VariableFactory::new();
    let (x, y, z) = (vf.var("x"), vf.var("y"), vf.var("z"));
    let mut s = ZIntervalDomain::top();
    s.set(x.clone(), zi(1, 5));
    s.set(y.clone(), zi(-2, 3));
    s.apply(ArithOp::Add, &z, &x, &y);
    assert_eq!(s.get(&z), zi(-1, 8));
}

#[test]
fn division_by_a_zero_spanning_divisor() {
    // y := x / [-3, 2] splits the divisor at zero and joins both halves.
    let mut vf = VariableFactory::new();
    let (x, d, y) = (vf.var("x"), vf.var("d"), vf.var("y"));
    let mut s = ZIntervalDomain::top();
    s.set(x.clone(), zi(1, 10));
    s.set(d.clone(), zi(-3, 2));
    s.apply(ArithOp::Div, &y, &x, &d);
    assert_eq!(s.get(&y), zi(-10, 10));
}

#[test]
fn widening_with_and_without_thresholds() {
    let mut vf = VariableFactory::new();
    let x = vf.var("x");
    let mut a = ZIntervalDomain::top();
    a.set(x.clone(), zi(0, 10));
    let mut b = ZIntervalDomain::top();
    b.set(x.clone(), zi(0, 20));

    let widened = a.widen(&b);
    assert_eq!(widened.get(&x), Interval::new(Bound::Finite(n(0)), Bound::PlusInf));

    let ts: Thresholds<BigInt> = [100i64].iter().map(|&v| BigInt::from(v)).collect();
    let snapped = a.widening_thresholds(&b, &ts);
    assert_eq!(snapped.get(&x), zi(0, 100));
}

#[test]
fn meet_collapses_on_contradiction() {
    let mut vf = VariableFactory::new();
    let x = vf.var("x");
    let mut a = ZIntervalDomain::top();
    a.set(x.clone(), zi(0, 5));
    let mut b = ZIntervalDomain::top();
    b.set(x.clone(), zi(10, 20));
    assert!(a.meet(&b).is_bottom());
}

#[test]
fn shifts_by_singleton_and_negative_amounts() {
    let mut vf = VariableFactory::new();
    let (x, k, y) = (vf.var("x"), vf.var("k"), vf.var("y"));
    let mut s = ZIntervalDomain::top();
    s.set(x.clone(), zi(3, 3));
    s.set(k.clone(), zi(2, 2));
    s.apply_bitwise(BitwiseOp::Shl, &y, &x, &k);
    assert_eq!(s.get(&y), zi(12, 12));

    s.set(k.clone(), zi(-1, -1));
    s.apply_bitwise(BitwiseOp::Shl, &y, &x, &k);
    assert!(s.get(&y).is_top());
}

#[test]
fn forgetting_a_variable_reads_back_as_top() {
    let mut vf = VariableFactory::new();
    let (x, y) = (vf.var("x"), vf.var("y"));
    let mut s = ZIntervalDomain::top();
    s.set(x.clone(), zi(0, 5));
    s.set(y.clone(), zi(1, 1));
    s.forget(&x);
    assert!(s.get(&x).is_top());
    assert_eq!(s.get(&y), zi(1, 1));
}

#[test]
fn ascending_loop_stabilizes_under_widening_then_narrows() {
    // The classic counting loop: x starts at 0 and the body computes
    // x := x + 1 while x <= 9. Widening finds [0, +oo] in finitely many
    // steps; narrowing against the guarded body recovers [0, 10].
    let mut vf = VariableFactory::new();
    let x = vf.var("x");

    let body = |s: &ZIntervalDomain| {
        let mut entry = ZIntervalDomain::top();
        entry.set(x.clone(), zi(0, 0));
        // Guard x <= 9, then increment.
        let mut guarded = s.clone();
        guarded.add_constraint(&LinearConstraint::inequality(
            var_expr(&x).add_constant(n(-9)),
        ));
        guarded.assign(&x, &var_expr(&x).add_constant(n(1)));
        entry.join(&guarded)
    };

    let mut state = ZIntervalDomain::bottom();
    let mut steps = 0;
    loop {
        let next = state.widen(&body(&state));
        if next.leq(&state) {
            break;
        }
        state = next;
        steps += 1;
        assert!(steps < 10, "widening failed to stabilize");
    }
    assert_eq!(state.get(&x), Interval::new(Bound::Finite(n(0)), Bound::PlusInf));

    for _ in 0..2 {
        state = state.narrow(&body(&state));
    }
    assert_eq!(state.get(&x), zi(0, 10));
}

#[test]
fn transfer_functions_are_monotone_on_samples() {
    let mut vf = VariableFactory::new();
    let (x, y) = (vf.var("x"), vf.var("y"));

    let mut small = ZIntervalDomain::top();
    small.set(x.clone(), zi(2, 3));
    let mut large = ZIntervalDomain::top();
    large.set(x.clone(), zi(0, 5));
    assert!(small.leq(&large));

    let e = var_expr(&x).add_constant(n(7));
    let mut fs = small.clone();
    fs.assign(&y, &e);
    let mut fl = large.clone();
    fl.assign(&y, &e);
    assert!(fs.leq(&fl));

    let mut gs = small.clone();
    gs.apply_const(ArithOp::Mul, &y, &x, &n(-2));
    let mut gl = large.clone();
    gl.apply_const(ArithOp::Mul, &y, &x, &n(-2));
    assert!(gs.leq(&gl));

    let cst = LinearConstraint::inequality(var_expr(&x).add_constant(n(-4)));
    let mut hs = small.clone();
    hs.add_constraint(&cst);
    let mut hl = large.clone();
    hl.add_constraint(&cst);
    assert!(hs.leq(&hl));
}

#[test]
fn exported_constraints_reassimilate_without_loss() {
    let mut vf = VariableFactory::new();
    let (x, y, z) = (vf.var("x"), vf.var("y"), vf.var("z"));
    let mut s = ZIntervalDomain::top();
    s.set(x.clone(), zi(1, 5));
    s.set(y.clone(), Interval::new(Bound::MinusInf, Bound::Finite(n(9))));
    s.set(z.clone(), zi(-2, -2));

    let mut rebuilt = ZIntervalDomain::top();
    rebuilt.add_constraints(&s.to_linear_constraint_system());
    assert!(rebuilt.leq(&s));
    assert!(s.leq(&rebuilt));
}

#[test]
fn constraint_assimilation_is_idempotent() {
    let mut vf = VariableFactory::new();
    let (x, y) = (vf.var("x"), vf.var("y"));
    let mut csts = LinearConstraintSystem::new();
    // 0 <= x <= 10 and y = x.
    csts.add(LinearConstraint::inequality(var_expr(&x).neg()));
    csts.add(LinearConstraint::inequality(var_expr(&x).add_constant(n(-10))));
    csts.add(LinearConstraint::equality(var_expr(&y).sub(&var_expr(&x))));

    let mut once = ZIntervalDomain::top();
    once.add_constraints(&csts);
    let mut twice = once.clone();
    twice.add_constraints(&csts);
    assert_eq!(once, twice);
    assert_eq!(once.get(&y), zi(0, 10));
}

#[test]
fn bottom_propagates_through_every_operation() {
    let mut vf = VariableFactory::new();
    let (x, y, z) = (vf.var("x"), vf.var("y"), vf.var("z"));
    let mut s = ZIntervalDomain::bottom();
    s.assign(&x, &LinearExpression::constant(n(1)));
    s.apply(ArithOp::Add, &z, &x, &y);
    s.add_constraint(&LinearConstraint::inequality(var_expr(&x)));
    assert!(s.is_bottom());
    assert_eq!(s.get(&x), Interval::bottom());
}

#[test]
fn rational_domain_shares_the_contract() {
    use num_rational::BigRational;

    let q = |a: i64, b: i64| BigRational::new(BigInt::from(a), BigInt::from(b));
    let mut vf = VariableFactory::new();
    let (x, y) = (vf.var("x"), vf.var("y"));

    let mut s = QIntervalDomain::top();
    s.set(
        x.clone(),
        Interval::new(Bound::Finite(q(1, 2)), Bound::Finite(q(3, 2))),
    );
    s.apply_const(ArithOp::Mul, &y, &x, &q(2, 1));
    assert_eq!(
        s.get(&y),
        Interval::new(Bound::Finite(q(1, 1)), Bound::Finite(q(3, 1)))
    );

    // Bitwise reasoning needs bit widths; the rational domain answers top.
    s.apply_bitwise(BitwiseOp::And, &y, &x, &x);
    assert!(s.get(&y).is_top());
}
