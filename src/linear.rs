//! Linear expressions and constraints over program variables.
//!
//! An expression is `Σ cᵢ·vᵢ + c` with exact coefficients; a constraint
//! compares an expression against zero (`= 0`, `≠ 0`, `≤ 0`). This is the
//! exchange format between domains: states assimilate constraint systems,
//! and export their knowledge back as one.

use std::collections::BTreeMap;
use std::fmt;

use crate::number::Numeric;
use crate::variable::Var;

/// A linear expression `Σ cᵢ·vᵢ + c`.
///
/// Zero coefficients are never stored; terms iterate in variable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearExpression<N> {
    terms: BTreeMap<Var, N>,
    constant: N,
}

impl<N: Numeric> LinearExpression<N> {
    pub fn zero() -> Self {
        LinearExpression { terms: BTreeMap::new(), constant: N::zero() }
    }

    pub fn constant(n: N) -> Self {
        LinearExpression { terms: BTreeMap::new(), constant: n }
    }

    /// The expression `1·v`.
    pub fn variable(v: Var) -> Self {
        Self::term(N::one(), v)
    }

    pub fn term(coefficient: N, v: Var) -> Self {
        let mut e = Self::zero();
        e.add_term(coefficient, v);
        e
    }

    pub fn constant_term(&self) -> &N {
        &self.constant
    }

    /// Add `coefficient·v`, merging with an existing term for `v`.
    pub fn add_term(&mut self, coefficient: N, v: Var) {
        let c = match self.terms.remove(&v) {
            Some(existing) => existing + coefficient,
            None => coefficient,
        };
        if !c.is_zero() {
            self.terms.insert(v, c);
        }
    }

    pub fn add_constant(&self, n: N) -> Self {
        let mut e = self.clone();
        e.constant = e.constant + n;
        e
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut e = self.clone();
        e.constant = e.constant + other.constant.clone();
        for (v, c) in &other.terms {
            e.add_term(c.clone(), v.clone());
        }
        e
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Self {
        LinearExpression {
            terms: self.terms.iter().map(|(v, c)| (v.clone(), -c.clone())).collect(),
            constant: -self.constant.clone(),
        }
    }

    pub fn scale(&self, n: &N) -> Self {
        if n.is_zero() {
            return Self::zero();
        }
        LinearExpression {
            terms: self.terms.iter().map(|(v, c)| (v.clone(), c.clone() * n.clone())).collect(),
            constant: self.constant.clone() * n.clone(),
        }
    }

    /// Iterate `(coefficient, variable)` pairs in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&N, &Var)> {
        self.terms.iter().map(|(v, c)| (c, v))
    }

    pub fn variables(&self) -> impl Iterator<Item = &Var> {
        self.terms.keys()
    }

    pub fn occurs(&self, v: &Var) -> bool {
        self.terms.contains_key(v)
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// The sole variable when the expression is exactly `1·v`.
    pub fn get_variable(&self) -> Option<&Var> {
        if self.constant.is_zero() && self.terms.len() == 1 {
            let (v, c) = self.terms.iter().next()?;
            c.is_one().then_some(v)
        } else {
            None
        }
    }
}

impl<N: Numeric> From<Var> for LinearExpression<N> {
    fn from(v: Var) -> Self {
        Self::variable(v)
    }
}

impl<N: Numeric> fmt::Display for LinearExpression<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (c, v) in self.iter() {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            if c.is_one() {
                write!(f, "{v}")?;
            } else {
                write!(f, "{c}*{v}")?;
            }
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant.is_zero() {
            Ok(())
        } else {
            write!(f, " + {}", self.constant)
        }
    }
}

/// How a constraint compares its expression against zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `e = 0`
    Equality,
    /// `e ≠ 0`
    Disequation,
    /// `e ≤ 0`
    Inequality,
}

/// A linear constraint `e ⋈ 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint<N> {
    expr: LinearExpression<N>,
    kind: ConstraintKind,
    // Inequalities from unsigned machine comparisons; interval-style
    // solvers must skip these (signed reasoning does not apply).
    unsigned: bool,
}

impl<N: Numeric> LinearConstraint<N> {
    pub fn equality(expr: LinearExpression<N>) -> Self {
        LinearConstraint { expr, kind: ConstraintKind::Equality, unsigned: false }
    }

    pub fn disequation(expr: LinearExpression<N>) -> Self {
        LinearConstraint { expr, kind: ConstraintKind::Disequation, unsigned: false }
    }

    pub fn inequality(expr: LinearExpression<N>) -> Self {
        LinearConstraint { expr, kind: ConstraintKind::Inequality, unsigned: false }
    }

    pub fn unsigned_inequality(expr: LinearExpression<N>) -> Self {
        LinearConstraint { expr, kind: ConstraintKind::Inequality, unsigned: true }
    }

    /// The unsatisfiable sentinel `1 = 0`.
    pub fn always_false() -> Self {
        Self::equality(LinearExpression::constant(N::one()))
    }

    pub fn expression(&self) -> &LinearExpression<N> {
        &self.expr
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn is_inequality(&self) -> bool {
        self.kind == ConstraintKind::Inequality
    }

    pub fn is_equality(&self) -> bool {
        self.kind == ConstraintKind::Equality
    }

    pub fn is_disequation(&self) -> bool {
        self.kind == ConstraintKind::Disequation
    }

    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    /// Trivially unsatisfiable: a variable-free expression violating its
    /// own comparison.
    pub fn is_contradiction(&self) -> bool {
        if !self.expr.is_constant() {
            return false;
        }
        let c = self.expr.constant_term();
        match self.kind {
            ConstraintKind::Equality => !c.is_zero(),
            ConstraintKind::Disequation => c.is_zero(),
            ConstraintKind::Inequality => c.is_positive(),
        }
    }

    /// Trivially satisfied.
    pub fn is_tautology(&self) -> bool {
        self.expr.is_constant() && !self.is_contradiction()
    }

    /// The negated constraint, when the number line can express it.
    ///
    /// `¬(e ≤ 0)` is `e ≥ 1` on a discrete line but needs a strict
    /// comparison on a dense one, so rational inequalities return `None`.
    pub fn negate(&self) -> Option<Self> {
        match self.kind {
            ConstraintKind::Equality => Some(LinearConstraint {
                expr: self.expr.clone(),
                kind: ConstraintKind::Disequation,
                unsigned: self.unsigned,
            }),
            ConstraintKind::Disequation => Some(LinearConstraint {
                expr: self.expr.clone(),
                kind: ConstraintKind::Equality,
                unsigned: self.unsigned,
            }),
            ConstraintKind::Inequality => {
                let one_up = N::zero().successor()?;
                Some(LinearConstraint {
                    expr: self.expr.neg().add_constant(one_up),
                    kind: ConstraintKind::Inequality,
                    unsigned: self.unsigned,
                })
            }
        }
    }
}

impl<N: Numeric> fmt::Display for LinearConstraint<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.kind {
            ConstraintKind::Equality => "=",
            ConstraintKind::Disequation => "!=",
            ConstraintKind::Inequality => "<=",
        };
        write!(f, "{} {op} 0", self.expr)
    }
}

/// A conjunction of linear constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraintSystem<N> {
    csts: Vec<LinearConstraint<N>>,
}

impl<N: Numeric> LinearConstraintSystem<N> {
    pub fn new() -> Self {
        LinearConstraintSystem { csts: Vec::new() }
    }

    pub fn add(&mut self, cst: LinearConstraint<N>) {
        self.csts.push(cst);
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinearConstraint<N>> {
        self.csts.iter()
    }

    pub fn len(&self) -> usize {
        self.csts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.csts.is_empty()
    }

    pub fn is_false(&self) -> bool {
        self.csts.iter().any(|c| c.is_contradiction())
    }

    pub fn is_true(&self) -> bool {
        self.csts.iter().all(|c| c.is_tautology())
    }
}

impl<N: Numeric> Default for LinearConstraintSystem<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Numeric> From<LinearConstraint<N>> for LinearConstraintSystem<N> {
    fn from(cst: LinearConstraint<N>) -> Self {
        let mut s = Self::new();
        s.add(cst);
        s
    }
}

impl<N: Numeric> FromIterator<LinearConstraint<N>> for LinearConstraintSystem<N> {
    fn from_iter<I: IntoIterator<Item = LinearConstraint<N>>>(iter: I) -> Self {
        LinearConstraintSystem { csts: iter.into_iter().collect() }
    }
}

impl<N: Numeric> fmt::Display for LinearConstraintSystem<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, c) in self.csts.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "}}")
    }
}

/// A disjunction of constraint conjunctions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisjunctiveLinearConstraintSystem<N> {
    is_false: bool,
    disjuncts: Vec<LinearConstraintSystem<N>>,
}

impl<N: Numeric> DisjunctiveLinearConstraintSystem<N> {
    /// The unsatisfiable disjunction.
    pub fn unsat() -> Self {
        DisjunctiveLinearConstraintSystem { is_false: true, disjuncts: Vec::new() }
    }

    /// The trivially satisfied disjunction.
    pub fn tautology() -> Self {
        DisjunctiveLinearConstraintSystem { is_false: false, disjuncts: Vec::new() }
    }

    pub fn is_false(&self) -> bool {
        self.is_false
    }

    pub fn is_true(&self) -> bool {
        !self.is_false && self.disjuncts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinearConstraintSystem<N>> {
        self.disjuncts.iter()
    }
}

impl<N: Numeric> From<LinearConstraintSystem<N>> for DisjunctiveLinearConstraintSystem<N> {
    fn from(csts: LinearConstraintSystem<N>) -> Self {
        DisjunctiveLinearConstraintSystem { is_false: false, disjuncts: vec![csts] }
    }
}

impl<N: Numeric> fmt::Display for DisjunctiveLinearConstraintSystem<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_false {
            return write!(f, "false");
        }
        if self.disjuncts.is_empty() {
            return write!(f, "true");
        }
        for (i, c) in self.disjuncts.iter().enumerate() {
            if i > 0 {
                write!(f, " or ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
