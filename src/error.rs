//! Error type for the fail-stop conditions of the domain library.

use thiserror::Error;

/// Fatal analysis errors.
///
/// These all indicate a caller bug rather than an analysis outcome:
/// sound transfer functions recover locally from everything else
/// (divisors containing zero, huge shifts, unknown variables) by
/// returning an over-approximation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// `(+oo) + (-oo)` has no meaningful value of either sign.
    #[error("bound: undefined operation -oo + +oo")]
    OppositeInfinities,

    /// Division by a bound that is exactly zero.
    #[error("bound: division by zero")]
    DivisionByZero,

    /// `rename` requires its target variables to be fresh.
    #[error("rename: variable `{0}` is already bound in the abstract state")]
    VariableInScope(String),
}
