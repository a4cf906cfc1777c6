//! Arithmetic operators and computation outcomes

use core::fmt;
use thiserror::Error;

/// One of the four binary operators a worker can evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Character used in config files and result lines
    #[inline]
    pub const fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// Parse an operator character
    pub const fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    /// Evaluate `lhs <op> rhs`
    ///
    /// Division truncates toward zero. Division by zero and any result
    /// outside the `i64` range are reported as errors instead of panicking.
    pub fn apply(&self, lhs: i64, rhs: i64) -> Result<i64, ArithmeticError> {
        match self {
            Operator::Add => lhs.checked_add(rhs).ok_or(ArithmeticError::Overflow),
            Operator::Sub => lhs.checked_sub(rhs).ok_or(ArithmeticError::Overflow),
            Operator::Mul => lhs.checked_mul(rhs).ok_or(ArithmeticError::Overflow),
            Operator::Div => {
                if rhs == 0 {
                    return Err(ArithmeticError::DivisionByZero);
                }
                lhs.checked_div(rhs).ok_or(ArithmeticError::Overflow)
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Arithmetic failure surfaced by a worker as an error result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,
}

/// Result a worker publishes into its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Value(i64),
    Failed(ArithmeticError),
}

impl Outcome {
    /// Computed value, if the computation succeeded
    #[inline]
    pub fn value(&self) -> Option<i64> {
        match self {
            Outcome::Value(v) => Some(*v),
            Outcome::Failed(_) => None,
        }
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl From<Result<i64, ArithmeticError>> for Outcome {
    fn from(r: Result<i64, ArithmeticError>) -> Self {
        match r {
            Ok(v) => Outcome::Value(v),
            Err(e) => Outcome::Failed(e),
        }
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Outcome::Value(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        for op in [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div] {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol('K'), None);
        assert_eq!(Operator::from_symbol('%'), None);
    }

    #[test]
    fn test_apply() {
        assert_eq!(Operator::Add.apply(3, 4), Ok(7));
        assert_eq!(Operator::Sub.apply(10, 2), Ok(8));
        assert_eq!(Operator::Mul.apply(6, 7), Ok(42));
        assert_eq!(Operator::Div.apply(9, 3), Ok(3));
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(Operator::Div.apply(7, 2), Ok(3));
        assert_eq!(Operator::Div.apply(-7, 2), Ok(-3));
        assert_eq!(Operator::Div.apply(7, -2), Ok(-3));
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eq!(Operator::Div.apply(5, 0), Err(ArithmeticError::DivisionByZero));
        assert_eq!(Operator::Div.apply(i64::MIN, -1), Err(ArithmeticError::Overflow));
        assert_eq!(Operator::Add.apply(i64::MAX, 1), Err(ArithmeticError::Overflow));
        assert_eq!(Operator::Mul.apply(i64::MAX, 2), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: Outcome = Operator::Add.apply(1, 2).into();
        assert_eq!(ok.value(), Some(3));
        assert!(!ok.is_failed());

        let failed: Outcome = Operator::Div.apply(1, 0).into();
        assert_eq!(failed, Outcome::Failed(ArithmeticError::DivisionByZero));
        assert_eq!(failed.value(), None);
    }
}
