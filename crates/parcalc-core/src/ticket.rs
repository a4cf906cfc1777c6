//! Work tickets and worker selectors

use core::fmt;
use crate::op::Operator;

/// Which worker a ticket should run on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSelector {
    /// A named worker (0-based index)
    Specific(usize),

    /// Whichever worker is free first
    AnyFree,
}

impl WorkerSelector {
    /// Build a selector from the 1-based id used in config files.
    /// Id 0 means "any free worker".
    #[inline]
    pub const fn from_config_id(id: usize) -> Self {
        if id == 0 {
            WorkerSelector::AnyFree
        } else {
            WorkerSelector::Specific(id - 1)
        }
    }
}

impl fmt::Display for WorkerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerSelector::Specific(i) => write!(f, "worker {}", i),
            WorkerSelector::AnyFree => write!(f, "any free worker"),
        }
    }
}

/// One arithmetic job, consumed exactly once by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkTicket {
    pub target: WorkerSelector,
    pub operand1: i64,
    pub operand2: i64,
    pub operator: Operator,
}

impl WorkTicket {
    pub const fn new(target: WorkerSelector, operand1: i64, operator: Operator, operand2: i64) -> Self {
        Self { target, operand1, operand2, operator }
    }

    /// Ticket pinned to worker `index`
    pub const fn specific(index: usize, operand1: i64, operator: Operator, operand2: i64) -> Self {
        Self::new(WorkerSelector::Specific(index), operand1, operator, operand2)
    }

    /// Ticket for whichever worker is free first
    pub const fn any_free(operand1: i64, operator: Operator, operand2: i64) -> Self {
        Self::new(WorkerSelector::AnyFree, operand1, operator, operand2)
    }
}

impl fmt::Display for WorkTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.operand1, self.operator, self.operand2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_id() {
        assert_eq!(WorkerSelector::from_config_id(0), WorkerSelector::AnyFree);
        assert_eq!(WorkerSelector::from_config_id(1), WorkerSelector::Specific(0));
        assert_eq!(WorkerSelector::from_config_id(7), WorkerSelector::Specific(6));
    }

    #[test]
    fn test_display() {
        let t = WorkTicket::any_free(10, Operator::Sub, -2);
        assert_eq!(format!("{}", t), "10--2");
    }
}
