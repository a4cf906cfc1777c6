//! Per-worker mailbox contents
//!
//! A `SlotState` is single-buffered: it holds at most one pending
//! assignment and at most one unclaimed result. The dispatcher writes the
//! operands and command; the owning worker writes the result. The two
//! never touch it at the same time; that exclusion is provided by the
//! runtime's handshake, not by anything in this type.

use core::fmt;
use crate::constants::TERMINATION_MARKER;
use crate::op::{Operator, Outcome};
use crate::record::ResultRecord;
use crate::ticket::WorkTicket;

/// What the worker should do with the slot it was woken for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Evaluate `operand1 <op> operand2`
    Compute(Operator),

    /// Leave the worker loop
    Terminate,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Compute(op) => write!(f, "{}", op),
            Command::Terminate => write!(f, "{}", TERMINATION_MARKER),
        }
    }
}

/// Shared data for one worker
#[derive(Debug, Clone, Default)]
pub struct SlotState {
    pub operand1: i64,
    pub operand2: i64,
    /// `None` until the dispatcher posts the first assignment
    pub command: Option<Command>,
    pub result: Outcome,
    pub has_unclaimed_result: bool,
}

impl SlotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher: claim the result left by the previous assignment.
    ///
    /// Returns `None` if the worker has not completed anything since the
    /// last harvest. Clears the unclaimed flag.
    pub fn take_unclaimed(&mut self, worker: usize) -> Option<ResultRecord> {
        if !self.has_unclaimed_result {
            return None;
        }
        self.has_unclaimed_result = false;

        match self.command {
            Some(Command::Compute(operator)) => Some(ResultRecord {
                worker,
                operand1: self.operand1,
                operator,
                operand2: self.operand2,
                outcome: self.result,
            }),
            // A result is only ever published for a compute command
            _ => None,
        }
    }

    /// Dispatcher: write a new assignment.
    ///
    /// The previous result must already have been harvested.
    pub fn post(&mut self, ticket: &WorkTicket) {
        debug_assert!(!self.has_unclaimed_result, "overwriting an unclaimed result");
        self.operand1 = ticket.operand1;
        self.operand2 = ticket.operand2;
        self.command = Some(Command::Compute(ticket.operator));
    }

    /// Dispatcher: write the termination marker.
    pub fn post_termination(&mut self) {
        debug_assert!(!self.has_unclaimed_result, "terminating with an unclaimed result");
        self.command = Some(Command::Terminate);
    }

    /// Worker: publish the outcome of the current assignment.
    pub fn store_result(&mut self, outcome: Outcome) {
        self.result = outcome;
        self.has_unclaimed_result = true;
    }
}
