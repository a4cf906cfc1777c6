//! Result records and the ordered result log

use core::fmt;
use std::io::{self, Write};
use crate::constants::ERROR_RESULT;
use crate::op::{Operator, Outcome};

/// One harvested computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRecord {
    /// Worker that computed it
    pub worker: usize,
    pub operand1: i64,
    pub operator: Operator,
    pub operand2: i64,
    pub outcome: Outcome,
}

/// Formats as `<num1><op><num2>=<result>`, with `ERR` for failed results
impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}=", self.operand1, self.operator, self.operand2)?;
        match self.outcome {
            Outcome::Value(v) => write!(f, "{}", v),
            Outcome::Failed(_) => f.write_str(ERROR_RESULT),
        }
    }
}

/// Harvested results in harvest order
///
/// Owned by the dispatcher. Entries are appended once and never changed.
#[derive(Debug, Clone, Default)]
pub struct ResultLog {
    records: Vec<ResultRecord>,
    expected: usize,
}

impl ResultLog {
    /// Create a log sized for `expected` tickets
    pub fn with_expected(expected: usize) -> Self {
        Self {
            records: Vec::with_capacity(expected),
            expected,
        }
    }

    pub fn push(&mut self, record: ResultRecord) {
        if self.records.len() >= self.expected {
            log::warn!(
                "result log already holds {} of {} expected records, appending {}",
                self.records.len(),
                self.expected,
                record
            );
        }
        self.records.push(record);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of tickets the log was sized for
    #[inline]
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// True once every expected ticket has a record
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.records.len() == self.expected
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter()
    }

    /// Formatted lines, one per record
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }

    /// Write every record as a line
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        for record in &self.records {
            writeln!(out, "{}", record)?;
        }
        out.flush()
    }
}

impl<'a> IntoIterator for &'a ResultLog {
    type Item = &'a ResultRecord;
    type IntoIter = std::slice::Iter<'a, ResultRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
