//! Configuration file parser
//!
//! ```text
//! 3            <- NUM_PROC, number of workers (>= 1)
//! 1 3 + 4      <- <id> <num1> <op> <num2>; id 0 = any free worker
//! 0 10 - 2
//!              <- blank line (or end of file) ends the ticket list
//! ```
//!
//! Worker ids in the file are 1-based; tickets carry 0-based indices.

use std::fs;
use std::path::Path;
use crate::constants::MAX_WORKERS;
use crate::error::{SimError, SimResult};
use crate::op::Operator;
use crate::ticket::{WorkTicket, WorkerSelector};

/// A parsed configuration: worker count plus the tickets, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub num_workers: usize,
    pub tickets: Vec<WorkTicket>,
}

impl Program {
    pub fn new(num_workers: usize, tickets: Vec<WorkTicket>) -> Self {
        Self { num_workers, tickets }
    }
}

/// Read and parse a config file
pub fn load_program(path: &Path) -> SimResult<Program> {
    let text = fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_program(&text)
}

/// Parse config file contents
pub fn parse_program(text: &str) -> SimResult<Program> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    let header = match lines.next() {
        Some((_, l)) if !l.is_empty() => l,
        _ => return Err(SimError::EmptyConfig),
    };
    let value: i64 = header
        .parse()
        .map_err(|_| SimError::parse(1, format!("worker count '{}' is not an integer", header)))?;
    if value < 1 {
        return Err(SimError::InvalidWorkerCount { value });
    }
    let num_workers = value as usize;
    if num_workers > MAX_WORKERS {
        return Err(SimError::TooManyWorkers { requested: num_workers, max: MAX_WORKERS });
    }

    let mut tickets = Vec::new();
    for (line_no, line) in lines {
        if line.is_empty() {
            break;
        }
        tickets.push(parse_ticket(line_no, line, num_workers)?);
    }

    log::debug!("parsed {} tickets for {} workers", tickets.len(), num_workers);
    Ok(Program { num_workers, tickets })
}

fn parse_ticket(line_no: usize, line: &str, num_workers: usize) -> SimResult<WorkTicket> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [id, num1, op, num2] = fields.as_slice() else {
        return Err(SimError::parse(
            line_no,
            format!("expected '<id> <num1> <op> <num2>', found {} fields", fields.len()),
        ));
    };

    let id: usize = id
        .parse()
        .map_err(|_| SimError::parse(line_no, format!("worker id '{}' is not a non-negative integer", id)))?;
    if id > num_workers {
        return Err(SimError::parse(
            line_no,
            format!("worker id {} exceeds worker count {}", id, num_workers),
        ));
    }

    let operand1 = parse_operand(line_no, num1)?;
    let operator = parse_operator(line_no, op)?;
    let operand2 = parse_operand(line_no, num2)?;

    Ok(WorkTicket::new(WorkerSelector::from_config_id(id), operand1, operator, operand2))
}

fn parse_operand(line_no: usize, s: &str) -> SimResult<i64> {
    s.parse()
        .map_err(|_| SimError::parse(line_no, format!("operand '{}' is not an integer", s)))
}

fn parse_operator(line_no: usize, s: &str) -> SimResult<Operator> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Operator::from_symbol(c)
            .ok_or_else(|| SimError::parse(line_no, format!("unknown operator '{}'", c))),
        _ => Err(SimError::parse(line_no, format!("unknown operator '{}'", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let program = parse_program("1\n1 3 + 4\n0 10 - 2\n\n").unwrap();
        assert_eq!(program.num_workers, 1);
        assert_eq!(
            program.tickets,
            vec![
                WorkTicket::specific(0, 3, Operator::Add, 4),
                WorkTicket::any_free(10, Operator::Sub, 2),
            ]
        );
    }

    #[test]
    fn test_blank_line_terminates() {
        let program = parse_program("2\n0 6 * 7\n\n1 9 / 3\n").unwrap();
        assert_eq!(program.tickets.len(), 1);
    }

    #[test]
    fn test_end_of_file_terminates() {
        let program = parse_program("2\r\n0 6 * 7\r\n2 9 / 3").unwrap();
        assert_eq!(program.tickets.len(), 2);
        assert_eq!(program.tickets[1].target, WorkerSelector::Specific(1));
    }

    #[test]
    fn test_negative_operands() {
        let program = parse_program("1\n1 -3 * -4\n").unwrap();
        assert_eq!(program.tickets[0], WorkTicket::specific(0, -3, Operator::Mul, -4));
    }

    #[test]
    fn test_empty_config() {
        assert!(matches!(parse_program(""), Err(SimError::EmptyConfig)));
        assert!(matches!(parse_program("\n1 3 + 4\n"), Err(SimError::EmptyConfig)));
    }

    #[test]
    fn test_invalid_worker_count() {
        assert!(matches!(
            parse_program("0\n"),
            Err(SimError::InvalidWorkerCount { value: 0 })
        ));
        assert!(matches!(
            parse_program("-2\n"),
            Err(SimError::InvalidWorkerCount { value: -2 })
        ));
        assert!(matches!(parse_program("abc\n"), Err(SimError::Parse { line: 1, .. })));
        assert!(matches!(
            parse_program("100000\n"),
            Err(SimError::TooManyWorkers { requested: 100000, .. })
        ));
    }

    #[test]
    fn test_bad_ticket_lines() {
        // Unknown operator
        assert!(matches!(parse_program("1\n1 3 % 4\n"), Err(SimError::Parse { line: 2, .. })));
        // Missing field
        assert!(matches!(parse_program("1\n1 3 +\n"), Err(SimError::Parse { line: 2, .. })));
        // Worker id out of range
        assert!(matches!(
            parse_program("2\n1 1 + 1\n3 1 + 1\n"),
            Err(SimError::Parse { line: 3, .. })
        ));
        // Termination marker is not a valid operator
        assert!(matches!(parse_program("1\n1 3 K 4\n"), Err(SimError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_program(Path::new("/nonexistent/parcalc/file.txt")).unwrap_err();
        assert!(matches!(err, SimError::ConfigRead { .. }));
        assert!(err.is_setup());
    }
}
