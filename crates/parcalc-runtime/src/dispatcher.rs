//! The dispatcher
//!
//! Runs on the controlling thread and drives every ticket to a worker:
//!
//! ```text
//! for ticket in tickets {
//!     1. Specific(i) -> reserve worker i (blocks while it is busy)
//!        AnyFree     -> reserve the lowest-index free worker (blocks while none is)
//!     2. Harvest the result the worker left from its previous assignment
//!     3. Write the ticket into the worker's slot and wake it
//! }
//! drain: for each worker { reserve, harvest, send termination marker }
//! join all worker threads
//! ```
//!
//! Results are harvested one assignment late: the dispatcher never waits
//! for the computation it just posted, only for the worker to be free the
//! next time it needs that worker (or during the drain).

use std::sync::Arc;
use parcalc_core::error::{SimError, SimResult};
use parcalc_core::record::ResultLog;
use parcalc_core::ticket::{WorkTicket, WorkerSelector};
use crate::config::SimConfig;
use crate::mailbox::{Mailboxes, SlotGrant};
use crate::worker::{WorkerPool, WorkerReport};

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunSummary {
    /// Results in harvest order
    pub log: ResultLog,
    /// One report per worker that exited cleanly
    pub reports: Vec<WorkerReport>,
    /// Non-fatal problems found while tearing down
    pub teardown_errors: Vec<SimError>,
}

/// Assigns tickets to workers and owns the result log
///
/// Dropping a dispatcher without calling [`Dispatcher::finish`] still
/// drains and stops its workers.
pub struct Dispatcher {
    mailboxes: Arc<Mailboxes>,
    pool: Option<WorkerPool>,
    log: ResultLog,
    dispatched: usize,
}

impl Dispatcher {
    /// Take over an already running pool.
    ///
    /// `expected` is the number of tickets that will be dispatched.
    pub fn new(mailboxes: Arc<Mailboxes>, pool: WorkerPool, expected: usize) -> Self {
        Self {
            mailboxes,
            pool: Some(pool),
            log: ResultLog::with_expected(expected),
            dispatched: 0,
        }
    }

    /// Allocate mailboxes, start `num_workers` workers and return a
    /// dispatcher for `expected` tickets.
    pub fn start(num_workers: usize, expected: usize, config: &SimConfig) -> SimResult<Self> {
        config.validate()?;
        config.log_summary();

        let mailboxes = Arc::new(Mailboxes::new(num_workers, config.max_workers)?);
        let pool = WorkerPool::spawn(&mailboxes, config)?;
        Ok(Self::new(mailboxes, pool, expected))
    }

    #[inline]
    pub fn num_workers(&self) -> usize {
        self.mailboxes.num_workers()
    }

    /// Tickets dispatched so far
    #[inline]
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Results harvested so far
    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    /// Free workers right now (snapshot)
    pub fn free_count(&self) -> usize {
        self.mailboxes.free_count()
    }

    /// Assign one ticket and return the index of the worker it went to.
    ///
    /// Blocks while the chosen worker (or, for `AnyFree`, every worker) is
    /// still busy. Never waits for the new computation itself.
    pub fn dispatch(&mut self, ticket: &WorkTicket) -> SimResult<usize> {
        let mailboxes = Arc::clone(&self.mailboxes);

        let mut grant = match ticket.target {
            WorkerSelector::Specific(i) => {
                if i >= mailboxes.num_workers() {
                    return Err(SimError::UnknownWorker {
                        index: i,
                        workers: mailboxes.num_workers(),
                    });
                }
                mailboxes.grant_specific(i)
            }
            WorkerSelector::AnyFree => {
                let grant = mailboxes.grant_any_free();
                log::debug!("looked for a free worker, found {}", grant.index());
                grant
            }
        };

        let index = grant.index();
        self.harvest(&mut grant);

        log::info!("assigning {} to worker {}", ticket, index);
        grant.assign(ticket);
        self.dispatched += 1;
        Ok(index)
    }

    /// Dispatch tickets in order, stopping at the first error
    pub fn dispatch_all<'a, I>(&mut self, tickets: I) -> SimResult<()>
    where
        I: IntoIterator<Item = &'a WorkTicket>,
    {
        for ticket in tickets {
            self.dispatch(ticket)?;
        }
        Ok(())
    }

    /// Drain every worker, stop them and return what the run produced
    pub fn finish(mut self) -> RunSummary {
        let (reports, teardown_errors) = self.shutdown();
        RunSummary {
            log: std::mem::take(&mut self.log),
            reports,
            teardown_errors,
        }
    }

    fn harvest(&mut self, grant: &mut SlotGrant<'_>) {
        if let Some(record) = grant.take_unclaimed() {
            log::debug!("harvested {} from worker {}", record, record.worker);
            self.log.push(record);
        }
    }

    /// Harvest each worker's last result and send it the termination marker
    fn drain_and_terminate(&mut self) {
        let mailboxes = Arc::clone(&self.mailboxes);
        for i in 0..mailboxes.num_workers() {
            let mut grant = mailboxes.grant_specific(i);
            self.harvest(&mut grant);
            log::debug!("sending termination marker to worker {}", i);
            grant.terminate();
        }
    }

    fn shutdown(&mut self) -> (Vec<WorkerReport>, Vec<SimError>) {
        let Some(pool) = self.pool.take() else {
            return (Vec::new(), Vec::new());
        };

        self.drain_and_terminate();
        let (reports, errors) = pool.join();
        for e in &errors {
            log::warn!("teardown: {}", e);
        }

        if !self.log.is_complete() {
            log::warn!(
                "harvested {} results for {} expected tickets",
                self.log.len(),
                self.log.expected()
            );
        }
        log::info!(
            "all workers stopped: {} tickets dispatched, {} results harvested",
            self.dispatched,
            self.log.len()
        );
        (reports, errors)
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if self.pool.is_some() {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcalc_core::op::{ArithmeticError, Operator, Outcome};
    use std::collections::HashMap;
    use std::time::Duration;

    fn start(num_workers: usize, expected: usize) -> Dispatcher {
        Dispatcher::start(num_workers, expected, &SimConfig::new()).unwrap()
    }

    #[test]
    fn test_single_worker_scenario() {
        let tickets = [
            WorkTicket::specific(0, 3, Operator::Add, 4),
            WorkTicket::any_free(10, Operator::Sub, 2),
        ];
        let mut dispatcher = start(1, tickets.len());
        dispatcher.dispatch_all(&tickets).unwrap();
        assert_eq!(dispatcher.dispatched(), 2);

        let summary = dispatcher.finish();
        assert_eq!(summary.log.lines(), vec!["3+4=7", "10-2=8"]);
        assert!(summary.teardown_errors.is_empty());
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].computed, 2);
    }

    #[test]
    fn test_any_free_both_results_present() {
        let tickets = [
            WorkTicket::any_free(6, Operator::Mul, 7),
            WorkTicket::any_free(9, Operator::Div, 3),
        ];
        let config = SimConfig::new().compute_delay(Duration::from_millis(20));
        let mut dispatcher = Dispatcher::start(2, tickets.len(), &config).unwrap();

        // Both workers are free, so both tickets go out before either completes
        assert_eq!(dispatcher.dispatch(&tickets[0]).unwrap(), 0);
        assert_eq!(dispatcher.dispatch(&tickets[1]).unwrap(), 1);
        assert!(dispatcher.log().is_empty());

        let summary = dispatcher.finish();
        let mut values: Vec<i64> = summary.log.iter().filter_map(|r| r.outcome.value()).collect();
        values.sort();
        assert_eq!(values, vec![3, 42]);
        assert!(summary.log.is_complete());
    }

    #[test]
    fn test_division_by_zero_does_not_stop_dispatch() {
        let tickets = [
            WorkTicket::specific(0, 1, Operator::Div, 0),
            WorkTicket::specific(0, 2, Operator::Add, 2),
        ];
        let mut dispatcher = start(1, tickets.len());
        dispatcher.dispatch_all(&tickets).unwrap();

        let summary = dispatcher.finish();
        let records = summary.log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcome, Outcome::Failed(ArithmeticError::DivisionByZero));
        assert_eq!(records[1].outcome, Outcome::Value(4));
        assert_eq!(summary.log.lines(), vec!["1/0=ERR", "2+2=4"]);
    }

    #[test]
    fn test_unknown_worker_rejected() {
        let mut dispatcher = start(2, 1);
        let err = dispatcher
            .dispatch(&WorkTicket::specific(5, 1, Operator::Add, 1))
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownWorker { index: 5, workers: 2 }));
        assert_eq!(dispatcher.dispatched(), 0);
    }

    #[test]
    fn test_specific_tickets_keep_per_worker_order() {
        let num_workers = 3;
        let tickets: Vec<WorkTicket> = (0..60)
            .map(|n| WorkTicket::specific(n % num_workers, n as i64, Operator::Mul, 2))
            .collect();

        let mut dispatcher = start(num_workers, tickets.len());
        dispatcher.dispatch_all(&tickets).unwrap();
        let summary = dispatcher.finish();
        assert!(summary.log.is_complete());

        let mut seen: HashMap<usize, Vec<i64>> = HashMap::new();
        for record in &summary.log {
            assert_eq!(record.outcome.value(), Some(record.operand1 * 2));
            seen.entry(record.worker).or_default().push(record.operand1);
        }
        for worker in 0..num_workers {
            let expected: Vec<i64> = tickets
                .iter()
                .filter(|t| t.target == WorkerSelector::Specific(worker))
                .map(|t| t.operand1)
                .collect();
            assert_eq!(seen[&worker], expected);
        }
    }

    #[test]
    fn test_every_ticket_harvested_exactly_once() {
        let tickets: Vec<WorkTicket> = (0..200)
            .map(|n| {
                if n % 3 == 0 {
                    WorkTicket::specific(n % 4, n as i64, Operator::Add, 1000)
                } else {
                    WorkTicket::any_free(n as i64, Operator::Add, 1000)
                }
            })
            .collect();

        let mut dispatcher = start(4, tickets.len());
        dispatcher.dispatch_all(&tickets).unwrap();
        let summary = dispatcher.finish();

        let mut operands: Vec<i64> = summary.log.iter().map(|r| r.operand1).collect();
        operands.sort();
        assert_eq!(operands, (0..200).collect::<Vec<i64>>());
        assert!(summary.log.iter().all(|r| r.outcome.value() == Some(r.operand1 + 1000)));

        let computed: u64 = summary.reports.iter().map(|r| r.computed).sum();
        assert_eq!(computed, 200);
    }

    #[test]
    fn test_drop_without_finish_stops_workers() {
        let mut dispatcher = start(2, 1);
        dispatcher.dispatch(&WorkTicket::any_free(1, Operator::Add, 1)).unwrap();
        drop(dispatcher);
    }
}
