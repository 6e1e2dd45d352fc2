/// Workload trace validation
///
/// Decodes a workload and replays it through the order book and id gap
/// detector. A generated file must replay cleanly: every cancel hits a resting
/// order owned by the same actor, and order ids only move forward.

use thiserror::Error;

use crate::book_builder::{OrderBook, ReplayError};
use crate::config::GeneratorConfig;
use crate::decoder::{DecodeError, Decoder};
use crate::gap_detector::GapDetector;
use crate::protocol::{Event, EventKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("header declares {found} actors, expected {expected}")]
    ThreadCountMismatch { expected: u32, found: u32 },

    #[error("event {index}: actor {actor} outside [0, {n_threads})")]
    ActorOutOfRange { index: usize, actor: u32, n_threads: u32 },

    #[error("event {index}: order id {found} does not follow {expected_at_least}")]
    IdRegression {
        index: usize,
        expected_at_least: u64,
        found: u64,
    },

    #[error("event {index}: {source}")]
    Replay {
        index: usize,
        #[source]
        source: ReplayError,
    },

    #[error("found {found} events, expected {expected}")]
    EventCountMismatch { expected: usize, found: usize },
}

/// Optional properties the workload is checked against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expectations {
    pub n_threads: Option<u32>,
    pub n_lines: Option<usize>,
    pub first_order_id: Option<u64>,
}

impl Expectations {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Expectations {
            n_threads: Some(config.n_threads),
            n_lines: Some(config.n_lines),
            first_order_id: Some(config.first_order_id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub n_threads: u32,
    pub buys: usize,
    pub sells: usize,
    pub cancels: usize,
    /// Orders still resting after replay
    pub outstanding: usize,
    /// Missing order id ranges, inclusive
    pub id_gaps: Vec<(u64, u64)>,
}

impl ValidationReport {
    pub fn total_events(&self) -> usize {
        self.buys + self.sells + self.cancels
    }
}

/// Incremental replay of one workload
#[derive(Debug, Clone)]
pub struct WorkloadValidator {
    n_threads: u32,
    book: OrderBook,
    ids: GapDetector,
    report: ValidationReport,
}

impl WorkloadValidator {
    pub fn new(n_threads: u32, first_order_id: Option<u64>) -> Self {
        WorkloadValidator {
            n_threads,
            book: OrderBook::new(),
            ids: first_order_id.map_or_else(GapDetector::new, GapDetector::starting_at),
            report: ValidationReport {
                n_threads,
                ..Default::default()
            },
        }
    }

    /// Check and apply the next event
    pub fn apply(&mut self, event: &Event) -> Result<(), ValidateError> {
        let index = self.report.total_events();

        if event.actor() >= self.n_threads {
            return Err(ValidateError::ActorOutOfRange {
                index,
                actor: event.actor(),
                n_threads: self.n_threads,
            });
        }

        if let Event::Order(order) = event {
            if !self.ids.process(order.order_id) {
                let expected_at_least = self
                    .ids
                    .regressions()
                    .last()
                    .map_or(order.order_id, |&(expected, _)| expected);
                return Err(ValidateError::IdRegression {
                    index,
                    expected_at_least,
                    found: order.order_id,
                });
            }
        }

        self.book
            .apply_event(event)
            .map_err(|source| ValidateError::Replay { index, source })?;

        match event.kind() {
            EventKind::Buy => self.report.buys += 1,
            EventKind::Sell => self.report.sells += 1,
            EventKind::Cancel => self.report.cancels += 1,
        }
        Ok(())
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn finish(self) -> ValidationReport {
        ValidationReport {
            outstanding: self.book.order_count(),
            id_gaps: self.ids.gaps().to_vec(),
            ..self.report
        }
    }
}

/// Decode `text` and replay it, stopping at the first violation
pub fn validate_workload(
    text: &str,
    expected: &Expectations,
) -> Result<ValidationReport, ValidateError> {
    let workload = Decoder::decode_workload(text)?;

    if let Some(n_threads) = expected.n_threads {
        if workload.n_threads != n_threads {
            return Err(ValidateError::ThreadCountMismatch {
                expected: n_threads,
                found: workload.n_threads,
            });
        }
    }
    if let Some(n_lines) = expected.n_lines {
        if workload.events.len() != n_lines {
            return Err(ValidateError::EventCountMismatch {
                expected: n_lines,
                found: workload.events.len(),
            });
        }
    }

    let mut validator = WorkloadValidator::new(workload.n_threads, expected.first_order_id);
    for event in &workload.events {
        validator.apply(event)?;
    }
    Ok(validator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_trace() {
        let text = "2\no\n0 B 100 ABCD 10 1\n1 S 101 ABCD 12 3\n0 C 100\nx";
        let report = validate_workload(text, &Expectations::default()).unwrap();
        assert_eq!(report.buys, 1);
        assert_eq!(report.sells, 1);
        assert_eq!(report.cancels, 1);
        assert_eq!(report.outstanding, 1);
        assert!(report.id_gaps.is_empty());
    }

    #[test]
    fn test_actor_out_of_range() {
        let text = "1\no\n1 B 100 ABCD 10 1\nx";
        let result = validate_workload(text, &Expectations::default());
        assert!(matches!(
            result,
            Err(ValidateError::ActorOutOfRange { index: 0, actor: 1, n_threads: 1 })
        ));
    }

    #[test]
    fn test_double_cancel() {
        let text = "1\no\n0 B 100 ABCD 10 1\n0 C 100\n0 C 100\nx";
        let result = validate_workload(text, &Expectations::default());
        assert!(matches!(
            result,
            Err(ValidateError::Replay {
                index: 2,
                source: ReplayError::UnknownOrder { .. }
            })
        ));
    }

    #[test]
    fn test_thread_count_mismatch() {
        let expected = Expectations {
            n_threads: Some(4),
            ..Default::default()
        };
        let result = validate_workload("3\no\nx", &expected);
        assert_eq!(
            result,
            Err(ValidateError::ThreadCountMismatch { expected: 4, found: 3 })
        );
    }

    #[test]
    fn test_id_regression() {
        let text = "1\no\n0 B 101 ABCD 10 1\n0 S 100 ABCD 10 1\nx";
        let result = validate_workload(text, &Expectations::default());
        assert_eq!(
            result,
            Err(ValidateError::IdRegression {
                index: 1,
                expected_at_least: 102,
                found: 100
            })
        );
    }
}
