/// Generation statistics
///
/// Tracks emitted events by kind, cancel attempts that found nothing to cancel,
/// and throughput.

use std::time::{Duration, Instant};
use tracing::info;

use crate::protocol::{Event, EventKind};

#[derive(Debug, Clone)]
pub struct GenerationStats {
    start_time: Option<Instant>,
    finish_time: Option<Instant>,
    buys: u64,
    sells: u64,
    cancels: u64,
    empty_cancels: u64,
}

impl GenerationStats {
    pub fn new() -> Self {
        GenerationStats {
            start_time: None,
            finish_time: None,
            buys: 0,
            sells: 0,
            cancels: 0,
            empty_cancels: 0,
        }
    }

    /// Record an emitted event
    pub fn record_event(&mut self, event: &Event) {
        self.touch();
        match event.kind() {
            EventKind::Buy => self.buys += 1,
            EventKind::Sell => self.sells += 1,
            EventKind::Cancel => self.cancels += 1,
        }
    }

    /// Record a cancel attempt against an empty outstanding set
    pub fn record_empty_cancel(&mut self) {
        self.touch();
        self.empty_cancels += 1;
    }

    /// Freeze the elapsed clock
    pub fn finish(&mut self) {
        if self.start_time.is_some() && self.finish_time.is_none() {
            self.finish_time = Some(Instant::now());
        }
    }

    fn touch(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        let start = self.start_time?;
        Some(match self.finish_time {
            Some(end) => end.duration_since(start),
            None => start.elapsed(),
        })
    }

    pub fn events_per_sec(&self) -> f64 {
        match self.elapsed() {
            Some(elapsed) if elapsed.as_secs_f64() > 0.0 => {
                self.total_events() as f64 / elapsed.as_secs_f64()
            }
            _ => 0.0,
        }
    }

    pub fn buys(&self) -> u64 {
        self.buys
    }

    pub fn sells(&self) -> u64 {
        self.sells
    }

    pub fn cancels(&self) -> u64 {
        self.cancels
    }

    pub fn empty_cancels(&self) -> u64 {
        self.empty_cancels
    }

    /// Events that reached the output
    pub fn total_events(&self) -> u64 {
        self.buys + self.sells + self.cancels
    }

    /// Every selection made, including no-op cancels
    pub fn attempts(&self) -> u64 {
        self.total_events() + self.empty_cancels
    }

    pub fn reset(&mut self) {
        *self = GenerationStats::new();
    }

    pub fn log_summary(&self) {
        info!(
            events = self.total_events(),
            buys = self.buys,
            sells = self.sells,
            cancels = self.cancels,
            empty_cancels = self.empty_cancels,
            elapsed = ?self.elapsed(),
            events_per_sec = %format!("{:.2}", self.events_per_sec()),
            "generation complete"
        );
    }
}

impl Default for GenerationStats {
    fn default() -> Self {
        Self::new()
    }
}
