/// Order event generator
///
/// Owns the symbol universe, the order-id counter and the index of outstanding
/// (not yet cancelled) orders. Each step picks buy, sell or cancel with equal
/// weight; a cancel with nothing outstanding is a no-op and the caller retries.

use rand::Rng;
use tracing::debug;

use crate::config::{ConfigError, GeneratorConfig};
use crate::protocol::{CancelOrder, Event, NewOrder, Side};
use crate::stats::GenerationStats;
use crate::universe::SymbolUniverse;

const PROGRESS_INTERVAL: usize = 10_000;

/// An order that may still be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutstandingOrder {
    pub actor: u32,
    pub order_id: u64,
}

pub struct OrderGenerator<R> {
    rng: R,
    universe: SymbolUniverse,
    outstanding: Vec<OutstandingOrder>,
    next_order_id: u64,
    n_threads: u32,
    n_lines: usize,
    min_count: u32,
    max_count: u32,
}

impl<R: Rng> OrderGenerator<R> {
    /// Validate the config and build a fresh universe from `rng`
    pub fn new(config: &GeneratorConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let universe = SymbolUniverse::build(config, &mut rng);
        Self::with_universe(config, universe, rng)
    }

    /// Use a prebuilt universe; symbol and band settings of `config` are ignored
    pub fn with_universe(
        config: &GeneratorConfig,
        universe: SymbolUniverse,
        rng: R,
    ) -> Result<Self, ConfigError> {
        if universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        config.validate_orders()?;

        Ok(OrderGenerator {
            rng,
            universe,
            outstanding: Vec::new(),
            next_order_id: config.first_order_id,
            n_threads: config.n_threads,
            n_lines: config.n_lines,
            min_count: config.min_count,
            max_count: config.max_count,
        })
    }

    /// None only once the order id space is used up, which the validated
    /// quota never reaches
    pub fn generate_buy(&mut self) -> Option<Event> {
        self.generate_order(Side::Buy).map(Event::Order)
    }

    pub fn generate_sell(&mut self) -> Option<Event> {
        self.generate_order(Side::Sell).map(Event::Order)
    }

    fn generate_order(&mut self, side: Side) -> Option<NewOrder> {
        let order_id = self.next_order_id;
        self.next_order_id = order_id.checked_add(1)?;

        // non-empty, checked at construction
        let idx = self.rng.gen_range(0..self.universe.len());
        let listing = self.universe.listings()[idx];
        let price = listing.band.sample(&mut self.rng);
        let quantity = self.rng.gen_range(self.min_count..=self.max_count);
        let actor = self.rng.gen_range(0..self.n_threads);

        self.outstanding.push(OutstandingOrder { actor, order_id });

        Some(NewOrder {
            actor,
            side,
            order_id,
            symbol: listing.symbol,
            price,
            quantity,
        })
    }

    /// Cancel a uniformly chosen outstanding order, None if there is none.
    /// The order leaves the index here, so it can never be cancelled twice.
    pub fn generate_cancel(&mut self) -> Option<Event> {
        if self.outstanding.is_empty() {
            return None;
        }
        let idx = self.rng.gen_range(0..self.outstanding.len());
        let victim = self.outstanding.swap_remove(idx);
        Some(Event::Cancel(CancelOrder {
            actor: victim.actor,
            order_id: victim.order_id,
        }))
    }

    /// One selection among sell, buy and cancel, 1/3 each
    pub fn step(&mut self) -> Option<Event> {
        match self.rng.gen_range(0..3u8) {
            0 => self.generate_sell(),
            1 => self.generate_buy(),
            _ => self.generate_cancel(),
        }
    }

    /// Step until the configured `n_lines` events were handed to `sink`.
    /// Stops at the first sink error.
    pub fn run<F, E>(&mut self, stats: &mut GenerationStats, mut sink: F) -> Result<(), E>
    where
        F: FnMut(&Event) -> Result<(), E>,
    {
        let mut emitted = 0;
        while emitted < self.n_lines {
            match self.step() {
                Some(event) => {
                    sink(&event)?;
                    stats.record_event(&event);
                    emitted += 1;

                    if emitted % PROGRESS_INTERVAL == 0 {
                        debug!(emitted, outstanding = self.outstanding.len(), "generated events");
                    }
                }
                None => stats.record_empty_cancel(),
            }
        }
        stats.finish();
        Ok(())
    }

    pub fn n_threads(&self) -> u32 {
        self.n_threads
    }

    pub fn universe(&self) -> &SymbolUniverse {
        &self.universe
    }

    pub fn outstanding(&self) -> &[OutstandingOrder] {
        &self.outstanding
    }

    /// Id the next buy or sell will receive
    pub fn next_order_id(&self) -> u64 {
        self.next_order_id
    }
}
