/// Symbol universe: synthetic tickers, each with an inclusive price band

use rand::Rng;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::protocol::Symbol;

/// Inclusive `[low, high]` price range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    pub low: u32,
    pub high: u32,
}

impl PriceBand {
    pub fn around(median: u32, spread: u32) -> Self {
        PriceBand {
            low: median.saturating_sub(spread),
            high: median.saturating_add(spread),
        }
    }

    pub fn contains(&self, price: u32) -> bool {
        price >= self.low && price <= self.high
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.low..=self.high)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub symbol: Symbol,
    pub band: PriceBand,
}

/// Ordered listings, addressed by index. Symbols may repeat.
#[derive(Debug, Clone, Default)]
pub struct SymbolUniverse {
    listings: Vec<Listing>,
}

impl SymbolUniverse {
    /// Draw `n_symbols` listings; each median is uniform in `[min_price, max_price]`
    pub fn build<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Self {
        let listings: Vec<Listing> = (0..config.n_symbols)
            .map(|_| {
                let symbol = Symbol::random(rng);
                let median = rng.gen_range(config.min_price..=config.max_price);
                Listing {
                    symbol,
                    band: PriceBand::around(median, config.std_dev),
                }
            })
            .collect();

        debug!(symbols = listings.len(), "built symbol universe");
        SymbolUniverse { listings }
    }

    pub fn from_listings(listings: Vec<Listing>) -> Self {
        SymbolUniverse { listings }
    }

    /// Uniformly chosen listing, None when empty
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Listing> {
        if self.listings.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.listings.len());
        self.listings.get(idx)
    }

    pub fn get(&self, idx: usize) -> Option<&Listing> {
        self.listings.get(idx)
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// True if some listing of `symbol` has a band containing `price`.
    /// Duplicate symbols each keep their own band.
    pub fn admits(&self, symbol: &Symbol, price: u32) -> bool {
        self.listings
            .iter()
            .any(|l| l.symbol == *symbol && l.band.contains(price))
    }
}
