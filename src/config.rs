/// Generator configuration
///
/// Every option has a default, so a partial JSON file or a bare `Default`
/// yields a usable config. `validate` must pass before generation starts.

use std::fs;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_FILENAME: &str = "large.in";
pub const DEFAULT_FIRST_ORDER_ID: u64 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("symbol universe is empty: n_symbols must be at least 1")]
    EmptyUniverse,

    #[error("n_threads must be at least 1")]
    NoActors,

    #[error("invalid price range: min_price {min} > max_price {max}")]
    InvalidPriceRange { min: u32, max: u32 },

    #[error("invalid quantity range: min_count {min} > max_count {max}")]
    InvalidCountRange { min: u32, max: u32 },

    #[error("min_count must be positive")]
    ZeroQuantity,

    #[error("std_dev must be positive")]
    ZeroSpread,

    #[error("price band would reach zero: min_price {min_price} <= std_dev {std_dev}")]
    NonPositiveBand { min_price: u32, std_dev: u32 },

    #[error("price band would exceed u32: max_price {max_price} + std_dev {std_dev}")]
    PriceOverflow { max_price: u32, std_dev: u32 },

    #[error("order id space exhausted: first_order_id {first_order_id} + n_lines {n_lines} overflows u64")]
    IdSpaceExhausted { first_order_id: u64, n_lines: usize },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Output path
    pub filename: PathBuf,
    /// Size of the symbol universe
    pub n_symbols: usize,
    /// Actor count, written as the file header
    pub n_threads: u32,
    /// Successful events to emit
    pub n_lines: usize,
    /// Half-width of each symbol's price band
    pub std_dev: u32,
    /// Range for each symbol's median price
    pub min_price: u32,
    pub max_price: u32,
    /// Quantity range, inclusive
    pub min_count: u32,
    pub max_count: u32,
    /// Id given to the first order
    pub first_order_id: u64,
    /// Fixed RNG seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            filename: PathBuf::from(DEFAULT_FILENAME),
            n_symbols: 500,
            n_threads: 40,
            n_lines: 50_000,
            std_dev: 100,
            min_price: 1000,
            max_price: 3000,
            min_count: 10,
            max_count: 30,
            first_order_id: DEFAULT_FIRST_ORDER_ID,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_json::from_str(s)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Reject configurations that would produce an empty universe, an empty
    /// actor range, a price band that is empty, touches zero or overflows,
    /// or more orders than the id space holds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_symbols == 0 {
            return Err(ConfigError::EmptyUniverse);
        }
        if self.min_price > self.max_price {
            return Err(ConfigError::InvalidPriceRange {
                min: self.min_price,
                max: self.max_price,
            });
        }
        if self.std_dev == 0 {
            return Err(ConfigError::ZeroSpread);
        }
        if self.min_price <= self.std_dev {
            return Err(ConfigError::NonPositiveBand {
                min_price: self.min_price,
                std_dev: self.std_dev,
            });
        }
        if self.max_price.checked_add(self.std_dev).is_none() {
            return Err(ConfigError::PriceOverflow {
                max_price: self.max_price,
                std_dev: self.std_dev,
            });
        }
        self.validate_orders()
    }

    /// Checks on actors, quantities and order ids only; the symbol and
    /// price settings are not consulted
    pub fn validate_orders(&self) -> Result<(), ConfigError> {
        if self.n_threads == 0 {
            return Err(ConfigError::NoActors);
        }
        if self.min_count > self.max_count {
            return Err(ConfigError::InvalidCountRange {
                min: self.min_count,
                max: self.max_count,
            });
        }
        if self.min_count == 0 {
            return Err(ConfigError::ZeroQuantity);
        }
        // every event may be an order, and the id after the last one must fit
        let n_lines = u64::try_from(self.n_lines).ok();
        if n_lines.and_then(|n| self.first_order_id.checked_add(n)).is_none() {
            return Err(ConfigError::IdSpaceExhausted {
                first_order_id: self.first_order_id,
                n_lines: self.n_lines,
            });
        }
        Ok(())
    }

    /// Seeded RNG when `seed` is set, otherwise seeded from OS entropy
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}
