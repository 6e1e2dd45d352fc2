/// Order Workload - Synthetic Order Stream Generator
///
/// Generates line-oriented workload files for driving an order matching engine:
/// buy, sell and cancel events spread across a fixed set of actors, over a
/// random universe of symbols with per-symbol price bands. Features include:
/// - Seedable, reproducible generation
/// - Cancels that always reference a live order of the same actor
/// - Workload decoding and replay validation
/// - Order id gap detection
/// - Generation statistics

pub mod protocol;
pub mod config;
pub mod universe;
pub mod generator;
pub mod writer;
pub mod decoder;
pub mod book_builder;
pub mod gap_detector;
pub mod validate;
pub mod stats;

pub use protocol::{Event, EventKind, NewOrder, CancelOrder, Side, Symbol};
pub use config::{GeneratorConfig, ConfigError};
pub use universe::{SymbolUniverse, Listing, PriceBand};
pub use generator::{OrderGenerator, OutstandingOrder};
pub use writer::{WorkloadWriter, GenerateError, generate_into, generate_to_path, write_workload};
pub use decoder::{Decoder, DecodeError, Workload};
pub use book_builder::{OrderBook, RestingOrder, ReplayError, BookDepth};
pub use gap_detector::GapDetector;
pub use validate::{validate_workload, Expectations, ValidateError, ValidationReport, WorkloadValidator};
pub use stats::GenerationStats;
