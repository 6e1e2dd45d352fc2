/// Line-oriented workload format
///
/// A workload file is framed as:
///   - header: actor count, decimal (1 line)
///   - open marker: `o` (1 line)
///   - events, one per line:
///       `<actor> B <id> <symbol> <price> <qty>`
///       `<actor> S <id> <symbol> <price> <qty>`
///       `<actor> C <id>`
///   - close marker: `x`, no trailing newline

use std::fmt::{self, Write as _};
use rand::Rng;

pub const OPEN_MARKER: &str = "o";
pub const CLOSE_MARKER: &str = "x";

/// Number of characters in a ticker symbol
pub const SYMBOL_LEN: usize = 4;

/// Field counts per event line, including actor and kind
pub const ORDER_FIELDS: usize = 6;
pub const CANCEL_FIELDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Buy,
    Sell,
    Cancel,
}

impl EventKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'B' => Some(EventKind::Buy),
            'S' => Some(EventKind::Sell),
            'C' => Some(EventKind::Cancel),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            EventKind::Buy => 'B',
            EventKind::Sell => 'S',
            EventKind::Cancel => 'C',
        }
    }

    /// Number of whitespace-separated fields a line of this kind carries
    pub fn field_count(self) -> usize {
        match self {
            EventKind::Buy | EventKind::Sell => ORDER_FIELDS,
            EventKind::Cancel => CANCEL_FIELDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn kind(self) -> EventKind {
        match self {
            Side::Buy => EventKind::Buy,
            Side::Sell => EventKind::Sell,
        }
    }
}

/// Four uppercase ASCII letters, stored inline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol([u8; SYMBOL_LEN]);

impl Symbol {
    /// Parse a symbol; None unless exactly four `A..=Z` characters
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != SYMBOL_LEN || !bytes.iter().all(|b| b.is_ascii_uppercase()) {
            return None;
        }
        let mut raw = [0u8; SYMBOL_LEN];
        raw.copy_from_slice(bytes);
        Some(Symbol(raw))
    }

    /// Four independent uniform draws from the uppercase alphabet
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut raw = [0u8; SYMBOL_LEN];
        for b in raw.iter_mut() {
            *b = b'A' + rng.gen_range(0..26u8);
        }
        Symbol(raw)
    }

    pub fn as_bytes(&self) -> &[u8; SYMBOL_LEN] {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            f.write_char(b as char)?;
        }
        Ok(())
    }
}

/// New buy or sell order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub actor: u32,
    pub side: Side,
    pub order_id: u64,
    pub symbol: Symbol,
    pub price: u32,
    pub quantity: u32,
}

/// Cancel of a previously submitted order, scoped to its actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelOrder {
    pub actor: u32,
    pub order_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Order(NewOrder),
    Cancel(CancelOrder),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Order(o) => o.side.kind(),
            Event::Cancel(_) => EventKind::Cancel,
        }
    }

    pub fn actor(&self) -> u32 {
        match self {
            Event::Order(o) => o.actor,
            Event::Cancel(c) => c.actor,
        }
    }

    pub fn order_id(&self) -> u64 {
        match self {
            Event::Order(o) => o.order_id,
            Event::Cancel(c) => c.order_id,
        }
    }
}

/// Renders the event line without its terminating newline
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Order(o) => write!(
                f,
                "{} {} {} {} {} {}",
                o.actor,
                o.side.kind().as_char(),
                o.order_id,
                o.symbol,
                o.price,
                o.quantity
            ),
            Event::Cancel(c) => write!(f, "{} {} {}", c.actor, EventKind::Cancel.as_char(), c.order_id),
        }
    }
}
