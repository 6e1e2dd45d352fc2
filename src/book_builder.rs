/// Replay order book
///
/// Rebuilds resting interest from a workload: buys and sells rest on their
/// side of the symbol's book, cancels remove them. There is no matching.
/// Price levels use BTreeMap so best bid/ask are the map ends.

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::protocol::{CancelOrder, Event, NewOrder, Side, Symbol};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("duplicate order id {0}")]
    DuplicateOrder(u64),

    #[error("actor {actor} cancelled unknown order {order_id}")]
    UnknownOrder { actor: u32, order_id: u64 },

    #[error("actor {actor} cancelled order {order_id} owned by actor {owner}")]
    ActorMismatch { order_id: u64, owner: u32, actor: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestingOrder {
    pub order_id: u64,
    pub actor: u32,
    pub symbol: Symbol,
    pub side: Side,
    pub price: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default)]
struct SymbolBook {
    // price -> total resting quantity at that price
    bids: BTreeMap<u32, u64>,
    asks: BTreeMap<u32, u64>,
}

impl SymbolBook {
    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<u32, u64> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    books: HashMap<Symbol, SymbolBook>,
    orders: HashMap<u64, RestingOrder>,
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook::default()
    }

    /// Apply one workload event
    pub fn apply_event(&mut self, event: &Event) -> Result<(), ReplayError> {
        match event {
            Event::Order(order) => self.insert(order),
            Event::Cancel(cancel) => self.cancel(cancel).map(|_| ()),
        }
    }

    fn insert(&mut self, order: &NewOrder) -> Result<(), ReplayError> {
        if self.orders.contains_key(&order.order_id) {
            return Err(ReplayError::DuplicateOrder(order.order_id));
        }

        let book = self.books.entry(order.symbol).or_default();
        *book.side_mut(order.side).entry(order.price).or_insert(0) += u64::from(order.quantity);

        self.orders.insert(
            order.order_id,
            RestingOrder {
                order_id: order.order_id,
                actor: order.actor,
                symbol: order.symbol,
                side: order.side,
                price: order.price,
                quantity: order.quantity,
            },
        );
        Ok(())
    }

    /// Remove a resting order; the cancelling actor must own it
    pub fn cancel(&mut self, cancel: &CancelOrder) -> Result<RestingOrder, ReplayError> {
        let owner = match self.orders.get(&cancel.order_id) {
            Some(order) => order.actor,
            None => {
                return Err(ReplayError::UnknownOrder {
                    actor: cancel.actor,
                    order_id: cancel.order_id,
                })
            }
        };
        if owner != cancel.actor {
            return Err(ReplayError::ActorMismatch {
                order_id: cancel.order_id,
                owner,
                actor: cancel.actor,
            });
        }

        let order = self
            .orders
            .remove(&cancel.order_id)
            .ok_or(ReplayError::UnknownOrder {
                actor: cancel.actor,
                order_id: cancel.order_id,
            })?;
        self.remove_from_level(&order);
        Ok(order)
    }

    fn remove_from_level(&mut self, order: &RestingOrder) {
        let Some(book) = self.books.get_mut(&order.symbol) else {
            return;
        };
        let levels = book.side_mut(order.side);
        if let Some(qty) = levels.get_mut(&order.price) {
            *qty = qty.saturating_sub(u64::from(order.quantity));
            if *qty == 0 {
                levels.remove(&order.price);
            }
        }
        if book.is_empty() {
            self.books.remove(&order.symbol);
        }
    }

    /// Highest bid price and its total quantity
    pub fn best_bid(&self, symbol: &Symbol) -> Option<(u32, u64)> {
        self.books
            .get(symbol)?
            .bids
            .iter()
            .next_back()
            .map(|(&price, &qty)| (price, qty))
    }

    /// Lowest ask price and its total quantity
    pub fn best_ask(&self, symbol: &Symbol) -> Option<(u32, u64)> {
        self.books
            .get(symbol)?
            .asks
            .iter()
            .next()
            .map(|(&price, &qty)| (price, qty))
    }

    /// best ask - best bid; None when either side is empty or the book is crossed
    pub fn spread(&self, symbol: &Symbol) -> Option<u32> {
        match (self.best_bid(symbol), self.best_ask(symbol)) {
            (Some((bid, _)), Some((ask, _))) if bid < ask => Some(ask - bid),
            _ => None,
        }
    }

    /// Top `n` levels on each side of a symbol's book
    pub fn depth(&self, symbol: &Symbol, n: usize) -> BookDepth {
        let Some(book) = self.books.get(symbol) else {
            return BookDepth::default();
        };

        BookDepth {
            bids: book.bids.iter().rev().take(n).map(|(&p, &q)| (p, q)).collect(),
            asks: book.asks.iter().take(n).map(|(&p, &q)| (p, q)).collect(),
        }
    }

    pub fn get(&self, order_id: u64) -> Option<&RestingOrder> {
        self.orders.get(&order_id)
    }

    /// Number of resting orders
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Symbols with at least one resting order
    pub fn symbol_count(&self) -> usize {
        self.books.len()
    }

    pub fn bid_levels(&self, symbol: &Symbol) -> usize {
        self.books.get(symbol).map_or(0, |b| b.bids.len())
    }

    pub fn ask_levels(&self, symbol: &Symbol) -> usize {
        self.books.get(symbol).map_or(0, |b| b.asks.len())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDepth {
    pub bids: Vec<(u32, u64)>,
    pub asks: Vec<(u32, u64)>,
}
