/// Workload decoder
///
/// Parses workload text back into typed events. Line numbers in errors are
/// 1-based and count the header and open marker.

use crate::protocol::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,

    #[error("line {line}: invalid actor count header {found:?}")]
    InvalidHeader { line: usize, found: String },

    #[error("line {line}: expected open marker, found {found:?}")]
    MissingOpenMarker { line: usize, found: String },

    #[error("missing close marker")]
    MissingCloseMarker,

    #[error("line {line}: data after close marker")]
    TrailingData { line: usize },

    #[error("line {line}: invalid event kind {found:?}")]
    InvalidEventKind { line: usize, found: String },

    #[error("line {line}: {kind:?} expects {expected} fields, found {found}")]
    WrongFieldCount {
        line: usize,
        kind: EventKind,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid {field} {value:?}")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Decoded workload file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub n_threads: u32,
    pub events: Vec<Event>,
}

fn parse_field<T: std::str::FromStr>(line: usize, field: &'static str, value: &str) -> DecodeResult<T> {
    value.parse().map_err(|_| DecodeError::InvalidField {
        line,
        field,
        value: value.to_string(),
    })
}

pub struct Decoder;

impl Decoder {
    /// Parse a single event line (no trailing newline)
    pub fn decode_line(text: &str, line: usize) -> DecodeResult<Event> {
        let fields: Vec<&str> = text.split_whitespace().collect();

        let kind = match fields.get(1) {
            Some(tag) => {
                let mut chars = tag.chars();
                let kind = match (chars.next(), chars.next()) {
                    (Some(c), None) => EventKind::from_char(c),
                    _ => None,
                };
                kind.ok_or_else(|| DecodeError::InvalidEventKind {
                    line,
                    found: tag.to_string(),
                })?
            }
            None => {
                return Err(DecodeError::InvalidEventKind {
                    line,
                    found: text.to_string(),
                })
            }
        };

        if fields.len() != kind.field_count() {
            return Err(DecodeError::WrongFieldCount {
                line,
                kind,
                expected: kind.field_count(),
                found: fields.len(),
            });
        }

        let actor: u32 = parse_field(line, "actor", fields[0])?;
        let order_id: u64 = parse_field(line, "order id", fields[2])?;

        let side = match kind {
            EventKind::Cancel => return Ok(Event::Cancel(CancelOrder { actor, order_id })),
            EventKind::Buy => Side::Buy,
            EventKind::Sell => Side::Sell,
        };

        let symbol = Symbol::parse(fields[3]).ok_or_else(|| DecodeError::InvalidField {
            line,
            field: "symbol",
            value: fields[3].to_string(),
        })?;
        let price: u32 = parse_field(line, "price", fields[4])?;
        let quantity: u32 = parse_field(line, "quantity", fields[5])?;

        Ok(Event::Order(NewOrder {
            actor,
            side,
            order_id,
            symbol,
            price,
            quantity,
        }))
    }

    /// Decode a framed workload, calling `callback` for each event.
    /// Stops early if the callback returns false; the close marker is only
    /// checked when every event was visited.
    /// Returns the header actor count and the number of events visited.
    pub fn decode_stream<F>(text: &str, mut callback: F) -> DecodeResult<(u32, usize)>
    where
        F: FnMut(&Event) -> bool,
    {
        if text.is_empty() {
            return Err(DecodeError::Empty);
        }

        let mut lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .peekable();

        let header = lines.next().unwrap_or_default();
        let n_threads: u32 = header.trim().parse().map_err(|_| DecodeError::InvalidHeader {
            line: 1,
            found: header.to_string(),
        })?;

        match lines.next() {
            Some(OPEN_MARKER) => {}
            other => {
                return Err(DecodeError::MissingOpenMarker {
                    line: 2,
                    found: other.unwrap_or_default().to_string(),
                })
            }
        }

        let mut count = 0;
        let mut line_no = 2;
        loop {
            line_no += 1;
            let line = lines.next().ok_or(DecodeError::MissingCloseMarker)?;
            if line == CLOSE_MARKER {
                break;
            }
            // text ended with a newline instead of the close marker
            if line.is_empty() && lines.peek().is_none() {
                return Err(DecodeError::MissingCloseMarker);
            }

            let event = Self::decode_line(line, line_no)?;
            count += 1;
            if !callback(&event) {
                return Ok((n_threads, count));
            }
        }

        if lines.next().is_some() {
            return Err(DecodeError::TrailingData { line: line_no + 1 });
        }

        Ok((n_threads, count))
    }

    /// Decode a whole workload into memory
    pub fn decode_workload(text: &str) -> DecodeResult<Workload> {
        let mut events = Vec::new();
        let (n_threads, _) = Self::decode_stream(text, |event| {
            events.push(*event);
            true
        })?;
        Ok(Workload { n_threads, events })
    }
}
