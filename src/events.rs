//! Structured events emitted outward to an injected sink.
//!
//! The engine never decides how events are stored — analytics persistence
//! is an external collaborator (see spec §1). `EventSink` is the seam, kept
//! as small as the teacher's adapter traits (`ServiceAdapter` and friends):
//! one method, swappable at construction time.

use crate::core_types::{OrderId, PlayerId, Price, Side, Suit};
use crate::settlement::Settlement;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    RoundStarted {
        players: Vec<PlayerId>,
        initial_balances: HashMap<PlayerId, Price>,
        deal_fingerprint: u64,
    },
    OrderRested {
        order_id: OrderId,
        owner: PlayerId,
        side: Side,
        suit: Suit,
        price: Price,
    },
    Cancel {
        side: Side,
        suit: Suit,
        old_owner: PlayerId,
        old_price: Price,
        new_owner: Option<PlayerId>,
        new_price: Option<Price>,
    },
    Transaction {
        buyer: PlayerId,
        seller: PlayerId,
        suit: Suit,
        price: Price,
    },
    RoundCompleted {
        results: Settlement,
    },
    /// A debug-assertion caught an invariant violation. The round is dead;
    /// this is the only record of what went wrong.
    Fatal {
        message: String,
    },
}

/// Receives every state-visible engine event. Delivery is at-least-once;
/// the sink is not required to be idempotent (spec §6.3).
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Discards everything. Used in unit tests that don't care about the event
/// stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}

/// Forwards every event to `tracing`, structured as a debug field so log
/// aggregation can filter on `event.type`. This is the default sink `main`
/// wires up; a real analytics sink would replace it without the engine
/// noticing, same as swapping the teacher's `TradingAdapter` backends.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSink;

impl EventSink for LoggingSink {
    fn emit(&self, event: Event) {
        match &event {
            Event::Fatal { message } => {
                tracing::error!(event = ?event, "fatal invariant violation: {message}")
            }
            _ => tracing::info!(event = ?event, "engine event"),
        }
    }
}

/// Buffers events in memory, for tests that want to assert on what was
/// emitted.
#[derive(Default)]
pub struct RecordingSink {
    pub events: std::sync::Mutex<Vec<Event>>,
}

impl EventSink for RecordingSink {
    fn emit(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}
