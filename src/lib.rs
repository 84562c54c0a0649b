//! Figgie — a networked engine for rounds of the card game Figgie.
//!
//! # Modules
//!
//! - [`core_types`] — Suit, Side, PlayerId and the other shared identifiers.
//! - [`clock`] — abstracted time source, so tests can drive the round timer.
//! - [`deal`] — deck composition and dealing.
//! - [`orderbook`] — per-suit book holding the single resting bid/ask.
//! - [`ledger`] — player balances, hands, and the pot.
//! - [`settlement`] — pure end-of-round payout calculation.
//! - [`events`] — the structured event stream and its sink.
//! - [`round`] — the phase state machine tying the above together.
//! - [`engine`] — the lock-guarded facade the transport calls into.
//! - [`config`] — environment-sourced runtime configuration.
//! - [`logging`] — tracing-subscriber setup.
//! - [`error`] — client-facing error types.
//! - [`gateway`] — the HTTP transport.

pub mod clock;
pub mod config;
pub mod core_types;
pub mod deal;
pub mod engine;
pub mod error;
pub mod events;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod orderbook;
pub mod round;
pub mod settlement;

pub use core_types::{OrderId, PlayerId, Price, Side, Suit};
pub use engine::Engine;
pub use error::EngineError;
