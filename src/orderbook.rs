//! OrderBook — one per suit, holding at most one resting order per side.
//!
//! The teacher's `OrderBook` keeps a `BTreeMap` of price levels per side for
//! full price-time priority across arbitrary depth. Figgie's book is
//! shallower by design (spec §4.3): each side ever holds a single best
//! order, so the `BTreeMap` collapses to a plain `Option<RestingOrder>` per
//! side. The matching decision itself (match vs. rest vs. reject) is the
//! caller's — `round.rs` — since it needs the `Ledger` to check funds and
//! holdings; this module only tracks what is currently resting.

use crate::core_types::{OrderId, PlayerId, Price, Side};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RestingOrder {
    pub order_id: OrderId,
    pub owner: PlayerId,
    pub price: Price,
}

#[derive(Debug, Default)]
pub struct OrderBook {
    bid: Option<RestingOrder>,
    ask: Option<RestingOrder>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn side(&self, side: Side) -> Option<&RestingOrder> {
        match side {
            Side::Buy => self.bid.as_ref(),
            Side::Sell => self.ask.as_ref(),
        }
    }

    pub fn best_bid(&self) -> Option<&RestingOrder> {
        self.bid.as_ref()
    }

    pub fn best_ask(&self) -> Option<&RestingOrder> {
        self.ask.as_ref()
    }

    /// Does `owner` already have a resting order on `side`?
    pub fn has_resting(&self, side: Side, owner: PlayerId) -> bool {
        self.side(side).is_some_and(|o| o.owner == owner)
    }

    /// Would a new order from `owner` at `price` on `side` strike against
    /// `owner`'s own resting order on the opposite side? (spec §4.3 step 2)
    pub fn would_self_cross(&self, side: Side, owner: PlayerId, price: Price) -> bool {
        match self.side(side.opposite()) {
            Some(opposite) if opposite.owner == owner => match side {
                Side::Buy => price >= opposite.price,
                Side::Sell => price <= opposite.price,
            },
            _ => false,
        }
    }

    /// Does an incoming order at `price` on `side` strictly improve the
    /// book over whatever is currently resting there? True if the side is
    /// empty.
    pub fn improves(&self, side: Side, price: Price) -> bool {
        match self.side(side) {
            None => true,
            Some(resting) => match side {
                Side::Buy => price > resting.price,
                Side::Sell => price < resting.price,
            },
        }
    }

    /// Is there an opposite-side order that an incoming order at `price`
    /// would match against?
    pub fn matches(&self, side: Side, price: Price) -> bool {
        match self.side(side.opposite()) {
            Some(opposite) => match side {
                Side::Buy => opposite.price <= price,
                Side::Sell => opposite.price >= price,
            },
            None => false,
        }
    }

    /// Replace whatever is resting on `side` with `order` (the caller is
    /// responsible for having confirmed this is an improvement or an empty
    /// side), returning the order it displaced, if any.
    pub fn rest(&mut self, side: Side, order: RestingOrder) -> Option<RestingOrder> {
        match side {
            Side::Buy => self.bid.replace(order),
            Side::Sell => self.ask.replace(order),
        }
    }

    /// Clear whatever is resting on `side` (consumed by a match, canceled,
    /// or swept on a phase transition), returning it.
    pub fn clear(&mut self, side: Side) -> Option<RestingOrder> {
        match side {
            Side::Buy => self.bid.take(),
            Side::Sell => self.ask.take(),
        }
    }

    /// Clear a resting order on `side` only if it belongs to `owner` and
    /// satisfies `threshold` (spec §4.3 cancel semantics), returning the
    /// canceled order.
    pub fn cancel_if(
        &mut self,
        side: Side,
        owner: PlayerId,
        matches_threshold: impl FnOnce(Price) -> bool,
    ) -> Option<RestingOrder> {
        let resting = *self.side(side)?;
        if resting.owner == owner && matches_threshold(resting.price) {
            self.clear(side)
        } else {
            None
        }
    }

    /// True if both sides are empty.
    pub fn is_empty(&self) -> bool {
        self.bid.is_none() && self.ask.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: OrderId, owner: PlayerId, price: Price) -> RestingOrder {
        RestingOrder {
            order_id: id,
            owner,
            price,
        }
    }

    #[test]
    fn rests_on_empty_side() {
        let mut book = OrderBook::new();
        let owner = PlayerId::new();
        assert!(book.improves(Side::Buy, 10));
        book.rest(Side::Buy, order(1, owner, 10));
        assert_eq!(book.best_bid().unwrap().price, 10);
    }

    #[test]
    fn improving_bid_must_be_strictly_higher() {
        let mut book = OrderBook::new();
        let owner = PlayerId::new();
        book.rest(Side::Buy, order(1, owner, 10));
        assert!(!book.improves(Side::Buy, 10));
        assert!(!book.improves(Side::Buy, 9));
        assert!(book.improves(Side::Buy, 11));
    }

    #[test]
    fn improving_ask_must_be_strictly_lower() {
        let mut book = OrderBook::new();
        let owner = PlayerId::new();
        book.rest(Side::Sell, order(1, owner, 10));
        assert!(!book.improves(Side::Sell, 10));
        assert!(book.improves(Side::Sell, 9));
    }

    #[test]
    fn detects_self_cross_on_bid() {
        let mut book = OrderBook::new();
        let owner = PlayerId::new();
        book.rest(Side::Sell, order(1, owner, 8));
        assert!(book.would_self_cross(Side::Buy, owner, 8));
        assert!(book.would_self_cross(Side::Buy, owner, 9));
        assert!(!book.would_self_cross(Side::Buy, owner, 7));

        let other = PlayerId::new();
        assert!(!book.would_self_cross(Side::Buy, other, 9));
    }

    #[test]
    fn displacing_returns_the_old_order() {
        let mut book = OrderBook::new();
        let a = PlayerId::new();
        let b = PlayerId::new();
        book.rest(Side::Buy, order(1, a, 5));
        let displaced = book.rest(Side::Buy, order(2, b, 6));
        assert_eq!(displaced.unwrap().owner, a);
        assert_eq!(book.best_bid().unwrap().owner, b);
    }

    #[test]
    fn cancel_if_respects_threshold() {
        let mut book = OrderBook::new();
        let owner = PlayerId::new();
        book.rest(Side::Buy, order(1, owner, 12));

        // price = -1 ("all of mine") always matches.
        assert!(book.cancel_if(Side::Buy, owner, |_| true).is_some());
        assert!(book.best_bid().is_none());
    }

    #[test]
    fn cancel_if_ignores_other_owners() {
        let mut book = OrderBook::new();
        let owner = PlayerId::new();
        let other = PlayerId::new();
        book.rest(Side::Buy, order(1, owner, 12));
        assert!(book.cancel_if(Side::Buy, other, |_| true).is_none());
        assert!(book.best_bid().is_some());
    }

    #[test]
    fn matches_when_crossed() {
        let mut book = OrderBook::new();
        let owner = PlayerId::new();
        book.rest(Side::Sell, order(1, owner, 10));
        assert!(book.matches(Side::Buy, 10));
        assert!(book.matches(Side::Buy, 11));
        assert!(!book.matches(Side::Buy, 9));
    }
}
