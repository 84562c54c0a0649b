//! Round — the phase state machine wrapping players, books, ledger, and
//! timer. Owns the single critical section every mutation goes through
//! (spec §5): the engine facade holds one `Round` behind one lock, the same
//! shape as the teacher's single global matching state guarded by one mutex.

use crate::clock::Clock;
use crate::core_types::{OrderId, PlayerId, Price, Side, Suit};
use crate::deal;
use crate::error::EngineError;
use crate::events::{Event, EventSink};
use crate::ledger::Ledger;
use crate::orderbook::{OrderBook, RestingOrder};
use crate::settlement::{self, Settlement};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Trading,
    Completed,
    /// A debug invariant failed. Terminal: no further actions are admitted.
    /// Not named in the base spec's three-phase model; a supplemented
    /// failure mode since "refuse further actions" (spec §7) needs somewhere
    /// to live.
    Errored,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub buyer: PlayerId,
    pub seller: PlayerId,
    pub suit: Suit,
    pub price: Price,
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub num_players: usize,
    pub trading_duration: Duration,
    pub starting_balance: Price,
    pub ante: Price,
}

#[derive(Debug, Clone, Copy)]
pub enum CancelSide {
    Buy,
    Sell,
    Both,
}

#[derive(Debug, Clone, Copy)]
pub enum CancelSuit {
    One(Suit),
    All,
}

#[derive(Debug, Clone, Copy)]
pub struct CancelRequest {
    pub side: CancelSide,
    pub suit: CancelSuit,
    /// Positive threshold, or -1 meaning "all of mine".
    pub price: Price,
}

#[derive(Debug, Clone, Copy)]
pub enum Action {
    Order { side: Side, suit: Suit, price: Price },
    Cancel(CancelRequest),
}

#[derive(Debug, Clone)]
pub enum ActionResult {
    Rested { order_id: OrderId },
    Traded { trade: Trade },
    Canceled { order_ids: Vec<OrderId> },
}

#[derive(Debug, Clone, Serialize)]
pub struct BookQuote {
    pub player_id: PlayerId,
    pub price: Price,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketSide {
    pub highest_bid: Option<BookQuote>,
    pub lowest_ask: Option<BookQuote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    #[serde(rename = "state")]
    pub phase: Phase,
    pub time_left: Option<u32>,
    pub pot: Price,
    pub hand: FxHashMap<Suit, u32>,
    pub market: FxHashMap<Suit, MarketSide>,
    pub balances: FxHashMap<PlayerId, Price>,
    pub trades: Vec<Trade>,
    pub results: Option<Settlement>,
    pub hands: Option<FxHashMap<PlayerId, FxHashMap<Suit, u32>>>,
    pub initial_balances: Option<FxHashMap<PlayerId, Price>>,
}

pub struct Round {
    phase: Phase,
    players: Vec<PlayerId>,
    ledger: Ledger,
    books: FxHashMap<Suit, OrderBook>,
    next_order_id: OrderId,
    goal_suit: Option<Suit>,
    deadline: Option<Instant>,
    trades: Vec<Trade>,
    results: Option<Settlement>,
    config: Config,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    rng: StdRng,
}

impl Round {
    pub fn new(config: Config, clock: Arc<dyn Clock>, sink: Arc<dyn EventSink>) -> Self {
        Self::with_rng(config, clock, sink, StdRng::from_entropy())
    }

    pub fn with_rng(
        config: Config,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
        rng: StdRng,
    ) -> Self {
        Round {
            phase: Phase::Waiting,
            players: Vec::new(),
            ledger: Ledger::new(),
            books: Suit::ALL.into_iter().map(|s| (s, OrderBook::new())).collect(),
            next_order_id: 0,
            goal_suit: None,
            deadline: None,
            trades: Vec::new(),
            results: None,
            config,
            clock,
            sink,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Detects a deadline that has passed since the last call and, if so,
    /// runs the trading -> completed transition before the caller's
    /// operation is processed. Every public entry point calls this first.
    fn sync_phase(&mut self) {
        if self.phase == Phase::Trading {
            if let Some(deadline) = self.deadline {
                if self.clock.now() >= deadline {
                    self.complete_round();
                }
            }
        }
    }

    fn fatal(&mut self, msg: impl Into<String>) -> EngineError {
        let msg = msg.into();
        self.phase = Phase::Errored;
        self.sink.emit(Event::Fatal {
            message: msg.clone(),
        });
        EngineError::Invariant(msg)
    }

    pub fn join(&mut self, name: String) -> Result<PlayerId, EngineError> {
        self.sync_phase();
        if self.phase == Phase::Completed {
            self.reset_to_waiting();
        }
        if self.phase != Phase::Waiting {
            return Err(EngineError::NotWaiting);
        }
        if name.trim().is_empty() {
            return Err(EngineError::EmptyName);
        }
        if self.players.len() >= self.config.num_players {
            return Err(EngineError::LobbyFull);
        }

        let id = PlayerId::new();
        self.ledger.add_player(id, name, self.config.starting_balance);
        self.players.push(id);

        if self.players.len() == self.config.num_players {
            self.start_trading()?;
        }
        Ok(id)
    }

    fn reset_to_waiting(&mut self) {
        self.phase = Phase::Waiting;
        self.players.clear();
        self.ledger = Ledger::new();
        self.books = Suit::ALL.into_iter().map(|s| (s, OrderBook::new())).collect();
        self.next_order_id = 0;
        self.goal_suit = None;
        self.deadline = None;
        self.trades.clear();
        self.results = None;
    }

    fn start_trading(&mut self) -> Result<(), EngineError> {
        let dealt = deal::deal(self.players.len(), &mut self.rng);
        self.ledger.deal_hands(dealt.hands.clone());
        if self.ledger.ante_all(self.config.ante).is_err() {
            return Err(self.fatal("ante_all failed after deal despite pre-funded starting balance"));
        }
        self.goal_suit = Some(dealt.goal_suit);
        let now = self.clock.now();
        self.deadline = Some(now + self.config.trading_duration);

        let initial_balances = self
            .players
            .iter()
            .map(|p| (*p, self.ledger.player(*p).unwrap().balance()))
            .collect();
        let fingerprint = deal::fingerprint(&dealt);
        self.sink.emit(Event::RoundStarted {
            players: self.players.clone(),
            initial_balances,
            deal_fingerprint: fingerprint,
        });
        self.phase = Phase::Trading;
        Ok(())
    }

    fn complete_round(&mut self) {
        for book in self.books.values_mut() {
            book.clear(Side::Buy);
            book.clear(Side::Sell);
        }
        let goal_suit = self
            .goal_suit
            .expect("goal_suit is set once trading starts");
        let hands: Vec<FxHashMap<Suit, u32>> = self
            .players
            .iter()
            .map(|p| self.ledger.player(*p).unwrap().hand().clone())
            .collect();
        let results = settlement::settle(&self.players, &hands, self.ledger.pot(), goal_suit);
        self.ledger
            .distribute(&results.bonuses, &results.winners, results.share_each);
        self.sink.emit(Event::RoundCompleted {
            results: results.clone(),
        });
        self.results = Some(results);
        self.phase = Phase::Completed;
    }

    /// Reported `time_left`, renormalized to [0, 240] regardless of the
    /// configured real duration (spec §4.5).
    pub fn time_left(&self) -> Option<u32> {
        if self.phase != Phase::Trading {
            return None;
        }
        let deadline = self.deadline?;
        let now = self.clock.now();
        if now >= deadline {
            return Some(0);
        }
        let remaining = (deadline - now).as_secs_f64();
        let duration = self.config.trading_duration.as_secs_f64();
        let reported = (240.0 * remaining / duration).ceil();
        Some(reported.clamp(0.0, 240.0) as u32)
    }

    pub fn submit_action(
        &mut self,
        player: PlayerId,
        action: Action,
    ) -> Result<ActionResult, EngineError> {
        self.sync_phase();
        if self.phase != Phase::Trading {
            return Err(EngineError::NotTrading);
        }
        if !self.players.contains(&player) {
            return Err(EngineError::UnknownPlayer);
        }
        match action {
            Action::Order { side, suit, price } => self.submit_order(player, side, suit, price),
            Action::Cancel(req) => self.submit_cancel(player, req),
        }
    }

    fn submit_order(
        &mut self,
        player: PlayerId,
        side: Side,
        suit: Suit,
        price: Price,
    ) -> Result<ActionResult, EngineError> {
        if price <= 0 {
            return Err(EngineError::InvalidPrice);
        }

        let book = self
            .books
            .get_mut(&suit)
            .expect("every suit has a book for the lifetime of the round");

        if book.would_self_cross(side, player, price) {
            return Err(EngineError::SelfCross);
        }

        if book.matches(side, price) {
            let resting = *book
                .side(side.opposite())
                .expect("matches() implies the opposite side is occupied");
            let trade_price = resting.price;

            // The taker's own funds/holdings were never checked on admission
            // (only the resting order's owner was, when it rested) — check
            // them now, before consuming the resting order.
            match side {
                Side::Buy => {
                    if !self.ledger.can_fund(player, trade_price) {
                        return Err(EngineError::InsufficientFunds);
                    }
                }
                Side::Sell => {
                    if !self.ledger.can_deliver(player, suit) {
                        return Err(EngineError::NoHoldings);
                    }
                }
            }

            book.clear(side.opposite());

            let (buyer, seller) = match side {
                Side::Buy => (player, resting.owner),
                Side::Sell => (resting.owner, player),
            };
            if let Err(e) = self.ledger.transfer(buyer, seller, suit, trade_price) {
                return Err(self.fatal(format!(
                    "transfer failed for a match the book already admitted: {e}"
                )));
            }
            let trade = Trade {
                buyer,
                seller,
                suit,
                price: trade_price,
            };
            self.trades.push(trade.clone());
            self.sink.emit(Event::Transaction {
                buyer,
                seller,
                suit,
                price: trade_price,
            });
            self.recheck_other_orders(buyer);
            self.recheck_other_orders(seller);
            return Ok(ActionResult::Traded { trade });
        }

        if book.has_resting(side, player) {
            return Err(EngineError::DuplicateOrder);
        }

        match side {
            Side::Buy => {
                if !self.ledger.can_fund(player, price) {
                    return Err(EngineError::InsufficientFunds);
                }
            }
            Side::Sell => {
                if !self.ledger.can_deliver(player, suit) {
                    return Err(EngineError::NoHoldings);
                }
            }
        }

        let book = self.books.get_mut(&suit).unwrap();
        if !book.improves(side, price) {
            return Err(EngineError::NotImproving);
        }

        let order_id = self.next_order_id;
        self.next_order_id += 1;
        let displaced = book.rest(
            side,
            RestingOrder {
                order_id,
                owner: player,
                price,
            },
        );
        if let Some(old) = displaced {
            self.sink.emit(Event::Cancel {
                side,
                suit,
                old_owner: old.owner,
                old_price: old.price,
                new_owner: Some(player),
                new_price: Some(price),
            });
        }
        self.sink.emit(Event::OrderRested {
            order_id,
            owner: player,
            side,
            suit,
            price,
        });
        Ok(ActionResult::Rested { order_id })
    }

    /// After a trade, a counterparty's *other* resting orders may no longer
    /// be feasible (can't fund a bid after spending, can't deliver an ask
    /// after selling the last card). Cancel whatever is now infeasible.
    fn recheck_other_orders(&mut self, player: PlayerId) {
        for suit in Suit::ALL {
            for side in [Side::Buy, Side::Sell] {
                let resting = self
                    .books
                    .get(&suit)
                    .and_then(|book| book.side(side))
                    .copied();
                let Some(resting) = resting else { continue };
                if resting.owner != player {
                    continue;
                }
                let feasible = match side {
                    Side::Buy => self.ledger.can_fund(player, resting.price),
                    Side::Sell => self.ledger.can_deliver(player, suit),
                };
                if !feasible {
                    let book = self.books.get_mut(&suit).unwrap();
                    let old = book.clear(side).unwrap();
                    self.sink.emit(Event::Cancel {
                        side,
                        suit,
                        old_owner: old.owner,
                        old_price: old.price,
                        new_owner: None,
                        new_price: None,
                    });
                }
            }
        }
    }

    fn submit_cancel(
        &mut self,
        player: PlayerId,
        req: CancelRequest,
    ) -> Result<ActionResult, EngineError> {
        if req.price < -1 || req.price == 0 {
            return Err(EngineError::InvalidPrice);
        }
        let sides: &[Side] = match req.side {
            CancelSide::Buy => &[Side::Buy],
            CancelSide::Sell => &[Side::Sell],
            CancelSide::Both => &[Side::Buy, Side::Sell],
        };
        let suits: Vec<Suit> = match req.suit {
            CancelSuit::One(s) => vec![s],
            CancelSuit::All => Suit::ALL.to_vec(),
        };

        let mut canceled = Vec::new();
        for suit in suits {
            for &side in sides {
                let book = self.books.get_mut(&suit).unwrap();
                let threshold = req.price;
                let result = book.cancel_if(side, player, |resting_price| {
                    threshold == -1
                        || (side == Side::Buy && resting_price >= threshold)
                        || (side == Side::Sell && resting_price <= threshold)
                });
                if let Some(old) = result {
                    canceled.push(old.order_id);
                    self.sink.emit(Event::Cancel {
                        side,
                        suit,
                        old_owner: old.owner,
                        old_price: old.price,
                        new_owner: None,
                        new_price: None,
                    });
                }
            }
        }
        Ok(ActionResult::Canceled {
            order_ids: canceled,
        })
    }

    pub fn state_for(&mut self, player: PlayerId) -> Result<Snapshot, EngineError> {
        self.sync_phase();
        if !self.players.contains(&player) {
            return Err(EngineError::UnknownPlayer);
        }

        let hand = self
            .ledger
            .player(player)
            .map(|p| p.hand().clone())
            .unwrap_or_default();

        let balances = self
            .players
            .iter()
            .map(|p| (*p, self.ledger.player(*p).unwrap().balance()))
            .collect();

        let market = Suit::ALL
            .into_iter()
            .map(|suit| {
                let book = &self.books[&suit];
                let quote = |o: Option<&RestingOrder>| {
                    o.map(|o| BookQuote {
                        player_id: o.owner,
                        price: o.price,
                    })
                };
                (
                    suit,
                    MarketSide {
                        highest_bid: quote(book.best_bid()),
                        lowest_ask: quote(book.best_ask()),
                    },
                )
            })
            .collect();

        let (results, hands, initial_balances) = if self.phase == Phase::Completed {
            let hands = self
                .players
                .iter()
                .map(|p| (*p, self.ledger.player(*p).unwrap().hand().clone()))
                .collect();
            let initial_balances = self
                .players
                .iter()
                .map(|p| (*p, self.ledger.player(*p).unwrap().initial_balance))
                .collect();
            (self.results.clone(), Some(hands), Some(initial_balances))
        } else {
            (None, None, None)
        };

        Ok(Snapshot {
            phase: self.phase,
            time_left: self.time_left(),
            pot: self.ledger.pot(),
            hand,
            market,
            balances,
            trades: self.trades.clone(),
            results,
            hands,
            initial_balances,
        })
    }
}
