//! Ledger — player balances, hand holdings, and the pot.
//!
//! Every mutation is a validated method (pre-check, then apply) in the
//! teacher's `Balance` idiom: private fields, `Result`-returning mutators,
//! no path that can bring the books out of balance. Conservation is
//! re-checked after every mutator in debug builds (spec §4.4).

use crate::core_types::{PlayerId, Price, Suit};
use rustc_hash::FxHashMap;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerLedger {
    pub id: PlayerId,
    pub name: String,
    balance: Price,
    hand: FxHashMap<Suit, u32>,
    pub initial_balance: Price,
}

impl PlayerLedger {
    pub fn balance(&self) -> Price {
        self.balance
    }

    pub fn hand(&self) -> &FxHashMap<Suit, u32> {
        &self.hand
    }

    pub fn holding(&self, suit: Suit) -> u32 {
        *self.hand.get(&suit).unwrap_or(&0)
    }
}

/// Owns every player's balance and hand for the round, plus the pot.
/// `total_at_deal` is the constant that `balance + pot` must always equal
/// between the deal and settlement (spec invariant: conservation of money).
#[derive(Debug, Default)]
pub struct Ledger {
    players: Vec<PlayerLedger>,
    pot: Price,
    total_at_deal: Option<Price>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_player(&mut self, id: PlayerId, name: String, starting_balance: Price) {
        self.players.push(PlayerLedger {
            id,
            name,
            balance: starting_balance,
            hand: FxHashMap::default(),
            initial_balance: starting_balance,
        });
    }

    pub fn players(&self) -> &[PlayerLedger] {
        &self.players
    }

    pub fn pot(&self) -> Price {
        self.pot
    }

    fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerLedger> {
        self.index_of(id).map(|i| &self.players[i])
    }

    /// Deal `hands[i]` to `self.players[i]`. Call once, right after
    /// `add_player` for every seat, before any ante or trading.
    pub fn deal_hands(&mut self, hands: Vec<FxHashMap<Suit, u32>>) {
        debug_assert_eq!(hands.len(), self.players.len());
        for (player, hand) in self.players.iter_mut().zip(hands) {
            player.hand = hand;
        }
    }

    /// Debit `amount` from every player into the pot, then snapshot the
    /// conservation total. Pre: every player's balance >= amount.
    pub fn ante_all(&mut self, amount: Price) -> Result<(), &'static str> {
        if self.players.iter().any(|p| p.balance < amount) {
            return Err("insufficient funds for ante");
        }
        for player in &mut self.players {
            player.balance -= amount;
            player.initial_balance = player.balance;
        }
        self.pot += amount * self.players.len() as Price;
        self.total_at_deal = Some(self.conserved_total());
        self.check_invariants();
        Ok(())
    }

    pub fn can_fund(&self, player: PlayerId, amount: Price) -> bool {
        self.player(player).is_some_and(|p| p.balance >= amount)
    }

    pub fn can_deliver(&self, player: PlayerId, suit: Suit) -> bool {
        self.player(player).is_some_and(|p| p.holding(suit) >= 1)
    }

    /// Execute a trade: one card of `suit` from seller to buyer, `price`
    /// dollars from buyer to seller. Pre: buyer can fund, seller can
    /// deliver (checked by the caller at order-admission time, re-checked
    /// here).
    pub fn transfer(
        &mut self,
        buyer: PlayerId,
        seller: PlayerId,
        suit: Suit,
        price: Price,
    ) -> Result<(), &'static str> {
        let buyer_idx = self.index_of(buyer).ok_or("unknown buyer")?;
        let seller_idx = self.index_of(seller).ok_or("unknown seller")?;
        if self.players[buyer_idx].balance < price {
            return Err("buyer cannot fund trade");
        }
        if self.players[seller_idx].holding(suit) < 1 {
            return Err("seller cannot deliver suit");
        }

        self.players[buyer_idx].balance -= price;
        self.players[seller_idx].balance += price;
        *self.players[buyer_idx].hand.entry(suit).or_insert(0) += 1;
        *self.players[seller_idx].hand.get_mut(&suit).unwrap() -= 1;

        self.check_invariants();
        Ok(())
    }

    /// Credit each winner with `share_each`, plus any per-player bonus, then
    /// zero the pot. Used once, at settlement.
    pub fn distribute(
        &mut self,
        bonuses: &FxHashMap<PlayerId, Price>,
        winners: &[PlayerId],
        share_each: Price,
    ) {
        for player in &mut self.players {
            if let Some(bonus) = bonuses.get(&player.id) {
                player.balance += bonus;
            }
        }
        for winner in winners {
            if let Some(idx) = self.index_of(*winner) {
                self.players[idx].balance += share_each;
            }
        }
        self.pot = 0;
    }

    fn conserved_total(&self) -> Price {
        self.players.iter().map(|p| p.balance).sum::<Price>() + self.pot
    }

    /// Solvency + money conservation, checked after every mutator. A
    /// failure here means the engine has a bug, not that a client did
    /// something wrong — the caller is expected to turn this into an
    /// `EngineError::Invariant` and kill the round.
    fn check_invariants(&self) {
        debug_assert!(
            self.players.iter().all(|p| p.balance >= 0),
            "negative balance"
        );
        if let Some(total) = self.total_at_deal {
            debug_assert_eq!(
                self.conserved_total(),
                total,
                "money conservation violated"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(n: usize) -> (Ledger, Vec<PlayerId>) {
        let mut ledger = Ledger::new();
        let ids: Vec<PlayerId> = (0..n).map(|_| PlayerId::new()).collect();
        for id in &ids {
            ledger.add_player(*id, "p".into(), 350);
        }
        (ledger, ids)
    }

    #[test]
    fn ante_funds_pot_and_debits_players() {
        let (mut ledger, ids) = setup(4);
        ledger.ante_all(50).unwrap();
        assert_eq!(ledger.pot(), 200);
        for id in ids {
            assert_eq!(ledger.player(id).unwrap().balance(), 300);
        }
    }

    #[test]
    fn ante_rejects_when_any_player_cannot_afford_it() {
        let mut ledger = Ledger::new();
        let id = PlayerId::new();
        ledger.add_player(id, "p".into(), 10);
        assert!(ledger.ante_all(50).is_err());
        assert_eq!(ledger.player(id).unwrap().balance(), 10);
    }

    #[test]
    fn transfer_moves_card_and_cash() {
        let (mut ledger, ids) = setup(2);
        ledger.deal_hands(vec![
            FxHashMap::default(),
            [(Suit::Spades, 3)].into_iter().collect(),
        ]);
        ledger.ante_all(50).unwrap();

        ledger.transfer(ids[0], ids[1], Suit::Spades, 10).unwrap();

        assert_eq!(ledger.player(ids[0]).unwrap().balance(), 290);
        assert_eq!(ledger.player(ids[1]).unwrap().balance(), 310);
        assert_eq!(ledger.player(ids[0]).unwrap().holding(Suit::Spades), 1);
        assert_eq!(ledger.player(ids[1]).unwrap().holding(Suit::Spades), 2);
    }

    #[test]
    fn transfer_rejects_when_seller_lacks_the_suit() {
        let (mut ledger, ids) = setup(2);
        ledger.deal_hands(vec![FxHashMap::default(), FxHashMap::default()]);
        ledger.ante_all(50).unwrap();

        assert!(ledger
            .transfer(ids[0], ids[1], Suit::Hearts, 10)
            .is_err());
    }

    #[test]
    fn distribute_pays_bonus_and_share_then_zeroes_pot() {
        let (mut ledger, ids) = setup(2);
        ledger.ante_all(50).unwrap();

        let mut bonuses = FxHashMap::default();
        bonuses.insert(ids[0], 20);
        bonuses.insert(ids[1], 10);
        ledger.distribute(&bonuses, &[ids[0]], 70);

        assert_eq!(ledger.player(ids[0]).unwrap().balance(), 300 + 20 + 70);
        assert_eq!(ledger.player(ids[1]).unwrap().balance(), 300 + 10);
        assert_eq!(ledger.pot(), 0);
    }
}
