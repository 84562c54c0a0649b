//! Settlement — a pure function of final hands, pot, and goal suit.
//!
//! Kept free of `Round` so it is trivially testable and so "replay the
//! event stream" (spec §8, invariant 8) can recompute the same result from
//! the `round_completed` event alone.

use crate::core_types::{PlayerId, Price, Suit};
use rustc_hash::FxHashMap;
use serde::Serialize;

const BONUS_PER_CARD: Price = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub goal_suit: Suit,
    pub counts: FxHashMap<PlayerId, u32>,
    pub bonuses: FxHashMap<PlayerId, Price>,
    pub winners: Vec<PlayerId>,
    pub share_each: Price,
    /// Any pot dollars left unclaimed (only possible when no one holds the
    /// goal suit — spec §9 open question, resolved by leaving the residue
    /// explicit rather than guessing a distribution).
    pub unclaimed_residue: Price,
}

/// Compute bonuses and pot split for the players (in join order) holding
/// `hands[i][goal_suit]` cards of the goal suit, from a pot of `pot` dollars.
pub fn settle(
    players: &[PlayerId],
    hands: &[FxHashMap<Suit, u32>],
    pot: Price,
    goal_suit: Suit,
) -> Settlement {
    debug_assert_eq!(players.len(), hands.len());

    let mut counts = FxHashMap::default();
    let mut bonuses = FxHashMap::default();
    let mut bonus_total: Price = 0;

    for (player, hand) in players.iter().zip(hands.iter()) {
        let count = *hand.get(&goal_suit).unwrap_or(&0);
        let bonus = count as Price * BONUS_PER_CARD;
        counts.insert(*player, count);
        bonuses.insert(*player, bonus);
        bonus_total += bonus;
    }

    let remaining_pot = pot - bonus_total;
    let max_count = counts.values().copied().max().unwrap_or(0);

    let (winners, share_each, unclaimed_residue) = if max_count == 0 || remaining_pot <= 0 {
        (Vec::new(), 0, remaining_pot.max(0))
    } else {
        let winners: Vec<PlayerId> = players
            .iter()
            .filter(|p| counts[*p] == max_count)
            .copied()
            .collect();
        let share_each = remaining_pot / winners.len() as Price;
        let residue = remaining_pot - share_each * winners.len() as Price;
        (winners, share_each, residue)
    };

    Settlement {
        goal_suit,
        counts,
        bonuses,
        winners,
        share_each,
        unclaimed_residue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(counts: &[(Suit, u32)]) -> FxHashMap<Suit, u32> {
        counts.iter().copied().collect()
    }

    #[test]
    fn s6_reference_settlement() {
        let a = PlayerId::new();
        let b = PlayerId::new();
        let c = PlayerId::new();
        let d = PlayerId::new();
        let players = vec![a, b, c, d];
        let hands = vec![
            hand(&[(Suit::Hearts, 4)]),
            hand(&[(Suit::Hearts, 3)]),
            hand(&[(Suit::Hearts, 2)]),
            hand(&[(Suit::Hearts, 1)]),
        ];

        let result = settle(&players, &hands, 200, Suit::Hearts);

        assert_eq!(result.bonuses[&a], 40);
        assert_eq!(result.bonuses[&b], 30);
        assert_eq!(result.bonuses[&c], 20);
        assert_eq!(result.bonuses[&d], 10);
        assert_eq!(result.winners, vec![a]);
        assert_eq!(result.share_each, 100);
        assert_eq!(result.unclaimed_residue, 0);
    }

    #[test]
    fn ties_split_the_remaining_pot_with_integer_division() {
        let a = PlayerId::new();
        let b = PlayerId::new();
        let players = vec![a, b];
        let hands = vec![hand(&[(Suit::Spades, 5)]), hand(&[(Suit::Spades, 5)])];

        // Pot 101, bonuses 50 each (100 total), remaining 1 split between 2
        // winners: 0 each, residue 1.
        let result = settle(&players, &hands, 101, Suit::Spades);

        assert_eq!(result.winners.len(), 2);
        assert_eq!(result.share_each, 0);
        assert_eq!(result.unclaimed_residue, 1);
    }

    #[test]
    fn zero_goal_suit_holders_leaves_pot_unclaimed() {
        let a = PlayerId::new();
        let players = vec![a];
        let hands = vec![hand(&[(Suit::Diamonds, 0)])];

        let result = settle(&players, &hands, 200, Suit::Diamonds);

        assert!(result.winners.is_empty());
        assert_eq!(result.share_each, 0);
        assert_eq!(result.unclaimed_residue, 200);
    }

    #[test]
    fn bonus_is_ten_dollars_per_goal_suit_card() {
        let a = PlayerId::new();
        let players = vec![a];
        let hands = vec![hand(&[(Suit::Clubs, 7)])];

        let result = settle(&players, &hands, 0, Suit::Clubs);
        assert_eq!(result.bonuses[&a], 70);
    }
}
