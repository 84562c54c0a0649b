//! Deck composition and dealing — pure functions with no engine state.
//!
//! Picking the goal suit, the per-suit card counts, and the shuffled
//! distribution over players are all randomness-in, data-out: keeping them
//! free of `Round` makes the deal trivially unit-testable and replayable
//! from a recorded seed.

use crate::core_types::Suit;
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;

/// The outcome of dealing one round: which suit is the goal, and the hand
/// each seat (by index into the player list) was dealt.
#[derive(Debug, Clone)]
pub struct Deal {
    pub goal_suit: Suit,
    /// counts[seat][suit] = number of cards of that suit dealt to that seat
    pub hands: Vec<FxHashMap<Suit, u32>>,
}

/// Card counts per suit for one round: 8 cards in the goal suit's
/// companion, 12 in the goal suit, 10 in each of the other two.
fn suit_counts(goal_suit: Suit) -> FxHashMap<Suit, u32> {
    let eight_suit = goal_suit.companion();
    let mut counts = FxHashMap::default();
    for suit in Suit::ALL {
        let count = if suit == goal_suit {
            12
        } else if suit == eight_suit {
            8
        } else {
            10
        };
        counts.insert(suit, count);
    }
    counts
}

/// Deal a fresh 40-card round to `num_players` seats using `rng`.
///
/// The goal suit is chosen uniformly among the four suits; its companion
/// becomes the 8-card suit and the other color splits 10/10. Cards are then
/// shuffled and dealt uniformly at random to the seats.
pub fn deal(num_players: usize, rng: &mut impl Rng) -> Deal {
    let goal_suit = *Suit::ALL.choose(rng).expect("Suit::ALL is non-empty");
    let counts = suit_counts(goal_suit);

    let mut deck: Vec<Suit> = Vec::with_capacity(40);
    for suit in Suit::ALL {
        for _ in 0..counts[&suit] {
            deck.push(suit);
        }
    }
    debug_assert_eq!(deck.len(), 40);
    deck.shuffle(rng);

    let mut hands = vec![FxHashMap::default(); num_players];
    for (i, suit) in deck.into_iter().enumerate() {
        *hands[i % num_players].entry(suit).or_insert(0) += 1;
    }

    Deal { goal_suit, hands }
}

/// A small, deterministic hash of the dealt hands, used as an event-sink
/// fingerprint so duplicate or replayed deals can be detected without
/// shipping the full hand contents.
pub fn fingerprint(deal: &Deal) -> u64 {
    // FNV-1a over the goal suit and each seat's per-suit counts in a fixed
    // suit order, so the fingerprint is stable regardless of hashmap
    // iteration order.
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    let mut hash = FNV_OFFSET;
    let mut mix = |byte: u8| {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    };

    mix(deal.goal_suit as u8);
    for hand in &deal.hands {
        for suit in Suit::ALL {
            let count = *hand.get(&suit).unwrap_or(&0);
            for b in count.to_le_bytes() {
                mix(b);
            }
        }
    }
    hash
}
