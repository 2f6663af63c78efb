//! Deck construction, shuffling and dealing.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::state::PlayerId;

pub const HAND_SIZE: usize = 3;
pub const DECK_SIZE: usize = 32;

/// Build a fresh 32-card deck with newly minted card ids.
pub fn fresh_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::new(suit, rank));
        }
    }
    deck
}

/// Shuffle a deck in place with the supplied rng. Generic over `Rng` so
/// tests can pass a seeded generator.
pub fn shuffle_deck<R: Rng + ?Sized>(deck: &mut [Card], rng: &mut R) {
    deck.shuffle(rng);
}

/// Deal three cards to each seat, round-robin from the top of the deck.
/// Returns the hands keyed by player id plus the undealt remainder.
pub fn deal_hands(
    deck: Vec<Card>,
    seat_order: &[PlayerId],
) -> (HashMap<PlayerId, Vec<Card>>, Vec<Card>) {
    let mut hands: HashMap<PlayerId, Vec<Card>> = seat_order
        .iter()
        .map(|id| (*id, Vec::with_capacity(HAND_SIZE)))
        .collect();

    let mut iter = deck.into_iter();
    for _ in 0..HAND_SIZE {
        for player in seat_order {
            if let Some(card) = iter.next() {
                if let Some(hand) = hands.get_mut(player) {
                    hand.push(card);
                }
            }
        }
    }

    (hands, iter.collect())
}

/// Shuffle a fresh deck and deal a round's hands in one step.
pub fn deal_round<R: Rng + ?Sized>(
    seat_order: &[PlayerId],
    rng: &mut R,
) -> (HashMap<PlayerId, Vec<Card>>, Vec<Card>) {
    let mut deck = fresh_deck();
    shuffle_deck(&mut deck, rng);
    deal_hands(deck, seat_order)
}
