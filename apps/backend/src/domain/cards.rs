//! Card primitives for the 32-card Trut deck.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CardId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];
}

/// The eight ranks of a piquet deck. Trut strength does not follow the
/// usual ordering; see [`Rank::strength`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Trut strength: 7 beats everything, then 8, then A, K, Q, J, 10, 9.
    pub fn strength(&self) -> u8 {
        match self {
            Rank::Seven => 8,
            Rank::Eight => 7,
            Rank::Ace => 6,
            Rank::King => 5,
            Rank::Queen => 4,
            Rank::Jack => 3,
            Rank::Ten => 2,
            Rank::Nine => 1,
        }
    }
}

/// A dealt card instance. Ids are minted per deal so that a play request
/// can only reference cards from the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self {
            id: Uuid::new_v4(),
            suit,
            rank,
        }
    }

    pub fn strength(&self) -> u8 {
        self.rank.strength()
    }
}
