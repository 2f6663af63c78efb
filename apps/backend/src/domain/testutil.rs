//! Shared fixtures for engine tests.

use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::state::{GameMode, Player, PlayerId, Room, Team, TeamMode};
use uuid::Uuid;

pub fn card(suit: Suit, rank: Rank) -> Card {
    Card::new(suit, rank)
}

pub fn human(name: &str) -> Player {
    Player::human(Uuid::new_v4(), name)
}

pub fn room_1v1() -> Room {
    let host = human("ana");
    let mut room = Room::new(host, GameMode::OneVsOne, 0);
    room.seats.push(human("bob"));
    room
}

/// Four seats with fixed alternating teams: ana/carl vs bob/dana.
pub fn room_2v2_preformed() -> Room {
    let host = human("ana");
    let mut room = Room::new(host, GameMode::TwoVsTwo, 0);
    room.seats.push(human("bob"));
    room.seats.push(human("carl"));
    room.seats.push(human("dana"));
    for (i, seat) in room.seats.iter_mut().enumerate() {
        seat.team = Some(if i % 2 == 0 { Team::Team1 } else { Team::Team2 });
    }
    room.team_mode = Some(TeamMode::Preformed);
    room
}

pub fn room_2v2_solo() -> Room {
    let host = human("ana");
    let mut room = Room::new(host, GameMode::TwoVsTwo, 0);
    room.seats.push(human("bob"));
    room.seats.push(human("carl"));
    room.seats.push(human("dana"));
    room.team_mode = Some(TeamMode::Solo);
    room
}

/// Replace a seat's hand with specific cards.
pub fn give_hand(
    state: &mut crate::domain::state::MatchState,
    player_id: PlayerId,
    cards: Vec<Card>,
) {
    state.hands.insert(player_id, cards);
}
