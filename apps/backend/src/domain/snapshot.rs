//! Per-player redacted views of room and match state.
//!
//! A player only ever sees their own cards; every other hand is reduced
//! to a count before anything leaves the server.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::cards::Card;
use crate::domain::state::{
    ChallengeState, GameMode, Phase, PlayedCard, Player, PlayerId, Room, RoomId, RoomStatus, Team,
    TeamScore, TrickWinner,
};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandView {
    Cards { cards: Vec<Card> },
    Count { count: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchSnapshot {
    pub mode: GameMode,
    pub seat_order: Vec<PlayerId>,
    pub hands: HashMap<PlayerId, HandView>,
    pub current_player: PlayerId,
    pub turn_counter: u32,
    pub phase: Phase,
    pub current_trick: Vec<PlayedCard>,
    pub trick_winners: Vec<TrickWinner>,
    pub scores: HashMap<Team, TeamScore>,
    pub round_number: u32,
    pub dealer_index: usize,
    pub challenge: ChallengeState,
    pub brelan_player: Option<PlayerId>,
    pub fortial_active: bool,
    pub fortial_player: Option<PlayerId>,
    pub game_ended: bool,
    pub winner: Option<Team>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub host_id: PlayerId,
    pub seats: Vec<Player>,
    pub mode: GameMode,
    pub status: RoomStatus,
    pub stake_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<MatchSnapshot>,
}

/// Build the view of a room as seen by `viewer`.
pub fn room_snapshot_for(room: &Room, viewer: PlayerId) -> RoomSnapshot {
    RoomSnapshot {
        id: room.id,
        host_id: room.host_id,
        seats: room.seats.clone(),
        mode: room.mode,
        status: room.status,
        stake_amount: room.stake_amount,
        state: room.state.as_ref().map(|s| {
            let hands = s
                .hands
                .iter()
                .map(|(id, hand)| {
                    let view = if *id == viewer {
                        HandView::Cards { cards: hand.clone() }
                    } else {
                        HandView::Count { count: hand.len() }
                    };
                    (*id, view)
                })
                .collect();
            MatchSnapshot {
                mode: s.mode,
                seat_order: s.seat_order.clone(),
                hands,
                current_player: s.current_player,
                turn_counter: s.turn_counter,
                phase: s.phase,
                current_trick: s.current_trick.clone(),
                trick_winners: s.trick_winners.clone(),
                scores: s.scores.clone(),
                round_number: s.round_number,
                dealer_index: s.dealer_index,
                challenge: s.challenge.clone(),
                brelan_player: s.brelan_player,
                fortial_active: s.fortial_active,
                fortial_player: s.fortial_player,
                game_ended: s.game_ended,
                winner: s.winner,
            }
        }),
    }
}
