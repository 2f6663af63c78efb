//! Human-versus-bot engine. Identical table rules to 1v1; the room
//! must seat exactly one human and one bot.

use std::collections::HashMap;

use crate::domain::cards::CardId;
use crate::domain::engine::core;
use crate::domain::engine::TrutEngine;
use crate::domain::state::{GameMode, MatchState, PlayerId, Room, Team};
use crate::errors::domain::{DomainError, PreconditionKind};

pub struct BotOneVOneEngine;

impl TrutEngine for BotOneVOneEngine {
    fn mode(&self) -> GameMode {
        GameMode::BotOneVsOne
    }

    fn start_game(&self, room: &Room) -> Result<MatchState, DomainError> {
        if room.seats.len() != 2 || room.seats.iter().filter(|p| p.is_bot).count() != 1 {
            return Err(DomainError::precondition(
                PreconditionKind::NotEnoughPlayers,
                "bot mode requires exactly one human and one bot",
            ));
        }

        let seat_order = room.seat_order();
        let mut teams = HashMap::new();
        teams.insert(seat_order[0], Team::Team1);
        teams.insert(seat_order[1], Team::Team2);

        Ok(core::initial_state(
            room,
            seat_order,
            teams,
            &mut rand::rng(),
        ))
    }

    fn play_card(
        &self,
        state: &MatchState,
        player_id: PlayerId,
        card_id: CardId,
    ) -> Result<MatchState, DomainError> {
        core::play_card(state, player_id, card_id, &mut rand::rng())
    }

    fn call_trut(
        &self,
        state: &MatchState,
        player_id: PlayerId,
    ) -> Result<MatchState, DomainError> {
        core::call_trut_two_seat(state, player_id)
    }

    fn respond_to_challenge(
        &self,
        state: &MatchState,
        player_id: PlayerId,
        accept: bool,
    ) -> Result<MatchState, DomainError> {
        core::respond_two_seat(state, player_id, accept, &mut rand::rng())
    }
}
