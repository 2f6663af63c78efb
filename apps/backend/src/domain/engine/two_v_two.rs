//! Four-seat team engine: trut challenges poll the opposing pair in
//! clockwise order from the dealer's left, and the fortial sub-phase
//! exists only here.

use std::collections::HashMap;

use rand::seq::SliceRandom;

use crate::domain::cards::CardId;
use crate::domain::engine::core;
use crate::domain::engine::TrutEngine;
use crate::domain::state::{
    GameMode, MatchState, Phase, PlayerId, Room, Team, TeamMode,
};
use crate::errors::domain::{DomainError, PreconditionKind, ValidationKind};

pub struct TwoVTwoEngine;

impl TwoVTwoEngine {
    /// Opposing seats in clockwise order starting at the dealer's left.
    fn respondent_order(state: &MatchState, caller_team: Team) -> Vec<PlayerId> {
        let seats = state.seat_order.len();
        (0..seats)
            .map(|offset| state.seat_at(state.dealer_index + 1 + offset))
            .filter(|id| state.teams.get(id) != Some(&caller_team))
            .collect()
    }
}

impl TrutEngine for TwoVTwoEngine {
    fn mode(&self) -> GameMode {
        GameMode::TwoVsTwo
    }

    fn start_game(&self, room: &Room) -> Result<MatchState, DomainError> {
        if room.seats.len() < 4 {
            return Err(DomainError::precondition(
                PreconditionKind::NotEnoughPlayers,
                "2v2 requires four seated players",
            ));
        }

        let mut rng = rand::rng();
        let (seat_order, teams) = match room.team_mode {
            Some(TeamMode::Preformed) => {
                // Fixed at room creation; seats keep their teams.
                let seat_order = room.seat_order();
                let mut teams = HashMap::new();
                for player in &room.seats {
                    let team = player.team.ok_or_else(|| {
                        DomainError::internal(format!(
                            "player {} has no team in a preformed room",
                            player.id
                        ))
                    })?;
                    teams.insert(player.id, team);
                }
                (seat_order, teams)
            }
            _ => {
                // Solo queue: shuffle the seats, then alternate teams so
                // teammates never play consecutively.
                let mut seat_order = room.seat_order();
                seat_order.shuffle(&mut rng);
                let teams = seat_order
                    .iter()
                    .enumerate()
                    .map(|(i, id)| {
                        (*id, if i % 2 == 0 { Team::Team1 } else { Team::Team2 })
                    })
                    .collect();
                (seat_order, teams)
            }
        };

        Ok(core::initial_state(room, seat_order, teams, &mut rng))
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
        let mut next = core::begin_trut(state, player_id)?;
        let caller_team = next.team_of(player_id)?;
        let mut order = Self::respondent_order(&next, caller_team);
        if order.is_empty() {
            return Err(DomainError::internal("trut call found no opponents"));
        }
        next.challenge.respondent = Some(order.remove(0));
        next.challenge.pending_respondents = order;
        Ok(next)
    }

    fn respond_to_challenge(
        &self,
        state: &MatchState,
        player_id: PlayerId,
        accept: bool,
    ) -> Result<MatchState, DomainError> {
        state.require_not_ended()?;
        core::require_respondent(state, player_id)?;

        let mut next = state.clone();
        next.new_round_started = false;
        next.turn_counter += 1;

        if accept {
            // One accept binds the whole team; nobody else is asked.
            next.challenge.accepted = true;
            next.challenge.awaiting_response = false;
            next.challenge.respondent = None;
            next.challenge.pending_respondents.clear();
            next.phase = Phase::Playing;
            return Ok(next);
        }

        if !next.challenge.pending_respondents.is_empty() {
            // This fold only advances the pointer to the next opponent.
            next.challenge.respondent = Some(next.challenge.pending_respondents.remove(0));
            return Ok(next);
        }

        // Every opponent folded: the truting team takes a cannet. The
        // round only redeals if the hands already ran out.
        next.challenge.accepted = false;
        next.challenge.awaiting_response = false;
        next.phase = Phase::Scoring;
        core::award_fold_cannet(&mut next)?;
        core::reset_round_state(&mut next);
        if core::finalize_if_ended(&mut next) {
            return Ok(next);
        }
        if next.hands_are_empty() {
            core::start_new_round(&mut next, &mut rand::rng());
        }
        Ok(next)
    }

    fn start_fortial(
        &self,
        state: &MatchState,
        player_id: PlayerId,
    ) -> Result<MatchState, DomainError> {
        state.require_not_ended()?;
        if state.seat_index(player_id).is_none() {
            return Err(DomainError::precondition(
                PreconditionKind::NotInRoom,
                format!("player {player_id} is not seated in this game"),
            ));
        }

        let fortial_team = [Team::Team1, Team::Team2].into_iter().find(|team| {
            let score = state.score(*team);
            score.truts == 6 && score.cannets >= 2
        });
        let Some(team) = fortial_team else {
            return Err(DomainError::validation(
                ValidationKind::FortialNotAvailable,
                "fortial conditions are not met",
            ));
        };

        // The fortialer is the first seat of that team clockwise from
        // the dealer's left.
        let seats = state.seat_order.len();
        let fortialer = (0..seats)
            .map(|offset| state.seat_at(state.dealer_index + 1 + offset))
            .find(|id| state.teams.get(id) == Some(&team))
            .ok_or_else(|| DomainError::internal("fortial team has no seated player"))?;

        let mut next = state.clone();
        next.new_round_started = false;
        next.turn_counter += 1;
        next.fortial_active = true;
        next.fortial_player = Some(fortialer);
        next.current_player = fortialer;
        Ok(next)
    }
}
