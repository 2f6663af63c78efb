//! Mode-polymorphic match engines.
//!
//! Each variant is a pure state-transition implementation behind the
//! [`TrutEngine`] trait; the coordinator looks the variant up in an
//! [`EngineRegistry`] built once at startup.

pub mod core;

mod bot_one_v_one;
mod one_v_one;
mod two_v_two;

use std::collections::HashMap;

pub use bot_one_v_one::BotOneVOneEngine;
pub use one_v_one::OneVOneEngine;
pub use two_v_two::TwoVTwoEngine;

use crate::domain::cards::CardId;
use crate::domain::state::{GameMode, MatchState, PlayerId, Room};
use crate::errors::domain::{DomainError, ValidationKind};

/// Pure transition functions for one game mode. Implementations never
/// perform I/O; randomness is limited to dealing.
pub trait TrutEngine: Send + Sync {
    fn mode(&self) -> GameMode;

    /// Build the initial match state for a room that is about to start.
    fn start_game(&self, room: &Room) -> Result<MatchState, DomainError>;

    fn play_card(
        &self,
        state: &MatchState,
        player_id: PlayerId,
        card_id: CardId,
    ) -> Result<MatchState, DomainError>;

    fn call_trut(&self, state: &MatchState, player_id: PlayerId)
        -> Result<MatchState, DomainError>;

    fn respond_to_challenge(
        &self,
        state: &MatchState,
        player_id: PlayerId,
        accept: bool,
    ) -> Result<MatchState, DomainError>;

    /// Declare three of a kind, which auto-triggers a trut call.
    fn call_brelan(
        &self,
        state: &MatchState,
        player_id: PlayerId,
        card_ids: &[CardId],
    ) -> Result<MatchState, DomainError> {
        core::validate_brelan(state, player_id, card_ids)?;
        let mut next = self.call_trut(state, player_id)?;
        next.brelan_player = Some(player_id);
        Ok(next)
    }

    /// Fortial is a 2v2-only sub-phase; other modes reject it.
    fn start_fortial(
        &self,
        state: &MatchState,
        player_id: PlayerId,
    ) -> Result<MatchState, DomainError> {
        let _ = (state, player_id);
        Err(DomainError::validation(
            ValidationKind::FortialNotAvailable,
            "fortial phase is not available for this game mode",
        ))
    }
}

/// Mode to engine lookup, built once at startup.
pub struct EngineRegistry {
    engines: HashMap<GameMode, Box<dyn TrutEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        let mut engines: HashMap<GameMode, Box<dyn TrutEngine>> = HashMap::new();
        engines.insert(GameMode::OneVsOne, Box::new(OneVOneEngine));
        engines.insert(GameMode::TwoVsTwo, Box::new(TwoVTwoEngine));
        engines.insert(GameMode::BotOneVsOne, Box::new(BotOneVOneEngine));
        Self { engines }
    }

    pub fn engine(&self, mode: GameMode) -> Result<&dyn TrutEngine, DomainError> {
        self.engines
            .get(&mode)
            .map(|e| e.as_ref())
            .ok_or_else(|| DomainError::internal(format!("no engine registered for {mode:?}")))
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
