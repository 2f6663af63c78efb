//! Shared data model: players, rooms and the per-room match state.

use std::collections::HashMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cards::{Card, CardId};
use crate::errors::domain::{DomainError, PreconditionKind, ValidationKind};

pub type PlayerId = Uuid;
pub type RoomId = Uuid;

/// Truts needed to win the game.
pub const TRUTS_TO_WIN: u8 = 7;
/// Cannets convert into a trut once a team holds this many.
pub const CANNETS_PER_TRUT: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    OneVsOne,
    TwoVsTwo,
    BotOneVsOne,
}

impl GameMode {
    pub fn seat_count(&self) -> usize {
        match self {
            GameMode::OneVsOne | GameMode::BotOneVsOne => 2,
            GameMode::TwoVsTwo => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Team1,
    Team2,
}

impl Team {
    pub fn opponent(&self) -> Team {
        match self {
            Team::Team1 => Team::Team2,
            Team::Team2 => Team::Team1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotProfile {
    Easy,
    Normal,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub team: Option<Team>,
    pub connected: bool,
    pub ready: bool,
    pub is_bot: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_profile: Option<BotProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Player {
    pub fn human(id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            team: None,
            connected: true,
            ready: false,
            is_bot: false,
            bot_profile: None,
            email: None,
        }
    }

    pub fn bot(display_name: impl Into<String>, profile: BotProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            team: None,
            connected: true,
            ready: true,
            is_bot: true,
            bot_profile: Some(profile),
            email: None,
        }
    }
}

/// How 2v2 teams are formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamMode {
    /// Four solo players; teams are shuffled at game start.
    Solo,
    /// Two pre-formed pairs; assignment is fixed at room creation.
    Preformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// A room: seats plus (once started) the live match state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub host_id: PlayerId,
    pub seats: Vec<Player>,
    pub mode: GameMode,
    pub status: RoomStatus,
    pub stake_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_mode: Option<TeamMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<MatchState>,
    #[serde(skip)]
    pub created_at: Option<SystemTime>,
}

impl Room {
    pub fn new(host: Player, mode: GameMode, stake_amount: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            host_id: host.id,
            seats: vec![host],
            mode,
            status: RoomStatus::Waiting,
            stake_amount,
            team_mode: None,
            state: None,
            created_at: Some(SystemTime::now()),
        }
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= self.mode.seat_count()
    }

    pub fn seat(&self, player_id: PlayerId) -> Option<&Player> {
        self.seats.iter().find(|p| p.id == player_id)
    }

    pub fn seat_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.seats.iter_mut().find(|p| p.id == player_id)
    }

    pub fn require_seat(&self, player_id: PlayerId) -> Result<&Player, DomainError> {
        self.seat(player_id).ok_or_else(|| {
            DomainError::precondition(
                PreconditionKind::NotInRoom,
                format!("player {player_id} is not seated in room {}", self.id),
            )
        })
    }

    pub fn require_state(&self) -> Result<&MatchState, DomainError> {
        self.state.as_ref().ok_or_else(|| {
            DomainError::precondition(
                PreconditionKind::GameNotInProgress,
                format!("room {} has no game in progress", self.id),
            )
        })
    }

    /// Seat ids in table order.
    pub fn seat_order(&self) -> Vec<PlayerId> {
        self.seats.iter().map(|p| p.id).collect()
    }

    pub fn team_of(&self, player_id: PlayerId) -> Option<Team> {
        self.seat(player_id).and_then(|p| p.team)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Playing,
    Truting,
    Scoring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedCard {
    pub player_id: PlayerId,
    pub card: Card,
}

/// Outcome of a completed trick. A tie on strength makes the trick
/// rotten; attribution is deferred to round scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrickWinner {
    Player { player_id: PlayerId },
    Rotten,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub truts: u8,
    pub cannets: u8,
}

/// Standing Trut challenge, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeState {
    /// A trut was called this round; only one per round is allowed.
    pub has_truted: bool,
    pub truting_player: Option<PlayerId>,
    /// The challenge was accepted; the round is worth a trut point.
    pub accepted: bool,
    pub awaiting_response: bool,
    /// Currently prompted respondent.
    pub respondent: Option<PlayerId>,
    /// Remaining respondents in clockwise order from the dealer's left.
    pub pending_respondents: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub mode: GameMode,
    pub seat_order: Vec<PlayerId>,
    pub teams: HashMap<PlayerId, Team>,
    pub hands: HashMap<PlayerId, Vec<Card>>,
    pub deck_rest: Vec<Card>,
    pub current_player: PlayerId,
    /// Monotonic action counter. Timers capture it as a staleness
    /// fingerprint; every committed transition bumps it and it is
    /// never reset within a game.
    pub turn_counter: u32,
    pub phase: Phase,
    pub current_trick: Vec<PlayedCard>,
    pub completed_tricks: Vec<Vec<PlayedCard>>,
    pub trick_winners: Vec<TrickWinner>,
    /// Tied tricks, kept for audit and display only.
    pub rotten_tricks: Vec<Vec<PlayedCard>>,
    pub scores: HashMap<Team, TeamScore>,
    pub round_number: u32,
    pub dealer_index: usize,
    pub challenge: ChallengeState,
    /// Player whose brelan converted into the round's trut, for display.
    pub brelan_player: Option<PlayerId>,
    pub fortial_active: bool,
    pub fortial_player: Option<PlayerId>,
    pub new_round_started: bool,
    pub game_ended: bool,
    pub winner: Option<Team>,
}

impl MatchState {
    pub fn seat_index(&self, player_id: PlayerId) -> Option<usize> {
        self.seat_order.iter().position(|id| *id == player_id)
    }

    pub fn seat_at(&self, index: usize) -> PlayerId {
        self.seat_order[index % self.seat_order.len()]
    }

    /// Seat immediately left of the dealer; starts the round.
    pub fn starter_index(&self) -> usize {
        (self.dealer_index + 1) % self.seat_order.len()
    }

    pub fn team_of(&self, player_id: PlayerId) -> Result<Team, DomainError> {
        self.teams.get(&player_id).copied().ok_or_else(|| {
            DomainError::internal(format!("player {player_id} has no team assignment"))
        })
    }

    pub fn score(&self, team: Team) -> TeamScore {
        self.scores.get(&team).copied().unwrap_or_default()
    }

    pub fn score_mut(&mut self, team: Team) -> &mut TeamScore {
        self.scores.entry(team).or_default()
    }

    pub fn require_not_ended(&self) -> Result<(), DomainError> {
        if self.game_ended {
            return Err(DomainError::precondition(
                PreconditionKind::GameAlreadyEnded,
                "game has already ended",
            ));
        }
        Ok(())
    }

    pub fn require_turn(&self, player_id: PlayerId) -> Result<(), DomainError> {
        if self.current_player != player_id {
            return Err(DomainError::validation(
                ValidationKind::NotYourTurn,
                format!("it is not player {player_id}'s turn"),
            ));
        }
        Ok(())
    }

    pub fn require_hand(&self, player_id: PlayerId) -> Result<&Vec<Card>, DomainError> {
        self.hands.get(&player_id).ok_or_else(|| {
            DomainError::internal(format!("player {player_id} has no hand"))
        })
    }

    pub fn require_card_in_hand(
        &self,
        player_id: PlayerId,
        card_id: CardId,
    ) -> Result<Card, DomainError> {
        let hand = self.require_hand(player_id)?;
        hand.iter()
            .find(|c| c.id == card_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::CardNotInHand,
                    format!("card {card_id} is not in player {player_id}'s hand"),
                )
            })
    }

    /// Next seat clockwise from the given player.
    pub fn next_after(&self, player_id: PlayerId) -> Result<PlayerId, DomainError> {
        let idx = self.seat_index(player_id).ok_or_else(|| {
            DomainError::internal(format!("player {player_id} is not seated"))
        })?;
        Ok(self.seat_at(idx + 1))
    }

    pub fn hands_are_empty(&self) -> bool {
        self.hands.values().all(|h| h.is_empty())
    }
}
