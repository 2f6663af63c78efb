//! Match coordinator: routes player actions to the engine for the
//! room's mode, commits resulting state, and owns the idempotent
//! stake-deduction and prize-credit paths.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::domain::cards::{Card, CardId};
use crate::domain::engine::EngineRegistry;
use crate::domain::state::{PlayerId, Room, RoomId, RoomStatus};
use crate::errors::domain::{DomainError, ExternalKind, PreconditionKind};
use crate::services::balance::BalanceService;
use crate::services::rooms::RoomRegistry;

#[derive(Debug, Clone)]
pub enum GameAction {
    PlayCard { card_id: CardId },
    CallTrut,
    RespondToChallenge { accept: bool },
    CallBrelan { card_ids: Vec<CardId> },
    StartFortial,
}

/// Result of a committed action, cloned out of the room lock for
/// broadcasting and orchestration.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub room: Room,
    pub new_round_started: bool,
    pub game_ended: bool,
    /// Set for card plays; the committed card for broadcasting.
    pub played_card: Option<Card>,
}

pub struct MatchCoordinator {
    rooms: Arc<RoomRegistry>,
    engines: EngineRegistry,
    balances: Arc<dyn BalanceService>,
    staked_rooms: Mutex<HashSet<RoomId>>,
    rewarded_rooms: Mutex<HashSet<RoomId>>,
}

impl MatchCoordinator {
    pub fn new(rooms: Arc<RoomRegistry>, balances: Arc<dyn BalanceService>) -> Self {
        Self {
            rooms,
            engines: EngineRegistry::new(),
            balances,
            staked_rooms: Mutex::new(HashSet::new()),
            rewarded_rooms: Mutex::new(HashSet::new()),
        }
    }

    /// Apply a player action. The whole read-transform-commit happens
    /// under the room's guard, so actions on one room never interleave.
    pub fn apply_action(
        &self,
        room_id: RoomId,
        actor: PlayerId,
        action: GameAction,
    ) -> Result<ActionOutcome, DomainError> {
        let outcome = self.rooms.with_room_mut(room_id, |room| {
            if room.status != RoomStatus::Playing {
                return Err(DomainError::precondition(
                    PreconditionKind::GameNotInProgress,
                    "the game is not running",
                ));
            }
            room.require_seat(actor)?;
            let state = room.require_state()?;
            let engine = self.engines.engine(room.mode)?;

            let played_card = match &action {
                GameAction::PlayCard { card_id } => {
                    state.require_card_in_hand(actor, *card_id).ok()
                }
                _ => None,
            };

            let next = match &action {
                GameAction::PlayCard { card_id } => engine.play_card(state, actor, *card_id)?,
                GameAction::CallTrut => engine.call_trut(state, actor)?,
                GameAction::RespondToChallenge { accept } => {
                    engine.respond_to_challenge(state, actor, *accept)?
                }
                GameAction::CallBrelan { card_ids } => {
                    engine.call_brelan(state, actor, card_ids)?
                }
                GameAction::StartFortial => engine.start_fortial(state, actor)?,
            };

            let new_round_started = next.new_round_started;
            let game_ended = next.game_ended;
            room.state = Some(next);
            if game_ended {
                room.status = RoomStatus::Finished;
            }
            Ok(ActionOutcome {
                room: room.clone(),
                new_round_started,
                game_ended,
                played_card,
            })
        })?;

        if outcome.game_ended {
            info!(room_id = %room_id, winner = ?outcome.room.state.as_ref().and_then(|s| s.winner), "game ended");
        }
        Ok(outcome)
    }

    /// Start a room's game, deducting the stake from every human seat
    /// first. Verification runs over all seats before any debit, so a
    /// single unfunded seat aborts the start with nothing deducted.
    pub async fn start_room(&self, room_id: RoomId) -> Result<ActionOutcome, DomainError> {
        let room = self.rooms.get(room_id).ok_or_else(|| {
            DomainError::precondition(
                PreconditionKind::RoomNotFound,
                format!("room {room_id} does not exist"),
            )
        })?;
        if room.status != RoomStatus::Waiting {
            return Err(DomainError::precondition(
                PreconditionKind::GameInProgress,
                "the game has already started",
            ));
        }

        let newly_claimed = self.staked_rooms.lock().insert(room_id);
        if !newly_claimed {
            return Err(DomainError::precondition(
                PreconditionKind::GameInProgress,
                "room start is already in flight",
            ));
        }

        match self.deduct_stakes(&room).await {
            Ok(()) => {}
            Err(err) => {
                // Nothing was debited yet; allow a later retry.
                self.staked_rooms.lock().remove(&room_id);
                return Err(err);
            }
        }

        let start = self.rooms.with_room_mut(room_id, |room| {
            if room.status != RoomStatus::Waiting {
                return Err(DomainError::precondition(
                    PreconditionKind::GameInProgress,
                    "the game has already started",
                ));
            }
            let engine = self.engines.engine(room.mode)?;
            let state = engine.start_game(room)?;
            for seat in room.seats.iter_mut() {
                if let Some(team) = state.teams.get(&seat.id) {
                    seat.team = Some(*team);
                }
            }
            room.state = Some(state);
            room.status = RoomStatus::Playing;
            Ok(ActionOutcome {
                room: room.clone(),
                new_round_started: false,
                game_ended: false,
                played_card: None,
            })
        });

        match start {
            Ok(outcome) => {
                info!(room_id = %room_id, mode = ?outcome.room.mode, "game started");
                Ok(outcome)
            }
            Err(err) => {
                warn!(room_id = %room_id, error = %err, "game start failed after stake deduction, refunding");
                self.refund_stakes(&room).await;
                self.staked_rooms.lock().remove(&room_id);
                Err(err)
            }
        }
    }

    /// All-or-nothing stake collection: every human seat is verified
    /// for identity and funds before the first debit.
    async fn deduct_stakes(&self, room: &Room) -> Result<(), DomainError> {
        if room.stake_amount <= 0 {
            return Ok(());
        }

        let mut emails = Vec::new();
        for seat in room.seats.iter().filter(|p| !p.is_bot) {
            let email = seat.email.clone().ok_or_else(|| {
                DomainError::external(
                    ExternalKind::IdentityUnresolved,
                    format!("seat {} has no resolved identity", seat.id),
                )
            })?;
            let balance = self.balances.get_balance(&email).await?;
            if balance < room.stake_amount {
                return Err(DomainError::external(
                    ExternalKind::InsufficientFunds,
                    format!("seat {} cannot cover the stake", seat.id),
                ));
            }
            emails.push(email);
        }

        for email in &emails {
            if let Err(err) = self.balances.debit(email, room.stake_amount).await {
                // A seat failed between verification and debit. Abort
                // and restore the seats already charged.
                error!(room_id = %room.id, error = %err, "stake debit failed mid-room");
                self.refund_stakes(room).await;
                return Err(err);
            }
        }
        info!(room_id = %room.id, stake = room.stake_amount, seats = emails.len(), "stakes deducted");
        Ok(())
    }

    async fn refund_stakes(&self, room: &Room) {
        for seat in room.seats.iter().filter(|p| !p.is_bot) {
            if let Some(email) = &seat.email {
                if let Err(err) = self.balances.credit(email, room.stake_amount).await {
                    error!(room_id = %room.id, seat = %seat.id, error = %err, "stake refund failed");
                }
            }
        }
    }

    /// Credit the prize pool to the winning seats, at most once per
    /// room. The pool is the stake times the seat count, split evenly
    /// across the winners; bot shares are not paid out.
    pub async fn settle_room(&self, room_id: RoomId) -> Result<(), DomainError> {
        let room = self.rooms.get(room_id).ok_or_else(|| {
            DomainError::precondition(
                PreconditionKind::RoomNotFound,
                format!("room {room_id} does not exist"),
            )
        })?;
        let winner = room
            .state
            .as_ref()
            .and_then(|s| s.winner)
            .ok_or_else(|| {
                DomainError::precondition(
                    PreconditionKind::GameNotInProgress,
                    "room has no decided winner",
                )
            })?;

        if room.stake_amount <= 0 {
            return Ok(());
        }
        if !self.rewarded_rooms.lock().insert(room_id) {
            return Ok(());
        }

        let winners: Vec<_> = room
            .seats
            .iter()
            .filter(|p| p.team == Some(winner))
            .collect();
        if winners.is_empty() {
            // Fail closed: log and pay nobody rather than guess.
            error!(room_id = %room_id, "winning team has no seats, skipping payout");
            return Ok(());
        }

        let pool = room.stake_amount * room.seats.len() as i64;
        let share = pool / winners.len() as i64;
        for seat in winners {
            if seat.is_bot {
                continue;
            }
            let Some(email) = &seat.email else {
                error!(room_id = %room_id, seat = %seat.id, "winner has no identity, skipping payout");
                continue;
            };
            if let Err(err) = self.balances.credit(email, share).await {
                error!(room_id = %room_id, seat = %seat.id, error = %err, "prize credit failed");
            }
        }
        info!(room_id = %room_id, winner = ?winner, pool, "prizes credited");
        Ok(())
    }

}
