//! Drives bot turns and the visual sequencing around committed
//! transitions.
//!
//! Every scheduled task captures the room id plus a turn fingerprint
//! and re-validates against the live state when it fires; a task whose
//! state has moved on simply does nothing. That staleness check is the
//! only concurrency guard across the delays, and it runs at both the
//! preview stage and the commit stage.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::ai::BotStrategy;
use crate::config::AppConfig;
use crate::domain::cards::Card;
use crate::domain::snapshot::room_snapshot_for;
use crate::domain::state::{BotProfile, Phase, PlayedCard, PlayerId, RoomId};
use crate::services::coordinator::{ActionOutcome, GameAction, MatchCoordinator};
use crate::services::rooms::RoomRegistry;
use crate::ws::hub::Hub;
use crate::ws::protocol::ServerMsg;

pub struct LiveOrchestrator {
    rooms: Arc<RoomRegistry>,
    coordinator: Arc<MatchCoordinator>,
    hub: Arc<Hub>,
    config: AppConfig,
    /// Turn fingerprints of the currently armed bot-play chains; keyed
    /// by room so at most one chain is live per room.
    armed_plays: DashMap<RoomId, u32>,
    armed_responses: DashMap<RoomId, u32>,
}

impl LiveOrchestrator {
    pub fn new(
        rooms: Arc<RoomRegistry>,
        coordinator: Arc<MatchCoordinator>,
        hub: Arc<Hub>,
        config: AppConfig,
    ) -> Self {
        Self {
            rooms,
            coordinator,
            hub,
            config,
            armed_plays: DashMap::new(),
            armed_responses: DashMap::new(),
        }
    }

    /// Look at the authoritative state and schedule whatever automated
    /// action it calls for. Safe to call after every transition.
    pub fn arm(self: &Arc<Self>, room_id: RoomId) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };
        let Some(state) = room.state.as_ref() else {
            return;
        };
        if state.game_ended {
            return;
        }

        match state.phase {
            Phase::Playing => {
                let is_bot_turn = room
                    .seats
                    .iter()
                    .any(|p| p.is_bot && p.id == state.current_player);
                if is_bot_turn {
                    self.schedule_bot_play(room_id, state.current_player, state.turn_counter);
                }
            }
            Phase::Truting => {
                let Some(respondent) = state.challenge.respondent else {
                    return;
                };
                let bot = room
                    .seats
                    .iter()
                    .find(|p| p.is_bot && p.id == respondent);
                if let Some(bot) = bot {
                    let profile = bot.bot_profile.unwrap_or(BotProfile::Normal);
                    self.schedule_bot_response(room_id, respondent, profile, state.turn_counter);
                }
            }
            Phase::Scoring => {}
        }
    }

    /// Two-stage bot card play: a preview broadcast after a short
    /// delay, then the committing play through the coordinator.
    fn schedule_bot_play(self: &Arc<Self>, room_id: RoomId, bot_id: PlayerId, fingerprint: u32) {
        if self.armed_plays.insert(room_id, fingerprint) == Some(fingerprint) {
            return;
        }
        debug!(room_id = %room_id, bot_id = %bot_id, fingerprint, "bot play armed");

        let this = Arc::clone(self);
        tokio::spawn(async move {
            sleep(this.config.bot_preview_delay).await;

            let card = {
                let Some(room) = this.rooms.get(room_id) else {
                    return;
                };
                let Some(state) = room.state.as_ref() else {
                    return;
                };
                if !this.still_bots_turn(state, bot_id, fingerprint) {
                    return;
                }
                let Some(card) = BotStrategy::choose_card(state, bot_id) else {
                    return;
                };

                // Preview: the card appears on the table and the hand
                // count drops, but nothing is committed yet.
                let mut preview = room.clone();
                if let Some(preview_state) = preview.state.as_mut() {
                    if let Some(hand) = preview_state.hands.get_mut(&bot_id) {
                        hand.retain(|c| c.id != card.id);
                    }
                    preview_state.current_trick.push(PlayedCard {
                        player_id: bot_id,
                        card: card.clone(),
                    });
                }
                this.hub.broadcast_room(&preview, |viewer, room| ServerMsg::CardPlayed {
                    player_id: bot_id,
                    card: card.clone(),
                    preview: true,
                    room: room_snapshot_for(room, viewer),
                    message: "Bot is playing a card".to_string(),
                });
                card
            };

            sleep(this.config.bot_commit_delay).await;

            {
                let Some(room) = this.rooms.get(room_id) else {
                    return;
                };
                let Some(state) = room.state.as_ref() else {
                    return;
                };
                if !this.still_bots_turn(state, bot_id, fingerprint) {
                    return;
                }
            }

            match this.coordinator.apply_action(
                room_id,
                bot_id,
                GameAction::PlayCard { card_id: card.id },
            ) {
                Ok(outcome) => {
                    this.publish_card_played(outcome, bot_id, card).await;
                }
                Err(err) => {
                    // Bots never surface errors; the next transition
                    // re-arms the room.
                    debug!(room_id = %room_id, error = %err, "bot play did not apply");
                }
            }
        });
    }

    fn still_bots_turn(
        &self,
        state: &crate::domain::state::MatchState,
        bot_id: PlayerId,
        fingerprint: u32,
    ) -> bool {
        !state.game_ended
            && state.phase == Phase::Playing
            && state.current_player == bot_id
            && state.turn_counter == fingerprint
    }

    /// Bot challenge response after a thinking delay. The strategy
    /// decision is computed when the timer fires, against live state.
    fn schedule_bot_response(
        self: &Arc<Self>,
        room_id: RoomId,
        bot_id: PlayerId,
        profile: BotProfile,
        fingerprint: u32,
    ) {
        if self.armed_responses.insert(room_id, fingerprint) == Some(fingerprint) {
            return;
        }
        debug!(room_id = %room_id, bot_id = %bot_id, "bot challenge response armed");

        let this = Arc::clone(self);
        tokio::spawn(async move {
            sleep(this.config.bot_think_delay).await;

            let accept = {
                let Some(room) = this.rooms.get(room_id) else {
                    return;
                };
                let Some(state) = room.state.as_ref() else {
                    return;
                };
                if state.game_ended
                    || state.phase != Phase::Truting
                    || state.challenge.respondent != Some(bot_id)
                {
                    return;
                }
                BotStrategy::should_accept_challenge(state, bot_id, profile, &mut rand::rng())
            };

            match this.coordinator.apply_action(
                room_id,
                bot_id,
                GameAction::RespondToChallenge { accept },
            ) {
                Ok(outcome) => {
                    info!(room_id = %room_id, accept, "bot answered trut challenge");
                    this.publish_challenge_answered(outcome, bot_id, accept).await;
                }
                Err(err) => {
                    debug!(room_id = %room_id, error = %err, "bot challenge response did not apply");
                }
            }
        });
    }

    pub async fn publish_card_played(
        self: &Arc<Self>,
        outcome: ActionOutcome,
        actor: PlayerId,
        card: Card,
    ) {
        self.hub
            .broadcast_room(&outcome.room, |viewer, room| ServerMsg::CardPlayed {
                player_id: actor,
                card: card.clone(),
                preview: false,
                room: room_snapshot_for(room, viewer),
                message: "Card played".to_string(),
            });
        self.after_transition(outcome).await;
    }

    pub async fn publish_trut_called(self: &Arc<Self>, outcome: ActionOutcome, actor: PlayerId) {
        let respondent = outcome
            .room
            .state
            .as_ref()
            .and_then(|s| s.challenge.respondent);
        self.hub
            .broadcast_room(&outcome.room, |viewer, room| ServerMsg::TrutCalled {
                truting_player: actor,
                respondent,
                room: room_snapshot_for(room, viewer),
                message: "Trut!".to_string(),
            });
        self.after_transition(outcome).await;
    }

    pub async fn publish_challenge_answered(
        self: &Arc<Self>,
        outcome: ActionOutcome,
        actor: PlayerId,
        accept: bool,
    ) {
        let message = if accept {
            "Challenge accepted, playing for a trut"
        } else {
            "Challenge folded"
        };
        self.hub
            .broadcast_room(&outcome.room, |viewer, room| ServerMsg::ChallengeAnswered {
                player_id: actor,
                accept,
                room: room_snapshot_for(room, viewer),
                message: message.to_string(),
            });
        self.after_transition(outcome).await;
    }

    pub async fn publish_room_update(self: &Arc<Self>, outcome: ActionOutcome, message: &str) {
        self.hub.broadcast_update(&outcome.room, message);
        self.after_transition(outcome).await;
    }

    /// Common tail of every committed transition: settle and announce a
    /// finished game, reveal a fresh round after a beat, and re-arm for
    /// whatever the new state demands.
    pub async fn after_transition(self: &Arc<Self>, outcome: ActionOutcome) {
        let room_id = outcome.room.id;

        if outcome.game_ended {
            if let Err(err) = self.coordinator.settle_room(room_id).await {
                error!(room_id = %room_id, error = %err, "prize settlement failed");
            }
            let winner = outcome.room.state.as_ref().and_then(|s| s.winner);
            self.hub
                .broadcast_room(&outcome.room, |viewer, room| ServerMsg::GameEnded {
                    room: room_snapshot_for(room, viewer),
                    winner,
                    message: "Game finished!".to_string(),
                });
            self.armed_plays.remove(&room_id);
            self.armed_responses.remove(&room_id);
            return;
        }

        if outcome.new_round_started {
            let this = Arc::clone(self);
            tokio::spawn(async move {
                sleep(this.config.round_reveal_delay).await;
                if let Some(room) = this.rooms.get(room_id) {
                    this.hub
                        .broadcast_room(&room, |viewer, room| ServerMsg::NewRound {
                            room: room_snapshot_for(room, viewer),
                            message: "New round dealt".to_string(),
                        });
                    this.arm(room_id);
                }
            });
            return;
        }

        self.arm(room_id);
    }

    pub fn disarm(&self, room_id: RoomId) {
        self.armed_plays.remove(&room_id);
        self.armed_responses.remove(&room_id);
    }
}
