//! Per-connection websocket actor.

use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::web;
use actix_web_actors::ws;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::snapshot::room_snapshot_for;
use crate::domain::state::{GameMode, Player, PlayerId};
use crate::errors::domain::DomainError;
use crate::services::coordinator::GameAction;
use crate::services::matchmaking::MatchRequest;
use crate::services::rooms::LeaveOutcome;
use crate::state::AppState;
use crate::ws::hub::Outbound;
use crate::ws::protocol::{ClientMsg, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub struct WsSession {
    player_id: PlayerId,
    email: Option<String>,
    state: web::Data<AppState>,
    hb: Instant,
}

impl WsSession {
    pub fn new(state: web::Data<AppState>, email: Option<String>) -> Self {
        Self {
            player_id: Uuid::new_v4(),
            email,
            state,
            hb: Instant::now(),
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                info!(player_id = %act.player_id, "client heartbeat timed out");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send(&self, msg: &ServerMsg) {
        self.state.hub.send_to(self.player_id, msg);
    }

    fn send_error(&self, err: &DomainError) {
        let code = match err {
            DomainError::Validation(_, _) => "invalid_action".to_string(),
            DomainError::Precondition(_, _) => "precondition_failed".to_string(),
            DomainError::External(kind, _) => kind.reason_code().to_string(),
            DomainError::Internal(_) => "internal".to_string(),
        };
        self.send(&ServerMsg::Error {
            code,
            message: err.to_string(),
        });
    }

    fn dispatch(&mut self, msg: ClientMsg, ctx: &mut ws::WebsocketContext<Self>) {
        match msg {
            ClientMsg::StartMatchmaking {
                mode,
                display_name,
                stake_amount,
                teammate_id,
                bot_profile,
            } => {
                let mut request = MatchRequest::solo(
                    self.player_id,
                    display_name,
                    mode,
                    stake_amount.unwrap_or(self.state.config.default_stake),
                );
                request.email = self.email.clone();
                request.teammate_id = teammate_id;
                request.bot_profile = bot_profile;

                match self.state.queue.enqueue(request) {
                    Some(group) => {
                        let state = self.state.clone();
                        ctx.spawn(
                            async move { state.launch_match_group(group).await }.into_actor(self),
                        );
                    }
                    None => self.send(&ServerMsg::Queued {
                        message: "Waiting for opponents".to_string(),
                    }),
                }
            }
            ClientMsg::CancelMatchmaking => {
                self.state.queue.cancel(self.player_id);
                self.send(&ServerMsg::Queued {
                    message: "Left the queue".to_string(),
                });
            }
            ClientMsg::CreateRoom {
                mode,
                display_name,
                stake_amount,
                team_mode,
                bot_profile,
            } => {
                let mut host = Player::human(self.player_id, display_name);
                host.email = self.email.clone();
                let room = self.state.rooms.create_room(
                    host,
                    mode,
                    stake_amount.unwrap_or(self.state.config.default_stake),
                    team_mode,
                    bot_profile,
                );
                self.send(&ServerMsg::RoomUpdate {
                    room: room_snapshot_for(&room, self.player_id),
                    message: "Room created".to_string(),
                });
                if mode == GameMode::BotOneVsOne {
                    let state = self.state.clone();
                    let room_id = room.id;
                    ctx.spawn(
                        async move { state.start_room_and_announce(room_id).await }
                            .into_actor(self),
                    );
                }
            }
            ClientMsg::JoinRoom {
                room_id,
                display_name,
                team,
            } => {
                let mut player = Player::human(self.player_id, display_name);
                player.email = self.email.clone();
                match self.state.rooms.join(room_id, player, team) {
                    Ok(room) => self.state.hub.broadcast_update(&room, "A player joined"),
                    Err(err) => self.send_error(&err),
                }
            }
            ClientMsg::SetReady { ready } => match self.state.rooms.set_ready(self.player_id, ready) {
                Ok(room) => {
                    self.state.hub.broadcast_update(&room, "Ready state changed");
                    let everyone_ready = room.is_full() && room.seats.iter().all(|p| p.ready);
                    if everyone_ready {
                        let state = self.state.clone();
                        let room_id = room.id;
                        ctx.spawn(
                            async move { state.start_room_and_announce(room_id).await }
                                .into_actor(self),
                        );
                    }
                }
                Err(err) => self.send_error(&err),
            },
            ClientMsg::PlayCard { card_id } => {
                self.apply(GameAction::PlayCard { card_id }, ctx);
            }
            ClientMsg::CallTrut => self.apply(GameAction::CallTrut, ctx),
            ClientMsg::RespondToChallenge { accept } => {
                self.apply(GameAction::RespondToChallenge { accept }, ctx);
            }
            ClientMsg::CallBrelan { card_ids } => {
                self.apply(GameAction::CallBrelan { card_ids }, ctx);
            }
            ClientMsg::StartFortial => self.apply(GameAction::StartFortial, ctx),
            ClientMsg::Chat { message } => {
                let room = self
                    .state
                    .rooms
                    .room_of(self.player_id)
                    .and_then(|room_id| self.state.rooms.get(room_id));
                let Some(room) = room else {
                    self.send(&ServerMsg::Error {
                        code: "not_in_room".to_string(),
                        message: "You are not in a room".to_string(),
                    });
                    return;
                };
                let display_name = room
                    .seat(self.player_id)
                    .map(|p| p.display_name.clone())
                    .unwrap_or_default();
                let chat = ServerMsg::Chat {
                    player_id: self.player_id,
                    display_name,
                    message,
                };
                for seat in room.seats.iter().filter(|p| !p.is_bot) {
                    self.state.hub.send_to(seat.id, &chat);
                }
            }
            ClientMsg::LeaveRoom => {
                self.state.queue.cancel(self.player_id);
                match self.state.rooms.leave(self.player_id) {
                    Some(LeaveOutcome::Closed(room)) => {
                        self.state.orchestrator.disarm(room.id);
                        for seat in room.seats.iter().filter(|p| !p.is_bot) {
                            self.state.hub.send_to(
                                seat.id,
                                &ServerMsg::RoomClosed {
                                    message: "The room was closed".to_string(),
                                },
                            );
                        }
                    }
                    Some(LeaveOutcome::Left { room, .. }) => {
                        self.state.hub.broadcast_update(&room, "A player left");
                    }
                    None => {}
                }
            }
            ClientMsg::GetRoomInfo => {
                let room = self
                    .state
                    .rooms
                    .room_of(self.player_id)
                    .and_then(|room_id| self.state.rooms.get(room_id));
                match room {
                    Some(room) => self.send(&ServerMsg::RoomUpdate {
                        room: room_snapshot_for(&room, self.player_id),
                        message: "Room state".to_string(),
                    }),
                    None => self.send(&ServerMsg::Error {
                        code: "not_in_room".to_string(),
                        message: "You are not in a room".to_string(),
                    }),
                }
            }
        }
    }

    /// Route a game action through the coordinator and hand the
    /// committed outcome to the orchestrator for publication.
    fn apply(&mut self, action: GameAction, ctx: &mut ws::WebsocketContext<Self>) {
        let room_id = match self.state.rooms.room_of(self.player_id) {
            Some(room_id) => room_id,
            None => {
                self.send(&ServerMsg::Error {
                    code: "not_in_room".to_string(),
                    message: "You are not in a room".to_string(),
                });
                return;
            }
        };

        let actor = self.player_id;
        match self.state.coordinator.apply_action(room_id, actor, action.clone()) {
            Ok(outcome) => {
                let state = self.state.clone();
                ctx.spawn(
                    async move {
                        let orchestrator = &state.orchestrator;
                        match (&action, outcome.played_card.clone()) {
                            (GameAction::PlayCard { .. }, Some(card)) => {
                                orchestrator.publish_card_played(outcome, actor, card).await;
                            }
                            (GameAction::CallTrut, _) | (GameAction::CallBrelan { .. }, _) => {
                                orchestrator.publish_trut_called(outcome, actor).await;
                            }
                            (GameAction::RespondToChallenge { accept }, _) => {
                                orchestrator
                                    .publish_challenge_answered(outcome, actor, *accept)
                                    .await;
                            }
                            (GameAction::StartFortial, _) => {
                                orchestrator
                                    .publish_room_update(outcome, "Fortial phase begins")
                                    .await;
                            }
                            _ => {
                                orchestrator.publish_room_update(outcome, "State updated").await;
                            }
                        }
                    }
                    .into_actor(self),
                );
            }
            Err(err) => self.send_error(&err),
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);
        self.state
            .hub
            .register(self.player_id, ctx.address().recipient());
        debug!(player_id = %self.player_id, authenticated = self.email.is_some(), "session opened");
    }

    fn stopping(&mut self, _ctx: &mut Self::Context) -> Running {
        self.state.hub.unregister(self.player_id);
        self.state.queue.cancel(self.player_id);
        if let Some(room) = self.state.rooms.disconnect(self.player_id) {
            self.state
                .hub
                .broadcast_update(&room, "A player disconnected");
        }
        debug!(player_id = %self.player_id, "session closed");
        Running::Stop
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(bytes)) => {
                self.hb = Instant::now();
                ctx.pong(&bytes);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.hb = Instant::now();
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => self.dispatch(msg, ctx),
                    Err(err) => {
                        warn!(player_id = %self.player_id, error = %err, "unparsable client message");
                        self.send(&ServerMsg::Error {
                            code: "bad_message".to_string(),
                            message: "Message could not be parsed".to_string(),
                        });
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.send(&ServerMsg::Error {
                    code: "bad_message".to_string(),
                    message: "Binary frames are not supported".to_string(),
                });
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => {}
            Err(err) => {
                warn!(player_id = %self.player_id, error = %err, "websocket protocol error");
                ctx.stop();
            }
        }
    }
}
