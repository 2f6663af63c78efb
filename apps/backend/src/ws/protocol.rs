//! Wire protocol for the player websocket.

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, CardId};
use crate::domain::snapshot::RoomSnapshot;
use crate::domain::state::{BotProfile, GameMode, PlayerId, RoomId, Team, TeamMode};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    StartMatchmaking {
        mode: GameMode,
        display_name: String,
        #[serde(default)]
        stake_amount: Option<i64>,
        #[serde(default)]
        teammate_id: Option<PlayerId>,
        #[serde(default)]
        bot_profile: Option<BotProfile>,
    },
    CancelMatchmaking,
    CreateRoom {
        mode: GameMode,
        display_name: String,
        #[serde(default)]
        stake_amount: Option<i64>,
        #[serde(default)]
        team_mode: Option<TeamMode>,
        #[serde(default)]
        bot_profile: Option<BotProfile>,
    },
    JoinRoom {
        room_id: RoomId,
        display_name: String,
        #[serde(default)]
        team: Option<Team>,
    },
    SetReady {
        ready: bool,
    },
    PlayCard {
        card_id: CardId,
    },
    CallTrut,
    RespondToChallenge {
        accept: bool,
    },
    CallBrelan {
        card_ids: Vec<CardId>,
    },
    StartFortial,
    Chat {
        message: String,
    },
    LeaveRoom,
    GetRoomInfo,
}

/// Outbound events. Every variant carries a human-readable message,
/// and any embedded room view is already redacted for its recipient.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    Queued {
        message: String,
    },
    MatchFound {
        room: RoomSnapshot,
        message: String,
    },
    RoomUpdate {
        room: RoomSnapshot,
        message: String,
    },
    GameStarted {
        room: RoomSnapshot,
        message: String,
    },
    CardPlayed {
        player_id: PlayerId,
        card: Card,
        /// True while the card is only shown, not yet committed.
        preview: bool,
        room: RoomSnapshot,
        message: String,
    },
    TrutCalled {
        truting_player: PlayerId,
        respondent: Option<PlayerId>,
        room: RoomSnapshot,
        message: String,
    },
    ChallengeAnswered {
        player_id: PlayerId,
        accept: bool,
        room: RoomSnapshot,
        message: String,
    },
    NewRound {
        room: RoomSnapshot,
        message: String,
    },
    GameEnded {
        room: RoomSnapshot,
        winner: Option<Team>,
        message: String,
    },
    Chat {
        player_id: PlayerId,
        display_name: String,
        message: String,
    },
    RoomClosed {
        message: String,
    },
    Error {
        code: String,
        message: String,
    },
}
