//! Shared application state wired once at startup.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::AppConfig;
use crate::domain::snapshot::room_snapshot_for;
use crate::domain::state::{BotProfile, GameMode, Player, Room, RoomId, Team, TeamMode};
use crate::errors::domain::DomainError;
use crate::live::LiveOrchestrator;
use crate::services::balance::{
    BalanceService, IdentityService, InMemoryLedger, StaticIdentityService,
};
use crate::services::coordinator::MatchCoordinator;
use crate::services::matchmaking::{MatchGroup, MatchRequest, MatchmakingQueue};
use crate::services::rooms::RoomRegistry;
use crate::ws::hub::Hub;
use crate::ws::protocol::ServerMsg;

pub struct AppState {
    pub config: AppConfig,
    pub rooms: Arc<RoomRegistry>,
    pub queue: Arc<MatchmakingQueue>,
    pub coordinator: Arc<MatchCoordinator>,
    pub hub: Arc<Hub>,
    pub orchestrator: Arc<LiveOrchestrator>,
    pub identity: Arc<dyn IdentityService>,
    pub balances: Arc<dyn BalanceService>,
}

impl AppState {
    /// Wire the default stack: in-memory ledger and token-derived
    /// identities stand in for the external account service.
    pub fn build(config: AppConfig) -> Self {
        let ledger = Arc::new(InMemoryLedger::new());
        Self::build_with(
            config,
            Arc::new(StaticIdentityService),
            ledger,
        )
    }

    pub fn build_with(
        config: AppConfig,
        identity: Arc<dyn IdentityService>,
        balances: Arc<dyn BalanceService>,
    ) -> Self {
        let rooms = Arc::new(RoomRegistry::new());
        let queue = Arc::new(MatchmakingQueue::new(config.matchmaking_fill_timeout));
        let hub = Arc::new(Hub::new());
        let coordinator = Arc::new(MatchCoordinator::new(rooms.clone(), balances.clone()));
        let orchestrator = Arc::new(LiveOrchestrator::new(
            rooms.clone(),
            coordinator.clone(),
            hub.clone(),
            config.clone(),
        ));
        Self {
            config,
            rooms,
            queue,
            coordinator,
            hub,
            orchestrator,
            identity,
            balances,
        }
    }

    /// Turn a formed matchmaking group into a seated room and start it.
    pub async fn launch_match_group(&self, group: MatchGroup) {
        match group {
            MatchGroup::Bot(request) => {
                let stake = request.stake_amount;
                let profile = request.bot_profile;
                let mut host = request_player(&request);
                host.ready = true;
                let room = self
                    .rooms
                    .create_room(host, GameMode::BotOneVsOne, stake, None, profile);
                self.announce_match(&room);
                self.start_room_and_announce(room.id).await;
            }
            MatchGroup::Solo(requests) => {
                let stake = requests
                    .first()
                    .map(|r| r.stake_amount)
                    .unwrap_or(self.config.default_stake);
                let mut seats: Vec<Player> = requests.iter().map(|r| {
                    let mut p = request_player(r);
                    p.ready = true;
                    p
                }).collect();
                while seats.len() < 4 {
                    seats.push(Player::bot("Bot", BotProfile::Normal));
                }
                self.launch_room(seats, stake, Some(TeamMode::Solo)).await;
            }
            MatchGroup::Teams { team1, team2 } => {
                let stake = team1
                    .first()
                    .map(|r| r.stake_amount)
                    .unwrap_or(self.config.default_stake);
                // Interleave the pairs so turn order alternates teams.
                let mut seats = Vec::with_capacity(4);
                for i in 0..2 {
                    if let Some(request) = team1.get(i) {
                        let mut p = request_player(request);
                        p.team = Some(Team::Team1);
                        p.ready = true;
                        seats.push(p);
                    }
                    if let Some(request) = team2.get(i) {
                        let mut p = request_player(request);
                        p.team = Some(Team::Team2);
                        p.ready = true;
                        seats.push(p);
                    }
                }
                self.launch_room(seats, stake, Some(TeamMode::Preformed)).await;
            }
        }
    }

    async fn launch_room(&self, seats: Vec<Player>, stake: i64, team_mode: Option<TeamMode>) {
        match self
            .rooms
            .create_room_with_seats(seats, GameMode::TwoVsTwo, stake, team_mode)
        {
            Ok(room) => {
                self.announce_match(&room);
                self.start_room_and_announce(room.id).await;
            }
            Err(err) => error!(error = %err, "matched group could not be seated"),
        }
    }

    fn announce_match(&self, room: &Room) {
        self.hub.broadcast_room(room, |viewer, room| ServerMsg::MatchFound {
            room: room_snapshot_for(room, viewer),
            message: "Match found".to_string(),
        });
    }

    /// Start a room, broadcasting either the opening state or the
    /// failure reason to every human seat.
    pub async fn start_room_and_announce(&self, room_id: RoomId) {
        match self.coordinator.start_room(room_id).await {
            Ok(outcome) => {
                self.hub
                    .broadcast_room(&outcome.room, |viewer, room| ServerMsg::GameStarted {
                        room: room_snapshot_for(room, viewer),
                        message: "Game on".to_string(),
                    });
                info!(room_id = %room_id, "room started and announced");
                self.orchestrator.arm(room_id);
            }
            Err(err) => {
                let code = match &err {
                    DomainError::External(kind, _) => kind.reason_code().to_string(),
                    _ => "start_failed".to_string(),
                };
                error!(room_id = %room_id, error = %err, "room start aborted");
                if let Some(room) = self.rooms.get(room_id) {
                    self.hub.broadcast_room(&room, |_viewer, _room| ServerMsg::Error {
                        code: code.clone(),
                        message: "The game could not be started".to_string(),
                    });
                }
            }
        }
    }
}

fn request_player(request: &MatchRequest) -> Player {
    let mut player = Player::human(request.player_id, request.display_name.clone());
    player.email = request.email.clone();
    player
}
