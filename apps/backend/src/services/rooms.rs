//! Room lifecycle: creation, seating, leaving and disconnects.
//!
//! The registry is the single owner of room data. Mutations go through
//! the per-key dashmap guard, which serializes concurrent access to a
//! room; callers must not hold a guard across an await point.

use dashmap::DashMap;
use serde::Serialize;
use tracing::info;

use crate::domain::state::{
    BotProfile, GameMode, Player, PlayerId, Room, RoomId, RoomStatus, Team, TeamMode,
};
use crate::errors::domain::{DomainError, PreconditionKind};

#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub mode: GameMode,
    pub status: RoomStatus,
    pub seat_count: usize,
    pub age_seconds: u64,
}

#[derive(Debug, Clone)]
pub enum LeaveOutcome {
    /// The room closed: the host left or no seats remain.
    Closed(Room),
    /// The player left an open room; host may have been handed over.
    Left { room: Room, new_host: Option<PlayerId> },
}

#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Room>,
    player_rooms: DashMap<PlayerId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room seated by its host. Bot rooms synthesize the bot
    /// opponent immediately and mark both seats ready, so the mode
    /// never needs a join step.
    pub fn create_room(
        &self,
        host: Player,
        mode: GameMode,
        stake_amount: i64,
        team_mode: Option<TeamMode>,
        bot_profile: Option<BotProfile>,
    ) -> Room {
        let mut room = Room::new(host, mode, stake_amount);
        room.team_mode = team_mode;

        if mode == GameMode::BotOneVsOne {
            let profile = bot_profile.unwrap_or(BotProfile::Normal);
            room.seats[0].ready = true;
            room.seats.push(Player::bot(bot_display_name(profile), profile));
        }

        for seat in &room.seats {
            if !seat.is_bot {
                self.player_rooms.insert(seat.id, room.id);
            }
        }
        info!(room_id = %room.id, mode = ?mode, "room created");
        self.rooms.insert(room.id, room.clone());
        room
    }

    /// Create a room already seated by a matched group.
    pub fn create_room_with_seats(
        &self,
        seats: Vec<Player>,
        mode: GameMode,
        stake_amount: i64,
        team_mode: Option<TeamMode>,
    ) -> Result<Room, DomainError> {
        let host = seats.first().cloned().ok_or_else(|| {
            DomainError::precondition(PreconditionKind::NotEnoughPlayers, "no seats to room")
        })?;
        let mut room = Room::new(host, mode, stake_amount);
        room.team_mode = team_mode;
        room.seats = seats;

        for seat in &room.seats {
            if !seat.is_bot {
                self.player_rooms.insert(seat.id, room.id);
            }
        }
        info!(room_id = %room.id, mode = ?mode, seats = room.seats.len(), "matched room created");
        self.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    pub fn join(
        &self,
        room_id: RoomId,
        mut player: Player,
        requested_team: Option<Team>,
    ) -> Result<Room, DomainError> {
        let mut room = self.rooms.get_mut(&room_id).ok_or_else(|| {
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
        if room.mode == GameMode::BotOneVsOne {
            return Err(DomainError::precondition(
                PreconditionKind::JoinNotAllowed,
                "bot rooms cannot be joined",
            ));
        }
        if room.is_full() {
            return Err(DomainError::precondition(
                PreconditionKind::RoomFull,
                "all seats are taken",
            ));
        }

        if room.mode == GameMode::TwoVsTwo {
            player.team = Some(pick_team(&room, requested_team));
        }

        self.player_rooms.insert(player.id, room_id);
        room.seats.push(player);
        Ok(room.clone())
    }

    /// Remove a player's seat. Closing conditions: the host leaves or
    /// the room empties. Otherwise the first remaining seat inherits
    /// the host role.
    pub fn leave(&self, player_id: PlayerId) -> Option<LeaveOutcome> {
        let (_, room_id) = self.player_rooms.remove(&player_id)?;

        let close = {
            let mut room = self.rooms.get_mut(&room_id)?;
            room.seats.retain(|p| p.id != player_id);
            let humans_left = room.seats.iter().any(|p| !p.is_bot);
            room.host_id == player_id || !humans_left
        };

        if close {
            let (_, room) = self.rooms.remove(&room_id)?;
            for seat in &room.seats {
                self.player_rooms.remove(&seat.id);
            }
            info!(room_id = %room_id, "room closed");
            Some(LeaveOutcome::Closed(room))
        } else {
            let mut room = self.rooms.get_mut(&room_id)?;
            let new_host = room.seats.first().map(|p| p.id);
            if let Some(host) = new_host {
                room.host_id = host;
            }
            Some(LeaveOutcome::Left {
                room: room.clone(),
                new_host,
            })
        }
    }

    /// A dropped connection keeps the seat; the player stays part of
    /// scoring until an explicit leave.
    pub fn disconnect(&self, player_id: PlayerId) -> Option<Room> {
        let room_id = *self.player_rooms.get(&player_id)?;
        let mut room = self.rooms.get_mut(&room_id)?;
        if let Some(seat) = room.seat_mut(player_id) {
            seat.connected = false;
        }
        Some(room.clone())
    }

    pub fn set_ready(&self, player_id: PlayerId, ready: bool) -> Result<Room, DomainError> {
        let room_id = self.room_of(player_id).ok_or_else(|| {
            DomainError::precondition(PreconditionKind::NotInRoom, "player is not in a room")
        })?;
        let mut room = self.rooms.get_mut(&room_id).ok_or_else(|| {
            DomainError::precondition(PreconditionKind::RoomNotFound, "room vanished")
        })?;
        if let Some(seat) = room.seat_mut(player_id) {
            seat.ready = ready;
        }
        Ok(room.clone())
    }

    pub fn get(&self, room_id: RoomId) -> Option<Room> {
        self.rooms.get(&room_id).map(|r| r.clone())
    }

    pub fn room_of(&self, player_id: PlayerId) -> Option<RoomId> {
        self.player_rooms.get(&player_id).map(|r| *r)
    }

    /// Run a closure under the room's dashmap guard. This is the
    /// serialization point for all match-state mutation.
    pub fn with_room_mut<T>(
        &self,
        room_id: RoomId,
        f: impl FnOnce(&mut Room) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut room = self.rooms.get_mut(&room_id).ok_or_else(|| {
            DomainError::precondition(
                PreconditionKind::RoomNotFound,
                format!("room {room_id} does not exist"),
            )
        })?;
        f(&mut room)
    }

    pub fn remove(&self, room_id: RoomId) -> Option<Room> {
        let (_, room) = self.rooms.remove(&room_id)?;
        for seat in &room.seats {
            self.player_rooms.remove(&seat.id);
        }
        Some(room)
    }

    pub fn summaries(&self) -> Vec<RoomSummary> {
        self.rooms
            .iter()
            .map(|r| RoomSummary {
                room_id: r.id,
                mode: r.mode,
                status: r.status,
                seat_count: r.seats.len(),
                age_seconds: r
                    .created_at
                    .and_then(|t| t.elapsed().ok())
                    .map(|d| d.as_secs())
                    .unwrap_or(0),
            })
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.rooms.len()
    }
}

fn bot_display_name(profile: BotProfile) -> String {
    match profile {
        BotProfile::Easy => "Bot (easy)".to_string(),
        BotProfile::Normal => "Bot".to_string(),
        BotProfile::Hard => "Bot (hard)".to_string(),
    }
}

/// Honor a requested 2v2 team while it has an open slot, otherwise
/// balance towards the smaller side.
fn pick_team(room: &Room, requested: Option<Team>) -> Team {
    let count = |team: Team| {
        room.seats
            .iter()
            .filter(|p| p.team == Some(team))
            .count()
    };
    if let Some(team) = requested {
        if count(team) < 2 {
            return team;
        }
    }
    if count(Team::Team1) <= count(Team::Team2) {
        Team::Team1
    } else {
        Team::Team2
    }
}
