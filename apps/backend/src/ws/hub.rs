//! Connection hub: maps player ids to live session recipients.

use actix::prelude::{Message, Recipient};
use dashmap::DashMap;
use tracing::warn;

use crate::domain::snapshot::room_snapshot_for;
use crate::domain::state::{PlayerId, Room};
use crate::ws::protocol::ServerMsg;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Outbound(pub String);

#[derive(Default)]
pub struct Hub {
    sessions: DashMap<PlayerId, Recipient<Outbound>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, player_id: PlayerId, recipient: Recipient<Outbound>) {
        self.sessions.insert(player_id, recipient);
    }

    pub fn unregister(&self, player_id: PlayerId) {
        self.sessions.remove(&player_id);
    }

    pub fn send_to(&self, player_id: PlayerId, msg: &ServerMsg) {
        let Some(recipient) = self.sessions.get(&player_id) else {
            return;
        };
        match serde_json::to_string(msg) {
            Ok(payload) => recipient.do_send(Outbound(payload)),
            Err(err) => warn!(player_id = %player_id, error = %err, "dropping unserializable message"),
        }
    }

    /// Send one message per human seat, built from that seat's redacted
    /// view of the room.
    pub fn broadcast_room(&self, room: &Room, build: impl Fn(PlayerId, &Room) -> ServerMsg) {
        for seat in room.seats.iter().filter(|p| !p.is_bot) {
            let msg = build(seat.id, room);
            self.send_to(seat.id, &msg);
        }
    }

    /// Convenience for the common case: the same variant for everyone,
    /// differing only in the redacted room view.
    pub fn broadcast_update(&self, room: &Room, message: &str) {
        self.broadcast_room(room, |viewer, room| ServerMsg::RoomUpdate {
            room: room_snapshot_for(room, viewer),
            message: message.to_string(),
        });
    }
}
