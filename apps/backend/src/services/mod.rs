//! Room, matchmaking, coordination and balance services.

pub mod balance;
pub mod coordinator;
pub mod matchmaking;
pub mod rooms;
