//! Health and monitoring endpoints.

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::services::rooms::RoomSummary;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    active_rooms: usize,
    players_in_queue: usize,
}

pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthBody {
        status: "ok",
        active_rooms: state.rooms.active_count(),
        players_in_queue: state.queue.depth(),
    })
}

#[derive(Serialize)]
struct RoomsBody {
    rooms: Vec<RoomSummary>,
    queue_depth: usize,
}

/// Per-room summaries for external tooling.
pub async fn rooms(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(RoomsBody {
        rooms: state.rooms.summaries(),
        queue_depth: state.queue.depth(),
    })
}
