use actix_web::web;

use crate::health;
use crate::ws;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/health/rooms", web::get().to(health::rooms))
        .route("/ws", web::get().to(ws::connect));
}
