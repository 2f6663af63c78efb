//! Websocket transport: session actors, the connection hub and the
//! wire protocol.

pub mod hub;
pub mod protocol;
pub mod session;

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use crate::state::AppState;
use session::{ConnectQuery, WsSession};

/// Upgrade handler. The connection token, when present, is resolved to
/// an identity before the session starts; unauthenticated sessions can
/// play unstaked games but fail stake verification.
pub async fn connect(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    query: web::Query<ConnectQuery>,
) -> Result<HttpResponse, Error> {
    let email = match &query.token {
        Some(token) => state.identity.resolve(token).await.ok().map(|i| i.email),
        None => None,
    };
    ws::start(WsSession::new(state.clone(), email), &req, stream)
}
