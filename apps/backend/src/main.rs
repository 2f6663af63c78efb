use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::info;

use trut_backend::config::AppConfig;
use trut_backend::state::AppState;
use trut_backend::{routes, telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let bind_addr = config.bind_addr();
    let state = web::Data::new(AppState::build(config));

    // Periodic matchmaking pass; also the path that honors the
    // partial-fill timeout.
    {
        let state = state.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(state.config.matchmaking_interval);
            loop {
                ticker.tick().await;
                for group in state.queue.sweep() {
                    state.launch_match_group(group).await;
                }
            }
        });
    }

    info!(host = %bind_addr.0, port = bind_addr.1, "starting trut backend");
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();
        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
