//! Main entry point for the backend server.
//!
//! Initializes logging, builds the shared match registry and store, and launches the
//! HTTP server with the matchmaking and live match endpoints.

use actix_web::{web, App, HttpServer};
use log::info;

pub mod config;
mod server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to error level).
    env_logger::init();

    let server_config = config::server::ServerConfig::from_env();

    // Registry and store are created once and shared by every handler.
    let state = web::Data::new(server::state::AppState::in_memory());

    info!("[Server] Listening on {}:{}", server_config.host, server_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind((server_config.host.as_str(), server_config.port))?
    .run()
    .await
}
