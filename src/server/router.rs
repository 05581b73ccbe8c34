//! HTTP and WebSocket routing configuration.
//!
//! Defines the endpoints for matchmaking and live matches.

use actix_web::web;
use crate::server::matchmaking::endpoint::make_match;
use crate::server::match_session::socket::ws_match;

/// Configure the application's HTTP/WebSocket routes.
///
/// `/match/make` is registered before `/match/{match_id}` so it is never taken for a match id.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/match/make")
            .route(web::get().to(make_match))
    )
    .service(
        web::resource("/match/{match_id}")
            .to(ws_match)
    );
}
