//! HTTP endpoint for matchmaking.
//!
//! Hands the player a match id (through the WebSocket URL to connect to). The slot is
//! only taken once the player actually joins the live session.
use actix_web::{web, HttpRequest, HttpResponse};
use log::debug;

use super::messages::MatchResponse;
use super::types::MatchId;
use crate::server::identity::player_from_query;
use crate::server::state::AppState;
use crate::server::ws_error::{match_error_response, missing_player_response};

/// `GET /match/make?player=<id>`
pub async fn make_match(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let Some(player_id) = player_from_query(&req) else {
        return missing_player_response();
    };

    match data.store.allocate(&player_id) {
        Ok(match_id) => {
            let ws_url = ws_url_for(&req, &match_id, &player_id);
            debug!("[Matchmaking] Player {} -> {}", player_id, ws_url);
            HttpResponse::Ok().json(MatchResponse { ws_url })
        }
        Err(e) => match_error_response(&e, Some(player_id.as_str())),
    }
}

/// Build the WebSocket URL for `match_id`, mirroring the scheme and host of the request.
fn ws_url_for(req: &HttpRequest, match_id: &MatchId, player_id: &str) -> String {
    let conn = req.connection_info();
    let scheme = if conn.scheme() == "https" { "wss" } else { "ws" };
    format!(
        "{}://{}/match/{}?player={}",
        scheme,
        conn.host(),
        match_id,
        urlencoding::encode(player_id)
    )
}
