//! Player identity extraction.
//!
//! The identity layer in front of this service authenticates the player; the
//! backend trusts the `player` query parameter it forwards.
use actix_web::HttpRequest;
use std::borrow::Cow;

use crate::server::matchmaking::types::PlayerId;

/// Read the `player` query parameter (URL-decoded). Returns `None` when absent or empty.
pub fn player_from_query(req: &HttpRequest) -> Option<PlayerId> {
    player_from_query_str(req.query_string())
}

fn player_from_query_str(query: &str) -> Option<PlayerId> {
    for kv in query.split('&') {
        let mut split = kv.splitn(2, '=');
        if let (Some("player"), Some(raw)) = (split.next(), split.next()) {
            let player = urlencoding::decode(raw)
                .unwrap_or_else(|_| Cow::Borrowed(""))
                .into_owned();
            if !player.is_empty() {
                return Some(player);
            }
        }
    }
    None
}
