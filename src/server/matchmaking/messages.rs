use serde::{Serialize, Deserialize};

/// Body returned by `GET /match/make`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MatchResponse {
    pub ws_url: String,
}
