//! Helix wire types

use serde::Deserialize;

use crate::models::ExternalStream;

/// `GET /streams` response
#[derive(Debug, Default, Deserialize)]
pub struct StreamsResponse {
    #[serde(default)]
    pub data: Vec<StreamData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StreamData {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub game_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub viewer_count: u64,
    pub started_at: String,
}

impl From<StreamData> for ExternalStream {
    fn from(data: StreamData) -> Self {
        // user_login is the stable identifier; fall back to the display name
        // for responses that omit it
        let channel = if data.user_login.is_empty() {
            data.user_name.clone()
        } else {
            data.user_login
        };
        Self {
            channel,
            display_name: data.user_name,
            category_id: data.game_id,
            title: data.title,
            started_at: data.started_at,
            kind: data.kind,
        }
    }
}

/// `GET /games` response
#[derive(Debug, Default, Deserialize)]
pub struct GamesResponse {
    #[serde(default)]
    pub data: Vec<Category>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub box_art_url: String,
}

/// Client-credentials grant response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
}
