//! Publisher management API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use rtmpauth_core::{
    models::Publisher,
    store::FieldGroup,
    Error,
};

use super::{AppResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct PublisherQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertPublisherRequest {
    pub name: String,
    pub key: String,
    /// Omitted keeps the current link, empty string removes it
    pub external_channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeletePublisherRequest {
    pub name: String,
}

pub fn create_publisher_router() -> Router<AppState> {
    Router::new().route(
        "/api/publisher",
        get(get_publishers).post(upsert_publisher).delete(delete_publisher),
    )
}

/// All publishers, or one when `?name=` is given
async fn get_publishers(
    State(state): State<AppState>,
    Query(query): Query<PublisherQuery>,
) -> AppResult<Json<serde_json::Value>> {
    match query.name {
        Some(name) => {
            let publisher = state.store.get(&name).await?;
            Ok(Json(serde_json::to_value(publisher).map_err(anyhow::Error::from)?))
        }
        None => {
            let publishers = state.store.get_all().await?;
            Ok(Json(serde_json::to_value(publishers).map_err(anyhow::Error::from)?))
        }
    }
}

/// Create or update the identity fields; live state and pending
/// notifications are left as they are.
async fn upsert_publisher(
    State(state): State<AppState>,
    Json(req): Json<UpsertPublisherRequest>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    let mut publisher = match state.store.get(&req.name).await {
        Ok(existing) => existing,
        Err(Error::NotFound(_)) => Publisher::new(req.name.clone(), String::new()),
        Err(e) => return Err(e.into()),
    };
    publisher.key = req.key;
    if let Some(channel) = req.external_channel {
        publisher.external_channel = channel;
    }
    publisher.validate()?;

    state
        .store
        .set_field(FieldGroup::Key, &publisher.name, &publisher.key)
        .await?;
    state
        .store
        .set_field(FieldGroup::ExternalChannel, &publisher.name, &publisher.external_channel)
        .await?;

    info!(publisher = %publisher.name, channel = %publisher.external_channel, "Publisher saved");
    Ok((StatusCode::CREATED, Json(publisher)))
}

async fn delete_publisher(
    State(state): State<AppState>,
    Json(req): Json<DeletePublisherRequest>,
) -> AppResult<StatusCode> {
    state.store.get(&req.name).await?;
    state.store.delete(&req.name).await?;

    info!(publisher = %req.name, "Publisher deleted");
    Ok(StatusCode::NO_CONTENT)
}
