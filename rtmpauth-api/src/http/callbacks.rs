//! Ingest-server lifecycle callbacks
//!
//! The RTMP server posts a form for each publish/play event and only looks
//! at the status code: 201 lets the stream through, anything else drops it.

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Form, Router,
};
use serde::Deserialize;
use tracing::warn;

use rtmpauth_core::stream::{Authorization, StreamEvent, StreamRequest};

use super::{AppError, AppResult, AppState};

/// Callback form body; only `name`, `key` and `app` drive behavior
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallbackForm {
    pub name: String,
    pub key: String,
    pub app: String,
    pub addr: String,
    pub clientid: String,
    pub call: String,
    pub tcurl: String,
}

pub fn create_callback_router() -> Router<AppState> {
    Router::new()
        .route("/on_publish", post(on_publish))
        .route("/on_publish_done", post(on_publish_done))
        .route("/on_play", post(on_play))
        .route("/on_play_done", post(on_play_done))
}

async fn on_publish(state: State<AppState>, form: Form<CallbackForm>) -> AppResult<StatusCode> {
    handle_event(state, StreamEvent::Publish, form).await
}

async fn on_publish_done(state: State<AppState>, form: Form<CallbackForm>) -> AppResult<StatusCode> {
    handle_event(state, StreamEvent::PublishDone, form).await
}

async fn on_play(state: State<AppState>, form: Form<CallbackForm>) -> AppResult<StatusCode> {
    handle_event(state, StreamEvent::Play, form).await
}

async fn on_play_done(state: State<AppState>, form: Form<CallbackForm>) -> AppResult<StatusCode> {
    handle_event(state, StreamEvent::PlayDone, form).await
}

async fn handle_event(
    State(state): State<AppState>,
    event: StreamEvent,
    Form(form): Form<CallbackForm>,
) -> AppResult<StatusCode> {
    let request = StreamRequest::new(form.name, form.key, form.app);

    match state.authorizer.authorize(event, &request).await? {
        Authorization::Unauthorized => Err(AppError::unauthorized("Unauthorized")),
        Authorization::Authorized => {
            if event.stages_notification() {
                // stays pending for the next poll cycle if this fails
                if let Err(e) = state.dispatcher.dispatch_for(&request.name).await {
                    warn!(publisher = %request.name, error = %e, "Immediate notification not delivered");
                }
            } else if let Some(message) = event.viewer_message(&request.name) {
                state.dispatcher.announce(&message).await;
            }
            Ok(StatusCode::CREATED)
        }
    }
}
