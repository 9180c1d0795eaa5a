// Module: http
// Ingest-server callbacks and the publisher management API

pub mod callbacks;
pub mod error;
pub mod health;
pub mod publisher;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use rtmpauth_core::{
    notify::NotificationDispatcher, store::PublisherStore, stream::StreamAuthorizer,
};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PublisherStore>,
    pub authorizer: Arc<StreamAuthorizer>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::create_health_router())
        .merge(callbacks::create_callback_router())
        .merge(publisher::create_publisher_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
