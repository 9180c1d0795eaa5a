//! Router fixtures shared by the handler tests

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tower::ServiceExt;

use rtmpauth_core::{
    config::RtmpConfig,
    models::Publisher,
    notify::{NotificationDispatcher, NotificationSink},
    store::{MemoryPublisherStore, PublisherStore},
    stream::StreamAuthorizer,
    Error, Result,
};

use crate::http::{create_router, AppState};

/// Records every posted message; optionally fails all posts
#[derive(Default)]
pub struct RecordingSink {
    pub failing: bool,
    pub posted: Mutex<Vec<String>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn post(&self, message: &str) -> Result<()> {
        if self.failing {
            return Err(Error::Transport("webhook unreachable".to_string()));
        }
        self.posted.lock().push(message.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryPublisherStore>,
    pub sink: Arc<RecordingSink>,
}

pub async fn test_app(sink: RecordingSink) -> TestApp {
    let store = Arc::new(MemoryPublisherStore::new());
    store
        .put(&Publisher::new("alice", "secret1").with_external_channel("alice_tv"))
        .await
        .unwrap();

    let sink = Arc::new(sink);
    let state = AppState {
        store: store.clone(),
        authorizer: Arc::new(StreamAuthorizer::new(store.clone(), RtmpConfig::default())),
        dispatcher: Arc::new(NotificationDispatcher::new(store.clone(), sink.clone())),
    };

    TestApp {
        router: create_router(state),
        store,
        sink,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub fn form(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
