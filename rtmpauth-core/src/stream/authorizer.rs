//! Stream Authorizer
//!
//! Validates ingest-server lifecycle callbacks against the publisher store.
//! "Unknown publisher" and "wrong key" produce the same `Unauthorized`
//! outcome; only the log line tells them apart.

use std::{fmt, sync::Arc};
use tracing::{info, warn};

use crate::{
    config::RtmpConfig,
    notify::messages,
    store::PublisherStore,
    Error, Result,
};

/// Ingest-server lifecycle callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEvent {
    Publish,
    PublishDone,
    Play,
    PlayDone,
}

impl StreamEvent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::PublishDone => "publish_done",
            Self::Play => "play",
            Self::PlayDone => "play_done",
        }
    }

    /// Whether a successful authorization stages a notification for the publisher
    #[must_use]
    pub const fn stages_notification(self) -> bool {
        matches!(self, Self::Publish | Self::PublishDone)
    }

    /// Unstaged message posted directly for viewer events
    #[must_use]
    pub fn viewer_message(self, name: &str) -> Option<String> {
        match self {
            Self::Play => Some(messages::viewer_joined(name)),
            Self::PlayDone => Some(messages::viewer_left(name)),
            Self::Publish | Self::PublishDone => None,
        }
    }
}

impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials carried by a callback
#[derive(Debug, Clone, Default)]
pub struct StreamRequest {
    pub name: String,
    pub key: String,
    /// Ingest application, only used to format the watch URL
    pub app: String,
}

impl StreamRequest {
    pub fn new(name: impl Into<String>, key: impl Into<String>, app: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            app: app.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    Unauthorized,
}

impl Authorization {
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }
}

pub struct StreamAuthorizer {
    store: Arc<dyn PublisherStore>,
    rtmp: RtmpConfig,
}

impl StreamAuthorizer {
    pub fn new(store: Arc<dyn PublisherStore>, rtmp: RtmpConfig) -> Self {
        Self { store, rtmp }
    }

    /// Check the key and apply the event's local-live side effects.
    ///
    /// Storage failures are returned as errors so callers can fail closed.
    pub async fn authorize(&self, event: StreamEvent, request: &StreamRequest) -> Result<Authorization> {
        let publisher = match self.store.get(&request.name).await {
            Ok(publisher) => publisher,
            Err(Error::NotFound(_)) => {
                warn!(publisher = %request.name, event = %event, "Rejected stream: unknown publisher");
                return Ok(Authorization::Unauthorized);
            }
            Err(e) => return Err(e),
        };

        if publisher.key != request.key {
            warn!(publisher = %request.name, event = %event, "Rejected stream: key mismatch");
            return Ok(Authorization::Unauthorized);
        }

        match event {
            StreamEvent::Publish => {
                let marker = chrono::Utc::now().to_rfc3339();
                self.store.set_local_live(&publisher.name, &marker).await?;
                let message = messages::local_started(&publisher.name, &self.watch_url(request));
                self.store.stage_notification(&publisher.name, &message).await?;
                info!(publisher = %publisher.name, "Publisher went live");
            }
            StreamEvent::PublishDone => {
                self.store.set_local_live(&publisher.name, "").await?;
                let message = messages::local_stopped(&publisher.name);
                self.store.stage_notification(&publisher.name, &message).await?;
                info!(publisher = %publisher.name, "Publisher stopped");
            }
            StreamEvent::Play | StreamEvent::PlayDone => {
                info!(publisher = %publisher.name, event = %event, "Viewer authorized");
            }
        }

        Ok(Authorization::Authorized)
    }

    /// `rtmp://<fqdn>:<port>/<app>/<name>`
    fn watch_url(&self, request: &StreamRequest) -> String {
        format!(
            "rtmp://{}:{}/{}/{}",
            self.rtmp.fqdn, self.rtmp.port, request.app, request.name
        )
    }
}
