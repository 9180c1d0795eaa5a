//! Outbound webhook sink

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::{
    config::{WebhookConfig, PLACEHOLDER_WEBHOOK_URL},
    Error, Result,
};

/// Destination for delivered notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Disabled sinks accept every message without sending it
    fn is_enabled(&self) -> bool;

    async fn post(&self, message: &str) -> Result<()>;
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Discord-compatible webhook (`{"content": ...}` JSON body)
pub struct WebhookSink {
    client: Client,
    url: String,
    enabled: bool,
}

impl WebhookSink {
    pub fn new(config: &WebhookConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.request_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            enabled: config.enabled,
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    fn is_enabled(&self) -> bool {
        self.enabled && !self.url.is_empty() && self.url != PLACEHOLDER_WEBHOOK_URL
    }

    async fn post(&self, message: &str) -> Result<()> {
        if !self.is_enabled() {
            debug!("Webhook disabled, dropping message");
            return Ok(());
        }

        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { content: message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!("webhook responded with HTTP {status}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn sink_for(url: String, enabled: bool) -> WebhookSink {
        WebhookSink::new(&WebhookConfig {
            enabled,
            url,
            request_timeout_seconds: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_post_sends_content_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(json!({ "content": "alice is live" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = sink_for(format!("{}/hook", server.uri()), true);
        sink.post("alice is live").await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = sink_for(format!("{}/hook", server.uri()), true);
        assert!(sink.post("hello").await.unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn test_disabled_or_placeholder_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let disabled = sink_for(format!("{}/hook", server.uri()), false);
        assert!(!disabled.is_enabled());
        disabled.post("hello").await.unwrap();

        let placeholder = sink_for(PLACEHOLDER_WEBHOOK_URL.to_string(), true);
        assert!(!placeholder.is_enabled());
        placeholder.post("hello").await.unwrap();
    }
}
