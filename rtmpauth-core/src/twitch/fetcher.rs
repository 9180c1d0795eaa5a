//! External Status Fetcher

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{CredentialCache, HelixApi};
use crate::{
    models::{ExternalStream, Publisher},
    Error, Result,
};

/// Live sessions for a set of publishers
#[async_trait]
pub trait LiveStatusSource: Send + Sync {
    async fn fetch_live_channels(&self, publishers: &[Publisher]) -> Result<Vec<ExternalStream>>;
}

/// Category id to display name
#[async_trait]
pub trait CategoryLookup: Send + Sync {
    async fn category_name(&self, category_id: &str) -> Result<String>;
}

/// Queries the platform with a token from the shared cache
pub struct StatusFetcher {
    api: Arc<dyn HelixApi>,
    credentials: Arc<CredentialCache>,
}

impl StatusFetcher {
    pub fn new(api: Arc<dyn HelixApi>, credentials: Arc<CredentialCache>) -> Self {
        Self { api, credentials }
    }
}

#[async_trait]
impl LiveStatusSource for StatusFetcher {
    async fn fetch_live_channels(&self, publishers: &[Publisher]) -> Result<Vec<ExternalStream>> {
        self.credentials.credentials().ensure_configured()?;

        let channels: Vec<String> = publishers
            .iter()
            .filter(|p| p.has_external_channel())
            .map(|p| p.external_channel.clone())
            .collect();
        if channels.is_empty() {
            return Err(Error::NoWork(
                "no publisher has a linked twitch channel".to_string(),
            ));
        }

        let token = self.credentials.token().await?;
        let streams = self.api.live_streams(&token, &channels).await?;
        debug!(
            queried = channels.len(),
            live = streams.len(),
            "Fetched twitch live status"
        );
        Ok(streams)
    }
}

#[async_trait]
impl CategoryLookup for StatusFetcher {
    async fn category_name(&self, category_id: &str) -> Result<String> {
        let token = self.credentials.token().await?;
        let mut categories = self.api.categories(&token, category_id).await?;

        if categories.len() != 1 {
            return Err(Error::Integrity(format!(
                "expected exactly one category for id '{category_id}', got {}",
                categories.len()
            )));
        }
        Ok(categories.remove(0).name)
    }
}
