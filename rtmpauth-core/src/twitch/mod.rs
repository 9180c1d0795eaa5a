//! Twitch integration
//!
//! - `client`: Helix/OAuth HTTP adapter
//! - `credentials`: app access token cache
//! - `fetcher`: live-status and category queries built on the two above

mod client;
mod credentials;
mod fetcher;
mod types;

pub use client::HelixClient;
pub use credentials::{ClientCredentials, CredentialCache, TokenAuthority};
pub use fetcher::{CategoryLookup, LiveStatusSource, StatusFetcher};
pub use types::Category;

use async_trait::async_trait;

use crate::{models::ExternalStream, Result};

/// The two Helix query endpoints the poll cycle depends on
#[async_trait]
pub trait HelixApi: Send + Sync {
    /// Live streams among the given channel logins, one batched request
    async fn live_streams(&self, token: &str, channels: &[String]) -> Result<Vec<ExternalStream>>;

    /// Categories matching the id; callers decide what a count other than one means
    async fn categories(&self, token: &str, category_id: &str) -> Result<Vec<Category>>;
}
