//! App access token lifecycle
//!
//! The cache holds a single bearer token with no local expiry. Validity is
//! decided by the platform's validation endpoint on every use; a rejected
//! or missing token is replaced through the client-credentials grant.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{config::PLACEHOLDER_CLIENT_CREDENTIAL, Error, Result};

/// Platform client id/secret pair
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Fail fast on empty or documentation placeholder values
    pub fn ensure_configured(&self) -> Result<()> {
        if self.client_id.is_empty() || self.client_id == PLACEHOLDER_CLIENT_CREDENTIAL {
            return Err(Error::Configuration(
                "twitch client id is unset or the placeholder value, skipping twitch call"
                    .to_string(),
            ));
        }
        if self.client_secret.is_empty() || self.client_secret == PLACEHOLDER_CLIENT_CREDENTIAL {
            return Err(Error::Configuration(
                "twitch client secret is unset or the placeholder value, skipping twitch call"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Remote token validation and issuance
#[async_trait]
pub trait TokenAuthority: Send + Sync {
    /// `Ok(false)` when the platform rejects the token; `Err` only on transport failure
    async fn validate_token(&self, token: &str) -> Result<bool>;

    /// Client-credentials grant
    async fn request_token(&self, credentials: &ClientCredentials) -> Result<String>;
}

/// Owned, injectable holder of the app access token
pub struct CredentialCache {
    credentials: ClientCredentials,
    authority: Arc<dyn TokenAuthority>,
    cached: RwLock<Option<String>>,
}

impl CredentialCache {
    pub fn new(credentials: ClientCredentials, authority: Arc<dyn TokenAuthority>) -> Self {
        Self {
            credentials,
            authority,
            cached: RwLock::new(None),
        }
    }

    /// Seed the cache with a previously issued token
    #[must_use]
    pub fn with_token(self, token: impl Into<String>) -> Self {
        *self.cached.write() = Some(token.into());
        self
    }

    #[must_use]
    pub const fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// A token the platform currently accepts.
    ///
    /// Never touches the network when the credentials are unconfigured.
    /// The lock is released before any remote call.
    pub async fn token(&self) -> Result<String> {
        self.credentials.ensure_configured()?;

        let cached = self.cached.read().clone();
        if let Some(token) = cached {
            if self.authority.validate_token(&token).await? {
                return Ok(token);
            }
            debug!("Cached access token is no longer valid");
        } else {
            debug!("No cached access token");
        }

        let token = self.authority.request_token(&self.credentials).await?;
        *self.cached.write() = Some(token.clone());
        info!("Twitch access token refreshed");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts exactly one token and issues numbered ones
    #[derive(Default)]
    struct FakeAuthority {
        valid: RwLock<Option<String>>,
        validations: AtomicUsize,
        grants: AtomicUsize,
        fail_transport: bool,
    }

    #[async_trait]
    impl TokenAuthority for FakeAuthority {
        async fn validate_token(&self, token: &str) -> Result<bool> {
            self.validations.fetch_add(1, Ordering::SeqCst);
            if self.fail_transport {
                return Err(Error::Transport("connection reset".to_string()));
            }
            Ok(self.valid.read().as_deref() == Some(token))
        }

        async fn request_token(&self, _credentials: &ClientCredentials) -> Result<String> {
            let n = self.grants.fetch_add(1, Ordering::SeqCst) + 1;
            let token = format!("token-{n}");
            *self.valid.write() = Some(token.clone());
            Ok(token)
        }
    }

    fn configured() -> ClientCredentials {
        ClientCredentials::new("real-id", "real-secret")
    }

    #[tokio::test]
    async fn test_first_call_grants_then_reuses() {
        let authority = Arc::new(FakeAuthority::default());
        let cache = CredentialCache::new(configured(), authority.clone());

        assert_eq!(cache.token().await.unwrap(), "token-1");
        assert_eq!(cache.token().await.unwrap(), "token-1");

        assert_eq!(authority.grants.load(Ordering::SeqCst), 1);
        // the second call validated the cached token
        assert_eq!(authority.validations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_token_is_replaced() {
        let authority = Arc::new(FakeAuthority::default());
        let cache = CredentialCache::new(configured(), authority.clone()).with_token("expired");

        assert_eq!(cache.token().await.unwrap(), "token-1");
        assert_eq!(authority.validations.load(Ordering::SeqCst), 1);
        assert_eq!(authority.grants.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_placeholder_credentials_make_no_calls() {
        let authority = Arc::new(FakeAuthority::default());
        for credentials in [
            ClientCredentials::new(PLACEHOLDER_CLIENT_CREDENTIAL, PLACEHOLDER_CLIENT_CREDENTIAL),
            ClientCredentials::new("real-id", PLACEHOLDER_CLIENT_CREDENTIAL),
            ClientCredentials::new("", "real-secret"),
        ] {
            let cache = CredentialCache::new(credentials, authority.clone()).with_token("cached");
            assert!(cache.token().await.unwrap_err().is_configuration());
        }

        assert_eq!(authority.validations.load(Ordering::SeqCst), 0);
        assert_eq!(authority.grants.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_transport_error_is_surfaced() {
        let authority = Arc::new(FakeAuthority {
            fail_transport: true,
            ..FakeAuthority::default()
        });
        let cache = CredentialCache::new(configured(), authority.clone()).with_token("cached");

        assert!(cache.token().await.unwrap_err().is_transport());
        assert_eq!(authority.grants.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", configured());
        assert!(!rendered.contains("real-secret"));
    }
}
