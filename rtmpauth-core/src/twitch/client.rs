//! Twitch Helix HTTP client

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, StatusCode,
};
use tracing::debug;

use super::{
    credentials::{ClientCredentials, TokenAuthority},
    types::{Category, GamesResponse, StreamsResponse, TokenResponse},
    HelixApi,
};
use crate::{config::TwitchConfig, models::ExternalStream, Error, Result};

const CLIENT_ID_HEADER: &str = "client-id";

/// Check HTTP response status before processing body.
fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(Error::Transport(format!("HTTP {status} from {}", resp.url().path())));
    }
    Ok(resp)
}

/// Helix API and OAuth endpoints, every request bounded by the configured timeout
#[derive(Clone)]
pub struct HelixClient {
    client: Client,
    api_base_url: String,
    auth_base_url: String,
    client_id: String,
}

impl HelixClient {
    pub fn new(config: &TwitchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.request_timeout())
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_base_url: config.auth_base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
        })
    }

    fn api_headers(&self, token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            CLIENT_ID_HEADER,
            HeaderValue::from_str(&self.client_id)
                .map_err(|e| Error::Configuration(format!("invalid client id: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Decode(format!("invalid access token: {e}")))?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl TokenAuthority for HelixClient {
    async fn validate_token(&self, token: &str) -> Result<bool> {
        let url = format!("{}/validate", self.auth_base_url);
        let auth = HeaderValue::from_str(&format!("OAuth {token}"))
            .map_err(|e| Error::Decode(format!("invalid access token: {e}")))?;

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, auth)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(true);
        }
        debug!(status = %status, "Access token rejected by validation endpoint");
        Ok(false)
    }

    async fn request_token(&self, credentials: &ClientCredentials) -> Result<String> {
        let url = format!("{}/token", self.auth_base_url);
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self.client.post(&url).form(&params).send().await?;
        let response = check_response(response)?;
        let token: TokenResponse = response.json().await?;

        if token.access_token.is_empty() {
            return Err(Error::Decode("token grant returned an empty access token".to_string()));
        }
        debug!(expires_in = token.expires_in, token_type = %token.token_type, "Obtained new app access token");
        Ok(token.access_token)
    }
}

#[async_trait]
impl HelixApi for HelixClient {
    async fn live_streams(&self, token: &str, channels: &[String]) -> Result<Vec<ExternalStream>> {
        let url = format!("{}/streams", self.api_base_url);
        let query: Vec<(&str, &str)> = channels
            .iter()
            .map(|channel| ("user_login", channel.as_str()))
            .collect();

        let response = self
            .client
            .get(&url)
            .headers(self.api_headers(token)?)
            .query(&query)
            .send()
            .await?;

        let response = check_response(response)?;
        let body: StreamsResponse = response.json().await?;
        Ok(body.data.into_iter().map(ExternalStream::from).collect())
    }

    async fn categories(&self, token: &str, category_id: &str) -> Result<Vec<Category>> {
        let url = format!("{}/games", self.api_base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.api_headers(token)?)
            .query(&[("id", category_id)])
            .send()
            .await?;

        let response = check_response(response)?;
        let body: GamesResponse = response.json().await?;
        Ok(body.data)
    }
}
