//! Main Subsonic client.

use crate::auth::auth_params;
use crate::error::{CatalogError, Result};
use crate::types::{CatalogConfig, Empty, Envelope};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Client for a Subsonic-compatible server (Subsonic, Navidrome, Gonic, ...).
///
/// # Example
///
/// ```ignore
/// use bramble_catalog::{CatalogConfig, SubsonicClient};
///
/// let client = SubsonicClient::new(CatalogConfig::new("https://music.example.com", "me", "pw"))?;
/// client.ping().await?;
/// let playlist = client.find_playlist("Road trip").await?;
/// println!("{} tracks", playlist.tracks.len());
/// ```
#[derive(Debug, Clone)]
pub struct SubsonicClient {
    pub(crate) http: Client,
    pub(crate) config: CatalogConfig,
}

impl SubsonicClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CatalogError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&url).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

        // Downloads of long lossless tracks are slow, so no overall timeout
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("bramble/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: CatalogConfig { url, ..config },
        })
    }

    /// The normalized server URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Check connectivity and credentials.
    pub async fn ping(&self) -> Result<()> {
        self.call::<Empty>("ping", &[]).await?;
        info!(url = %self.config.url, user = %self.config.username, "Connected to catalog");
        Ok(())
    }

    pub(crate) fn endpoint(&self, name: &str) -> String {
        format!("{}/rest/{}", self.config.url, name)
    }

    /// Send an authenticated GET to `rest/<endpoint>`, checking the HTTP status.
    pub(crate) async fn send(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Response> {
        let url = self.endpoint(endpoint);
        debug!(url = %url, "Calling catalog");

        let response = self
            .http
            .get(&url)
            .query(&auth_params(&self.config))
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(CatalogError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }

    /// Call a JSON endpoint and unwrap the `subsonic-response` envelope.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.send(endpoint, params).await?;
        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse {} response: {}", endpoint, e))
        })?;
        envelope.into_result()
    }
}
