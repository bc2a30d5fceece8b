//! Feed retrieval.
//!
//! Fetches the raw feed text. HTTP status codes are mapped onto
//! [`ProviderError`] codes; the body itself is never inspected here.

use std::io;
use std::path::Path;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

use super::config::{FeedConfig, FeedSource};

const ICAL_MEDIA_TYPE: &str = "text/calendar";

/// Client that retrieves feed text.
#[derive(Debug, Clone)]
pub struct FeedClient {
    /// The underlying HTTP client.
    client: Client,
    /// Configuration.
    config: FeedConfig,
}

impl FeedClient {
    /// Creates a new feed client with the given configuration.
    pub fn new(config: FeedConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("Failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self { client, config })
    }

    /// Retrieves the full feed text.
    pub async fn fetch(&self) -> ProviderResult<String> {
        match &self.config.source {
            FeedSource::Url(url) => self.get(url).await,
            FeedSource::File(path) => read_file(path).await,
        }
    }

    async fn get(&self, url: &Url) -> ProviderResult<String> {
        debug!(url = %url, "Fetching feed");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, ICAL_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("Request failed: {}", e)).with_source(e))?;

        let status = response.status();
        trace!(status = %status, "Received response");

        if let Some(error) = status_error(status) {
            warn!(url = %url, status = %status, "Feed request rejected");
            return Err(error);
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("Failed to read response: {}", e)))
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}

async fn read_file(path: &Path) -> ProviderResult<String> {
    debug!(path = %path.display(), "Reading feed from file");

    tokio::fs::read_to_string(path).await.map_err(|e| {
        let message = format!("Failed to read iCal feed {}: {}", path.display(), e);
        let error = match e.kind() {
            io::ErrorKind::NotFound => ProviderError::not_found(message),
            io::ErrorKind::PermissionDenied => ProviderError::authorization(message),
            io::ErrorKind::InvalidData => ProviderError::invalid_response(message),
            _ => ProviderError::internal(message),
        };
        error.with_source(e)
    })
}

/// Maps a non-success status to the matching error; `None` for 2xx.
fn status_error(status: StatusCode) -> Option<ProviderError> {
    if status.is_success() {
        return None;
    }

    let message = format!("Failed to fetch iCal feed: {}", status);
    Some(match status {
        StatusCode::UNAUTHORIZED => ProviderError::authentication(message),
        StatusCode::FORBIDDEN => ProviderError::authorization(message),
        StatusCode::NOT_FOUND | StatusCode::GONE => ProviderError::not_found(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        s if s.is_server_error() => ProviderError::server(message),
        _ => ProviderError::invalid_response(message),
    })
}
