//! Feed provider configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Where the feed text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// An HTTP(S) URL, fetched with GET.
    Url(Url),
    /// A file on the local filesystem.
    File(PathBuf),
}

impl FeedSource {
    /// Parses a feed URL. `http` and `https` URLs are fetched over the
    /// network; `file` URLs are read from disk.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unparseable URLs and any other scheme.
    pub fn from_url(location: &str) -> ProviderResult<Self> {
        let url = Url::parse(location).map_err(|e| {
            ProviderError::configuration(format!("invalid feed url {:?}: {}", location, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Self::Url(url)),
            "file" => url.to_file_path().map(Self::File).map_err(|()| {
                ProviderError::configuration(format!(
                    "invalid feed url {:?}: not a local file path",
                    location
                ))
            }),
            scheme => Err(ProviderError::configuration(format!(
                "invalid feed url {:?}: unsupported scheme {:?}, expected http, https or file",
                location, scheme
            ))),
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Configuration for the feed provider.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Feed location.
    pub source: FeedSource,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl FeedConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for a feed URL; see [`FeedSource::from_url`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is invalid or unsupported.
    pub fn from_url(url: impl AsRef<str>) -> ProviderResult<Self> {
        FeedSource::from_url(url.as_ref()).map(Self::new)
    }

    /// Creates a configuration for a feed stored on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FeedSource::File(path.into()))
    }

    /// Creates a configuration for an already resolved source.
    pub fn new(source: FeedSource) -> Self {
        Self {
            source,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("roomdisplay/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns true if the feed is fetched over the network.
    pub fn is_remote(&self) -> bool {
        matches!(self.source, FeedSource::Url(_))
    }
}
