//! Manifest sources
//!
//! Where the startup manifest document comes from. The store treats any error
//! here as a recoverable fetch failure.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::module::traits::ModuleError;

/// Fetches the raw manifest document
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Human-readable location, for logs
    fn location(&self) -> String;

    /// Fetch the document text
    async fn fetch(&self) -> Result<String, ModuleError>;
}

/// Manifest read from the local filesystem
pub struct FileManifestSource {
    path: PathBuf,
}

impl FileManifestSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ManifestSource for FileManifestSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String, ModuleError> {
        debug!("Reading manifest from {:?}", self.path);
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ModuleError::FetchError(format!("{}: {}", self.path.display(), e)))
    }
}

/// Manifest fetched over HTTP from the well-known path
#[cfg(feature = "http-manifest")]
pub struct HttpManifestSource {
    url: String,
    client: reqwest::Client,
}

#[cfg(feature = "http-manifest")]
impl HttpManifestSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "http-manifest")]
#[async_trait]
impl ManifestSource for HttpManifestSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String, ModuleError> {
        debug!("Fetching manifest from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ModuleError::FetchError(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModuleError::FetchError(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ModuleError::FetchError(format!("{}: {}", self.url, e)))
    }
}

/// Pick a source for a configured location: http(s) URLs go over the network,
/// anything else is read from disk
pub fn source_for_location(location: &str) -> Box<dyn ManifestSource> {
    #[cfg(feature = "http-manifest")]
    {
        if location.starts_with("http://") || location.starts_with("https://") {
            return Box::new(HttpManifestSource::new(location));
        }
    }
    Box::new(FileManifestSource::new(location))
}
