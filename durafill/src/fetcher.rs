//! Audio download into scoped temporary files
//!
//! The downloaded bytes live in a [`FetchedAudio`], which owns a
//! `tempfile::NamedTempFile`. Dropping it deletes the file, so whichever way a
//! task ends (probe success, decode error, failed download halfway through)
//! nothing is left behind.

use crate::error::TaskError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

const USER_AGENT: &str = concat!("durafill/", env!("CARGO_PKG_VERSION"));

/// Extension used when the URL does not name one
const DEFAULT_EXTENSION: &str = "mp3";

/// Downloaded audio held in a temporary file
#[derive(Debug)]
pub struct FetchedAudio {
    file: NamedTempFile,
    bytes: u64,
}

impl FetchedAudio {
    pub fn new(file: NamedTempFile, bytes: u64) -> Self {
        Self { file, bytes }
    }

    /// Location of the temporary file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of bytes downloaded
    pub fn len(&self) -> u64 {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }
}

/// Source of audio bytes for a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedAudio, TaskError>;
}

/// HTTP GET fetcher
pub struct HttpFetcher {
    http_client: reqwest::Client,
    temp_dir: Option<PathBuf>,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TaskError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TaskError::Fetch(e.to_string()))?;

        Ok(Self {
            http_client,
            temp_dir: None,
        })
    }

    /// Place temporary files in `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    fn create_temp_file(&self, url: &str) -> std::io::Result<NamedTempFile> {
        let suffix = format!(".{}", extension_for(url));
        let mut builder = tempfile::Builder::new();
        builder.prefix("durafill-").suffix(&suffix);

        match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedAudio, TaskError> {
        tracing::debug!(url = %url, "Downloading audio");

        let mut response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| TaskError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Fetch(format!("HTTP {} for {}", status.as_u16(), url)));
        }

        let temp = self.create_temp_file(url)?;
        let mut file = tokio::fs::File::from_std(temp.reopen()?);
        let mut bytes = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| TaskError::Fetch(e.to_string()))?
        {
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        tracing::debug!(url = %url, bytes, path = %temp.path().display(), "Download complete");

        Ok(FetchedAudio::new(temp, bytes))
    }
}

/// File extension named by the last URL path segment, if it looks like one
fn extension_for(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .and_then(|segment| {
            Path::new(&segment)
                .extension()
                .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        })
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
