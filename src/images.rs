//! Best-effort article image downloads.
//!
//! Images are saved as `<md5 hex of the image URL>.jpg` inside the run's image
//! directory, so the same URL always maps to the same file. The body is
//! streamed to disk chunk by chunk. A download that fails after the file was
//! created removes the partial file; nothing incomplete is left behind.

use crate::error::{Result, ScrapeError};
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument, warn};

/// Response body as a stream of byte chunks.
pub type ChunkStream = BoxStream<'static, Result<Vec<u8>>>;

/// An HTTP response whose body has not been read yet.
pub struct Download {
    pub status: u16,
    pub body: ChunkStream,
}

/// Fetches image bodies. [`HttpDownloader`] is the real implementation.
pub trait ImageDownloader {
    /// Start a GET for `url`. Non-success statuses are returned, not errors.
    async fn get(&self, url: &str) -> Result<Download>;
}

/// [`ImageDownloader`] backed by a `reqwest` client with a 60 second timeout.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self { client })
    }
}

impl ImageDownloader for HttpDownloader {
    async fn get(&self, url: &str) -> Result<Download> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ScrapeError::from))
            .boxed();
        Ok(Download { status, body })
    }
}

/// File name an image is stored under.
///
/// # Arguments
///
/// * `image_url` - Absolute URL of the image
///
/// # Returns
///
/// The lowercase md5 hex digest of the URL followed by `.jpg`, e.g.
/// `d41d8cd98f00b204e9800998ecf8427e.jpg` for the empty string.
pub fn image_filename(image_url: &str) -> String {
    format!("{:x}.jpg", md5::compute(image_url.as_bytes()))
}

/// Download `image_url` into `target_dir`.
///
/// Failures are logged and swallowed: an image never decides whether its
/// article is kept.
///
/// # Arguments
///
/// * `downloader` - Source of the response body
/// * `image_url` - Absolute URL of the image
/// * `target_dir` - Existing directory for this run's images
///
/// # Returns
///
/// The saved file's path, or `None` if the download failed. A failed write
/// leaves no partial file behind.
#[instrument(level = "info", skip(downloader, target_dir))]
pub async fn fetch<D: ImageDownloader>(
    downloader: &D,
    image_url: &str,
    target_dir: &Path,
) -> Option<PathBuf> {
    match save(downloader, image_url, target_dir).await {
        Ok(Some(path)) => {
            info!(path = %path.display(), "Image saved");
            Some(path)
        }
        Ok(None) => None,
        Err(e) => {
            error!(error = %e, "Failed to download image");
            None
        }
    }
}

async fn save<D: ImageDownloader>(
    downloader: &D,
    image_url: &str,
    target_dir: &Path,
) -> Result<Option<PathBuf>> {
    let download = downloader.get(image_url).await?;
    if !(200..300).contains(&download.status) {
        error!(status = download.status, "Failed to download image");
        return Ok(None);
    }

    let path = target_dir.join(image_filename(image_url));
    if let Err(e) = write_body(download.body, &path).await {
        if let Err(cleanup) = fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %cleanup, "Could not remove partial image");
        }
        return Err(e);
    }
    Ok(Some(path))
}

async fn write_body(mut body: ChunkStream, path: &Path) -> Result<()> {
    let mut file = File::create(path).await?;
    while let Some(chunk) = body.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}
