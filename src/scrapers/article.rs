//! Extracting a single opinion article.

use crate::browser::PageSession;
use crate::config::Settings;
use crate::error::Result;
use crate::images::{self, ImageDownloader};
use crate::models::Article;
use std::path::Path;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Scrape the article at `url`. Every failure is logged and yields `None`;
/// nothing propagates to the caller.
#[instrument(level = "info", skip(session, downloader, settings, image_dir))]
pub async fn extract<S: PageSession, D: ImageDownloader>(
    session: &mut S,
    downloader: &D,
    settings: &Settings,
    image_dir: &Path,
    url: &str,
    index: usize,
) -> Option<Article> {
    match try_extract(session, downloader, settings, image_dir, url, index).await {
        Ok(article) => article,
        Err(e) => {
            error!(error = %e, %url, "Error scraping article");
            None
        }
    }
}

async fn try_extract<S: PageSession, D: ImageDownloader>(
    session: &mut S,
    downloader: &D,
    settings: &Settings,
    image_dir: &Path,
    url: &str,
    index: usize,
) -> Result<Option<Article>> {
    if settings.is_excluded(url) {
        warn!(%url, "Skipping folder-like article URL");
        return Ok(None);
    }

    println!("Scraping article {index}: {url}");
    session.goto(url).await?;
    sleep(settings.settle()).await;

    let wait = settings.wait();
    let selectors = &settings.selectors;

    let Some(title_element) = wait.until_present(session, &selectors.title).await? else {
        error!("Could not find article title");
        return Ok(None);
    };
    let title = session.text(&title_element).await?.trim().to_string();
    if title.is_empty() {
        warn!("Article has no valid title. Skipping.");
        return Ok(None);
    }
    info!(%title, "Found title");

    let paragraphs = wait.until_all_present(session, &selectors.paragraph).await?;
    if paragraphs.is_empty() {
        error!("Could not find article content");
        return Ok(None);
    }
    let mut content = Vec::with_capacity(paragraphs.len());
    for paragraph in &paragraphs {
        content.push(session.text(paragraph).await?);
    }

    match wait.until_present(session, &selectors.image).await? {
        Some(image) => match session.attribute(&image, "src").await? {
            Some(image_url) if !image_url.is_empty() => {
                info!(%image_url, "Found image URL");
                images::fetch(downloader, &image_url, image_dir).await;
            }
            _ => warn!("No image URL found"),
        },
        None => warn!("No image found"),
    }

    Ok(Some(Article {
        title,
        content: content.join("\n"),
        url: url.to_string(),
    }))
}
