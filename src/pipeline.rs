//! The end-to-end run: scrape articles, then translate and analyze headlines.
//!
//! ## Architecture
//!
//! 1. **Navigation**: open the site and the opinion listing
//! 2. **Links**: collect today's and yesterday's article links
//! 3. **Extraction**: visit links in order until enough articles are found,
//!    downloading each article's image on the way
//! 4. **Translation**: translate every title, best effort
//! 5. **Analysis**: count words across translated titles
//!
//! Everything runs sequentially. The page session is released at the end of
//! [`ArticleAnalyzer::process_articles`] whatever the outcome.

use crate::analysis::WordFrequencyReport;
use crate::browser::PageSession;
use crate::config::Settings;
use crate::error::Result;
use crate::images::ImageDownloader;
use crate::models::{Article, TranslatedTitle};
use crate::outputs::console;
use crate::scrapers::{article, links, navigator};
use crate::translate::{Translator, translate_title};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Owns the collaborators of one run.
///
/// * `S` - Page session used for navigation and extraction
/// * `D` - Image downloader
/// * `T` - Headline translator
///
/// The session is consumed by [`ArticleAnalyzer::process_articles`]: it is
/// quit at the end of that call, successful or not.
pub struct ArticleAnalyzer<S, D, T> {
    session: S,
    downloader: D,
    translator: T,
    settings: Settings,
    image_dir: PathBuf,
}

impl<S, D, T> ArticleAnalyzer<S, D, T>
where
    S: PageSession,
    D: ImageDownloader,
    T: Translator,
{
    /// `image_dir` must already exist; see [`crate::utils::create_run_dir`].
    pub fn new(session: S, downloader: D, translator: T, settings: Settings, image_dir: PathBuf) -> Self {
        Self {
            session,
            downloader,
            translator,
            settings,
            image_dir,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Scrape up to `num_articles` articles, then release the page session.
    ///
    /// Links are visited in listing order and no further link is opened once
    /// `num_articles` articles have been kept.
    ///
    /// # Returns
    ///
    /// The kept articles, possibly fewer than requested.
    ///
    /// # Errors
    ///
    /// Only a failure to reach the listing page. A failure to quit the
    /// session is logged and does not replace the result.
    #[instrument(level = "info", skip(self))]
    pub async fn process_articles(&mut self, num_articles: usize) -> Result<Vec<Article>> {
        let result = self.collect_articles(num_articles).await;
        if let Err(e) = self.session.quit().await {
            warn!(error = %e, "Failed to release page session");
        } else {
            info!("Page session released");
        }
        result
    }

    async fn collect_articles(&mut self, num_articles: usize) -> Result<Vec<Article>> {
        navigator::open_listing(&mut self.session, &self.settings).await?;

        let today = Local::now().date_naive();
        let article_links =
            links::collect_links(&mut self.session, &self.settings, self.settings.max_links, today)
                .await;

        let mut articles = Vec::new();
        for (i, url) in article_links.iter().enumerate() {
            if articles.len() >= num_articles {
                break;
            }
            let index = i + 1;
            info!(
                "Processing article {} of {}",
                index,
                article_links.len()
            );
            if let Some(article) = article::extract(
                &mut self.session,
                &self.downloader,
                &self.settings,
                &self.image_dir,
                url,
                index,
            )
            .await
            {
                articles.push(article);
            }
        }

        info!(
            scraped = articles.len(),
            requested = num_articles,
            candidates = article_links.len(),
            "Finished scraping articles"
        );
        Ok(articles)
    }

    /// Translate every title (printing each pair) and count words across the
    /// translations.
    #[instrument(level = "info", skip_all, fields(articles = articles.len()))]
    pub async fn analyze_translated_headers(
        &self,
        articles: &[Article],
    ) -> (Vec<TranslatedTitle>, WordFrequencyReport) {
        let mut translations = Vec::with_capacity(articles.len());
        for article in articles {
            let translated = translate_title(&self.translator, &article.title).await;
            let title = TranslatedTitle {
                original: article.title.clone(),
                translated,
            };
            console::print_translation(&title);
            translations.push(title);
        }

        let report = WordFrequencyReport::analyze(translations.iter().map(|t| &t.translated));
        info!(
            distinct_words = report.counts().len(),
            repeated = report.repeated().count(),
            "Analyzed translated titles"
        );
        (translations, report)
    }
}
