//! Runtime settings for a scraping run.
//!
//! Every value has a built-in default matching the El País opinion section, so
//! running the binary with no arguments and no settings file just works. A YAML
//! file can override any subset of fields, and the CLI (see [`crate::cli`])
//! overrides the file.
//!
//! ```yaml
//! backend: static
//! wait_secs: 5
//! num_articles: 3
//! translation:
//!   email: me@example.com
//! ```

use crate::browser::wait::Wait;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Which [`crate::browser::PageSession`] implementation drives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Chrome through a W3C WebDriver endpoint (chromedriver).
    #[value(name = "webdriver")]
    WebDriver,
    /// Plain HTTP GET and HTML parsing, no JavaScript.
    Static,
}

/// CSS selectors locating the parts of the site the scraper reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub consent_button: String,
    pub article_link: String,
    pub title: String,
    pub paragraph: String,
    pub image: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            consent_button: "#didomi-notice-agree-button".to_string(),
            article_link: "article a[href*='/opinion/']".to_string(),
            title: "article h1".to_string(),
            paragraph: "article p".to_string(),
            image: "article img".to_string(),
        }
    }
}

/// Translation backend settings (MyMemory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub endpoint: String,
    pub source_lang: String,
    pub target_lang: String,
    /// Contact address sent as `de`; MyMemory grants a larger free quota with it.
    pub email: Option<String>,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mymemory.translated.net/get".to_string(),
            source_lang: "es".to_string(),
            target_lang: "en".to_string(),
            email: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub listing_path: String,
    pub selectors: Selectors,
    /// Links containing any of these are section pages, not articles.
    pub excluded_segments: Vec<String>,
    pub backend: Backend,
    pub webdriver_url: String,
    pub browser_args: Vec<String>,
    pub accept_languages: String,
    pub wait_secs: u64,
    pub poll_interval_ms: u64,
    pub settle_ms: u64,
    pub consent_settle_ms: u64,
    pub num_articles: usize,
    pub max_links: usize,
    pub log_file: String,
    pub image_dir_prefix: String,
    pub translation: TranslationSettings,
    pub report_json: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://elpais.com".to_string(),
            listing_path: "/opinion".to_string(),
            selectors: Selectors::default(),
            excluded_segments: vec![
                "/opinion/editoriales/".to_string(),
                "/opinion/tribunas/".to_string(),
            ],
            backend: Backend::WebDriver,
            webdriver_url: "http://localhost:9515".to_string(),
            browser_args: vec![
                "--start-maximized".to_string(),
                "--lang=es".to_string(),
                "--accept-lang=es".to_string(),
            ],
            accept_languages: "es,es_ES".to_string(),
            wait_secs: 10,
            poll_interval_ms: 500,
            settle_ms: 2000,
            consent_settle_ms: 1000,
            num_articles: 5,
            max_links: 10,
            log_file: "elpais_scraper.log".to_string(),
            image_dir_prefix: "article_images".to_string(),
            translation: TranslationSettings::default(),
            report_json: None,
        }
    }
}

impl Settings {
    /// Load settings from an optional YAML file, falling back to defaults.
    #[instrument(level = "debug")]
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let settings = Self::from_yaml(&raw)?;
                info!(path, "Loaded settings file");
                Ok(settings)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse settings from YAML. Missing keys take their defaults.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// The bounded wait used for every element lookup.
    pub fn wait(&self) -> Wait {
        Wait::new(
            Duration::from_secs(self.wait_secs),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    /// Pause after each page load.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Pause after accepting the cookie banner.
    pub fn consent_settle(&self) -> Duration {
        Duration::from_millis(self.consent_settle_ms)
    }

    /// The opinion listing URL, `listing_path` joined onto `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ScrapeError::Url`] if either part does not parse.
    pub fn listing_url(&self) -> Result<String> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(&self.listing_path)?.to_string())
    }

    /// Whether `url` belongs to a section that is never scraped
    /// (editorials, guest columns). Plain substring match.
    pub fn is_excluded(&self, url: &str) -> bool {
        self.excluded_segments
            .iter()
            .any(|segment| url.contains(segment.as_str()))
    }
}
