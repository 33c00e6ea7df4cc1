//! Command-line interface definitions.
//!
//! Every flag is optional: with none given the scraper runs against El País
//! with the built-in [`Settings`]. Explicit flags (or their environment
//! variables) override values from the `--config` YAML file.

use crate::config::{Backend, Settings};
use crate::error::Result;
use clap::Parser;

/// Scrape El País opinion articles, translate the headlines and report
/// words repeated across them.
///
/// # Examples
///
/// ```sh
/// # Defaults: chromedriver on localhost:9515, five articles
/// elpais_opinion
///
/// # No browser, plain HTTP fetches, JSON report
/// elpais_opinion --backend static --report-json ./report.json
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Site root to scrape
    #[arg(long, env = "ELPAIS_BASE_URL")]
    pub base_url: Option<String>,

    /// WebDriver endpoint (chromedriver)
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Page backend
    #[arg(long, value_enum, env = "SCRAPER_BACKEND")]
    pub backend: Option<Backend>,

    /// Number of articles to keep
    #[arg(short, long)]
    pub num_articles: Option<usize>,

    /// Maximum candidate links taken from the listing page
    #[arg(long)]
    pub max_links: Option<usize>,

    /// Timeout in seconds for each element wait
    #[arg(long)]
    pub wait_secs: Option<u64>,

    /// Log file, appended to on every run
    #[arg(long)]
    pub log_file: Option<String>,

    /// Prefix of the per-run image directory
    #[arg(long)]
    pub image_dir_prefix: Option<String>,

    /// Contact e-mail sent to the translation service
    #[arg(long, env = "MYMEMORY_EMAIL")]
    pub translate_email: Option<String>,

    /// Write a JSON report of the run to this path
    #[arg(long)]
    pub report_json: Option<String>,
}

impl Cli {
    /// Resolve the final settings: defaults, then the YAML file, then flags.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        self.apply(&mut settings);
        Ok(settings)
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            settings.webdriver_url = webdriver_url.clone();
        }
        if let Some(backend) = self.backend {
            settings.backend = backend;
        }
        if let Some(n) = self.num_articles {
            settings.num_articles = n;
        }
        if let Some(n) = self.max_links {
            settings.max_links = n;
        }
        if let Some(secs) = self.wait_secs {
            settings.wait_secs = secs;
        }
        if let Some(log_file) = &self.log_file {
            settings.log_file = log_file.clone();
        }
        if let Some(prefix) = &self.image_dir_prefix {
            settings.image_dir_prefix = prefix.clone();
        }
        if let Some(email) = &self.translate_email {
            settings.translation.email = Some(email.clone());
        }
        if let Some(path) = &self.report_json {
            settings.report_json = Some(path.clone());
        }
    }
}
