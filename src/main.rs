//! # El País Opinion
//!
//! Scrapes today's and yesterday's opinion articles from El País, downloads
//! each article's lead image, translates the headlines from Spanish to
//! English and reports the words repeated across the translations.
//!
//! ## Usage
//!
//! ```sh
//! # chromedriver listening on localhost:9515
//! elpais_opinion
//!
//! # without a browser
//! elpais_opinion --backend static
//! ```
//!
//! ## Architecture
//!
//! The run is a sequential pipeline (see [`pipeline`]):
//! 1. **Navigation**: open the site, accept cookies, go to `/opinion`
//! 2. **Links**: keep article links dated today or yesterday
//! 3. **Extraction**: title, paragraphs and image for each link until five
//!    articles are collected
//! 4. **Translation**: each headline through MyMemory, falling back to the
//!    original on failure
//! 5. **Analysis**: words appearing more than twice across translations
//!
//! Images land in `article_images_<YYYYMMDD_HHMMSS>/`, logs in
//! `elpais_scraper.log` and on stdout.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info};

mod analysis;
mod browser;
mod cli;
mod config;
mod error;
mod images;
mod logging;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
#[cfg(test)]
mod testing;
mod translate;
mod utils;

use browser::AnySession;
use cli::Cli;
use config::Settings;
use images::HttpDownloader;
use models::RunReport;
use outputs::{console, json};
use pipeline::ArticleAnalyzer;
use translate::MyMemoryTranslator;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = try_main().await {
        println!("Error in main execution: {e}");
    }
}

async fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let settings = args.settings()?;

    // Held until the run ends; logging stops with it.
    let _log_guard = logging::init(&settings.log_file)?;
    debug!(?settings, "Resolved settings");

    if let Err(e) = run(settings).await {
        error!(error = %e, "Run failed");
        return Err(e.into());
    }
    Ok(())
}

async fn run(settings: Settings) -> error::Result<()> {
    let start_time = std::time::Instant::now();
    info!("elpais_opinion starting up");

    let image_dir =
        utils::create_run_dir(Path::new("."), &settings.image_dir_prefix, &Local::now()).await?;
    let downloader = HttpDownloader::new()?;
    let translator = MyMemoryTranslator::new(&settings.translation)?;
    let session = AnySession::connect(&settings).await?;

    let num_articles = settings.num_articles;
    let mut analyzer = ArticleAnalyzer::new(session, downloader, translator, settings, image_dir);
    let articles = analyzer.process_articles(num_articles).await?;

    if articles.is_empty() {
        println!("No articles to analyze.");
        info!("No articles to analyze");
        return Ok(());
    }

    let (translations, report) = analyzer.analyze_translated_headers(&articles).await;
    console::print_repeated_words(&report);

    if let Some(path) = &analyzer.settings().report_json {
        let run_report = RunReport {
            generated_at: Local::now().to_rfc3339(),
            articles,
            translations,
            repeated_words: report.repeated_map(),
        };
        if let Err(e) = json::write_report(&run_report, path).await {
            error!(%path, error = %e, "Failed to write JSON report");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        image_dir = %analyzer.image_dir().display(),
        "Execution complete"
    );
    Ok(())
}
