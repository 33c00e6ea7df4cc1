//! Data produced by a run.
//!
//! - [`Article`]: a scraped opinion piece with title and body
//! - [`TranslatedTitle`]: an article title and its English translation
//! - [`RunReport`]: everything a run found, for the optional JSON report

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A scraped opinion article.
///
/// Only built when both a non-empty title and at least one paragraph were
/// found on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Paragraph texts joined by `\n`.
    pub content: String,
    /// Page the article was scraped from.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedTitle {
    pub original: String,
    /// Equal to `original` when translation failed.
    pub translated: String,
}

/// Summary of a run written by [`crate::outputs::json::write_report`].
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// RFC 3339 local time the report was produced.
    pub generated_at: String,
    pub articles: Vec<Article>,
    pub translations: Vec<TranslatedTitle>,
    /// Words seen more than twice across translated titles, first-seen order.
    pub repeated_words: IndexMap<String, usize>,
}
