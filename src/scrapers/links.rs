//! Collecting candidate article links from the listing page.
//!
//! Opinion articles live under `/opinion/<YYYY-MM-DD>/...`. Only links dated
//! today or yesterday qualify.

use crate::browser::PageSession;
use crate::config::Settings;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use tracing::{error, info, instrument, warn};

/// Accepts qualifying links in first-seen order until `max` are held.
#[derive(Debug)]
pub struct LinkFilter {
    allowed: Vec<String>,
    seen: HashSet<String>,
    links: Vec<String>,
    max: usize,
}

impl LinkFilter {
    /// Filter for links dated `today` or the day before.
    pub fn for_date(today: NaiveDate, max: usize) -> Self {
        let yesterday = today - Duration::days(1);
        let allowed = [today, yesterday]
            .iter()
            .map(|date| format!("/opinion/{}/", date.format("%Y-%m-%d")))
            .collect();
        Self {
            allowed,
            seen: HashSet::new(),
            links: Vec::new(),
            max,
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn is_full(&self) -> bool {
        self.links.len() >= self.max
    }

    /// Keep `href` if it qualifies, is new and there is room. Returns whether
    /// it was kept.
    pub fn offer(&mut self, href: &str) -> bool {
        if self.is_full()
            || !self.allowed.iter().any(|segment| href.contains(segment.as_str()))
            || !self.seen.insert(href.to_string())
        {
            return false;
        }
        self.links.push(href.to_string());
        true
    }

    pub fn into_links(self) -> Vec<String> {
        self.links
    }
}

/// Qualifying links on the current page, at most `max_links`. Any failure,
/// including no links showing up in time, yields an empty list.
#[instrument(level = "info", skip(session, settings))]
pub async fn collect_links<S: PageSession>(
    session: &mut S,
    settings: &Settings,
    max_links: usize,
    today: NaiveDate,
) -> Vec<String> {
    let mut filter = LinkFilter::for_date(today, max_links);

    let anchors = match settings
        .wait()
        .until_all_present(session, &settings.selectors.article_link)
        .await
    {
        Ok(anchors) => anchors,
        Err(e) => {
            error!(error = %e, "Error getting article links");
            return Vec::new();
        }
    };
    if anchors.is_empty() {
        warn!(selector = %settings.selectors.article_link, "No article links appeared");
        return Vec::new();
    }

    for anchor in &anchors {
        if filter.is_full() {
            break;
        }
        match session.attribute(anchor, "href").await {
            Ok(Some(href)) => {
                filter.offer(&href);
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "Error getting article links");
                return Vec::new();
            }
        }
    }

    info!(
        candidates = anchors.len(),
        allowed = ?filter.allowed(),
        "Found {} article links matching dates",
        filter.links.len()
    );
    filter.into_links()
}
