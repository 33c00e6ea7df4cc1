//! A [`PageSession`] over plain HTML, for pages that render server-side.
//!
//! Pages are fetched through an [`HtmlSource`] and queried with `scraper`.
//! Nothing executes JavaScript, so clicks are accepted and ignored, and every
//! element counts as clickable. Each `find_all` snapshots the matched
//! elements' text and attributes; handles index into that snapshot until the
//! next navigation.

use super::{ElementHandle, PageSession};
use crate::error::{Result, ScrapeError};
use itertools::Itertools;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

/// Where page HTML comes from.
pub trait HtmlSource {
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP with a Spanish `Accept-Language`.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(accept_languages: &str) -> Result<Self> {
        let value = HeaderValue::from_str(accept_languages).map_err(|e| {
            error!(accept_languages, error = %e, "Rejected accept_languages setting");
            ScrapeError::Config(format!("accept_languages {accept_languages:?}: {e}"))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, value);
        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

impl HtmlSource for HttpSource {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[derive(Debug)]
struct Snapshot {
    text: String,
    attributes: HashMap<String, String>,
}

pub struct StaticSession<H> {
    source: H,
    page_url: Option<Url>,
    html: String,
    elements: Vec<Snapshot>,
    closed: bool,
}

impl<H: HtmlSource> StaticSession<H> {
    pub fn new(source: H) -> Self {
        Self {
            source,
            page_url: None,
            html: String::new(),
            elements: Vec::new(),
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(ScrapeError::UnexpectedResponse(
                "static session already closed".to_string(),
            ));
        }
        Ok(())
    }

    fn snapshot(&self, element: &ElementHandle) -> Result<&Snapshot> {
        element
            .0
            .strip_prefix("static-")
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| self.elements.get(index))
            .ok_or_else(|| ScrapeError::UnknownElement(element.0.clone()))
    }

    fn resolve(&self, value: &str) -> String {
        self.page_url
            .as_ref()
            .and_then(|base| base.join(value).ok())
            .map(|url| url.to_string())
            .unwrap_or_else(|| value.to_string())
    }
}

impl<H: HtmlSource> PageSession for StaticSession<H> {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.ensure_open()?;
        let html = self.source.fetch_html(url).await?;
        debug!(url, bytes = html.len(), "Loaded static page");
        self.page_url = Url::parse(url).ok();
        self.html = html;
        self.elements.clear();
        Ok(())
    }

    async fn find_all(&mut self, css: &str) -> Result<Vec<ElementHandle>> {
        self.ensure_open()?;
        let selector =
            Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{css}: {e}")))?;
        let document = Html::parse_document(&self.html);

        let mut handles = Vec::new();
        for element in document.select(&selector) {
            let text = element.text().collect::<String>().split_whitespace().join(" ");
            let attributes = element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            handles.push(ElementHandle(format!("static-{}", self.elements.len())));
            self.elements.push(Snapshot { text, attributes });
        }
        Ok(handles)
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String> {
        self.ensure_open()?;
        Ok(self.snapshot(element)?.text.clone())
    }

    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        self.ensure_open()?;
        let value = self.snapshot(element)?.attributes.get(name).cloned();
        Ok(match name {
            "href" | "src" => value.map(|v| self.resolve(&v)),
            _ => value,
        })
    }

    async fn is_clickable(&mut self, element: &ElementHandle) -> Result<bool> {
        self.ensure_open()?;
        self.snapshot(element).map(|_| true)
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.ensure_open()?;
        self.snapshot(element).map(|_| ())
    }

    async fn quit(&mut self) -> Result<()> {
        self.closed = true;
        self.elements.clear();
        Ok(())
    }
}
