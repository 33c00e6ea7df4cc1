//! Page sessions: the browser seam the scrapers talk to.
//!
//! Scrapers never see a concrete browser. They drive a [`PageSession`], which
//! loads pages, finds elements by CSS selector and reads their text and
//! attributes through opaque [`ElementHandle`]s.
//!
//! # Backends
//!
//! | Backend | Module | Notes |
//! |---------|--------|-------|
//! | WebDriver | [`webdriver`] | Chrome via chromedriver, runs JavaScript, can click |
//! | Static | [`static_html`] | HTTP GET + `scraper`, no JavaScript |
//!
//! [`AnySession`] picks one at runtime from [`Settings::backend`].
//! Polling with a timeout lives in [`wait`].

pub mod static_html;
pub mod wait;
pub mod webdriver;

use crate::config::{Backend, Settings};
use crate::error::Result;
use static_html::{HttpSource, StaticSession};
use tracing::info;
use webdriver::{BrowserOptions, WebDriverSession};

/// Reference to an element found on the current page.
///
/// Handles are only valid until the next navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

/// A live page the scraper can navigate and inspect.
pub trait PageSession {
    /// Load `url` and make it the current page.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// All elements currently matching `css`, in document order. An empty
    /// result is not an error.
    async fn find_all(&mut self, css: &str) -> Result<Vec<ElementHandle>>;

    /// Rendered text of the element.
    async fn text(&mut self, element: &ElementHandle) -> Result<String>;

    /// Attribute value. `href` and `src` are resolved to absolute URLs.
    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    /// Whether the element is displayed and enabled.
    async fn is_clickable(&mut self, element: &ElementHandle) -> Result<bool>;

    async fn click(&mut self, element: &ElementHandle) -> Result<()>;

    /// Release the session. Further calls fail.
    async fn quit(&mut self) -> Result<()>;
}

/// Session chosen at runtime from the configured [`Backend`].
pub enum AnySession {
    WebDriver(WebDriverSession),
    Static(StaticSession<HttpSource>),
}

impl AnySession {
    pub async fn connect(settings: &Settings) -> Result<Self> {
        match settings.backend {
            Backend::WebDriver => {
                let options = BrowserOptions::from_settings(settings);
                let session = WebDriverSession::start(&settings.webdriver_url, &options).await?;
                info!(endpoint = %settings.webdriver_url, "Started WebDriver session");
                Ok(Self::WebDriver(session))
            }
            Backend::Static => {
                let source = HttpSource::new(&settings.accept_languages)?;
                info!("Using static HTML session");
                Ok(Self::Static(StaticSession::new(source)))
            }
        }
    }
}

impl PageSession for AnySession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        match self {
            Self::WebDriver(s) => s.goto(url).await,
            Self::Static(s) => s.goto(url).await,
        }
    }

    async fn find_all(&mut self, css: &str) -> Result<Vec<ElementHandle>> {
        match self {
            Self::WebDriver(s) => s.find_all(css).await,
            Self::Static(s) => s.find_all(css).await,
        }
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String> {
        match self {
            Self::WebDriver(s) => s.text(element).await,
            Self::Static(s) => s.text(element).await,
        }
    }

    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        match self {
            Self::WebDriver(s) => s.attribute(element, name).await,
            Self::Static(s) => s.attribute(element, name).await,
        }
    }

    async fn is_clickable(&mut self, element: &ElementHandle) -> Result<bool> {
        match self {
            Self::WebDriver(s) => s.is_clickable(element).await,
            Self::Static(s) => s.is_clickable(element).await,
        }
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        match self {
            Self::WebDriver(s) => s.click(element).await,
            Self::Static(s) => s.click(element).await,
        }
    }

    async fn quit(&mut self) -> Result<()> {
        match self {
            Self::WebDriver(s) => s.quit().await,
            Self::Static(s) => s.quit().await,
        }
    }
}
