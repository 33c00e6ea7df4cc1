//! W3C WebDriver client for driving Chrome through chromedriver.
//!
//! Only the handful of commands the scraper needs are implemented: new
//! session, navigate, find elements, element text/property/state, click and
//! delete session. Every command is a JSON request to
//! `{endpoint}/session/{id}/...` whose response wraps the result in `value`.
//!
//! ```text
//! POST   /session                              new session (capabilities)
//! POST   /session/{id}/url                     navigate
//! POST   /session/{id}/elements                find elements (css selector)
//! GET    /session/{id}/element/{el}/text       rendered text
//! GET    /session/{id}/element/{el}/property/… DOM property (resolved href/src)
//! GET    /session/{id}/element/{el}/displayed  visibility (chromedriver)
//! GET    /session/{id}/element/{el}/enabled    enabled state
//! POST   /session/{id}/element/{el}/click      click
//! DELETE /session/{id}                         quit
//! ```

use super::{ElementHandle, PageSession};
use crate::config::Settings;
use crate::error::{Result, ScrapeError};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Key under which WebDriver serializes element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Chrome launch options sent as `goog:chromeOptions`.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserOptions {
    pub args: Vec<String>,
    pub accept_languages: String,
}

impl BrowserOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            args: settings.browser_args.clone(),
            accept_languages: settings.accept_languages.clone(),
        }
    }

    /// New-session request body.
    pub fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": self.args,
                        "prefs": { "intl.accept_languages": self.accept_languages },
                    }
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

/// One chromedriver session.
///
/// After [`PageSession::quit`] the session is closed: further commands fail
/// without touching the network and repeated quits are no-ops.
pub struct WebDriverSession {
    client: Client,
    endpoint: String,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    /// Open a new browser session on the WebDriver server at `endpoint`.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Base URL of the server, e.g. `http://localhost:9515`
    /// * `options` - Chrome arguments and locale preferences
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::WebDriver`] if the server refuses the session,
    /// or [`ScrapeError::Http`] if it cannot be reached.
    #[instrument(level = "info", skip(options))]
    pub async fn start(endpoint: &str, options: &BrowserOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        let endpoint = endpoint.trim_end_matches('/').to_string();

        let value = send(
            &client,
            Method::POST,
            &format!("{endpoint}/session"),
            Some(options.capabilities()),
        )
        .await?;
        let session: NewSession = serde_json::from_value(value)?;
        debug!(session_id = %session.session_id, "WebDriver session created");

        Ok(Self {
            client,
            endpoint,
            session_id: session.session_id,
            closed: false,
        })
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        if self.closed {
            return Err(ScrapeError::UnexpectedResponse(
                "WebDriver session already closed".to_string(),
            ));
        }
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        send(&self.client, method, &url, body).await
    }

    fn element_path(element: &ElementHandle, suffix: &str) -> String {
        format!("/element/{}/{}", element.0, suffix)
    }
}

impl PageSession for WebDriverSession {
    #[instrument(level = "debug", skip(self))]
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn find_all(&mut self, css: &str) -> Result<Vec<ElementHandle>> {
        let value = self
            .command(
                Method::POST,
                "/elements",
                Some(json!({ "using": "css selector", "value": css })),
            )
            .await?;
        element_handles(value)
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String> {
        let value = self
            .command(Method::GET, &Self::element_path(element, "text"), None)
            .await?;
        match value {
            Value::String(text) => Ok(text),
            other => Err(ScrapeError::UnexpectedResponse(format!(
                "element text was {other}"
            ))),
        }
    }

    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        // The property (not the raw attribute) carries resolved URLs.
        let value = self
            .command(
                Method::GET,
                &Self::element_path(element, &format!("property/{name}")),
                None,
            )
            .await?;
        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    async fn is_clickable(&mut self, element: &ElementHandle) -> Result<bool> {
        let displayed = self
            .command(Method::GET, &Self::element_path(element, "displayed"), None)
            .await?;
        if displayed != Value::Bool(true) {
            return Ok(false);
        }
        let enabled = self
            .command(Method::GET, &Self::element_path(element, "enabled"), None)
            .await?;
        Ok(enabled == Value::Bool(true))
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.command(
            Method::POST,
            &Self::element_path(element, "click"),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    #[instrument(level = "info", skip(self), fields(session_id = %self.session_id))]
    async fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let result = self.command(Method::DELETE, "", None).await;
        self.closed = true;
        result.map(|_| ())
    }
}

async fn send(client: &Client, method: Method, url: &str, body: Option<Value>) -> Result<Value> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let err = decode_error(status.as_u16(), &text);
        warn!(status = status.as_u16(), error = %err, "WebDriver command failed");
        return Err(err);
    }
    let wire: WireResponse = serde_json::from_str(&text)?;
    Ok(wire.value)
}

fn decode_error(status: u16, body: &str) -> ScrapeError {
    match serde_json::from_str::<WireResponse>(body)
        .ok()
        .and_then(|wire| serde_json::from_value::<WireError>(wire.value).ok())
    {
        Some(wire) => ScrapeError::WebDriver {
            status,
            error: wire.error,
            message: wire.message,
        },
        None => ScrapeError::WebDriver {
            status,
            error: "unknown error".to_string(),
            message: crate::utils::truncate_for_log(body, 200),
        },
    }
}

fn element_handles(value: Value) -> Result<Vec<ElementHandle>> {
    let Value::Array(items) = value else {
        return Err(ScrapeError::UnexpectedResponse(format!(
            "find elements returned {value}"
        )));
    };
    items
        .into_iter()
        .map(|item| {
            item.get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(|id| ElementHandle(id.to_string()))
                .ok_or_else(|| {
                    ScrapeError::UnexpectedResponse(format!("not an element reference: {item}"))
                })
        })
        .collect()
}
