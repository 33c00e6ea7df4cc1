//! Test doubles for the page, download and translation seams.

use crate::browser::static_html::HtmlSource;
use crate::browser::wait::Wait;
use crate::browser::{ElementHandle, PageSession};
use crate::config::Settings;
use crate::error::{Result, ScrapeError};
use crate::images::{Download, ImageDownloader};
use crate::translate::Translator;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Settings pointing at `https://elpais.test` with no delays and zero-length
/// waits, so lookups poll exactly once.
pub fn test_settings() -> Settings {
    Settings {
        base_url: "https://elpais.test".to_string(),
        wait_secs: 0,
        poll_interval_ms: 1,
        settle_ms: 0,
        consent_settle_ms: 0,
        ..Settings::default()
    }
}

pub fn listing_page(hrefs: &[&str]) -> String {
    let items: String = hrefs
        .iter()
        .map(|href| format!(r#"<article><h2><a href="{href}">Columna</a></h2></article>"#))
        .collect();
    format!("<html><body><main>{items}</main></body></html>")
}

pub fn article_page(title: &str, paragraphs: &[&str], image: Option<&str>) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    let img = image
        .map(|src| format!(r#"<figure><img src="{src}"></figure>"#))
        .unwrap_or_default();
    format!("<html><body><article><header><h1>{title}</h1></header>{img}<div>{body}</div></article></body></html>")
}

/// HTML pages served from memory; records every URL requested.
#[derive(Default)]
pub struct MemorySource {
    pages: HashMap<String, String>,
    visits: Arc<Mutex<Vec<String>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn visits(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.visits)
    }
}

impl HtmlSource for MemorySource {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        self.visits.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::UnexpectedResponse(format!("404 for {url}")))
    }
}

/// A session whose behaviour is set per selector: elements that show up after
/// N polls, selectors whose lookup fails, URLs that fail to load.
#[derive(Default)]
pub struct ScriptedSession {
    appear_after: HashMap<String, usize>,
    failing_finds: HashSet<String>,
    hidden: HashSet<String>,
    failing_gotos: HashSet<String>,
    find_calls: HashMap<String, usize>,
    visited: Vec<String>,
    clicks: usize,
    quits: Rc<Cell<usize>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// `css` matches one element once it has been polled `polls` times.
    pub fn appearing_after(mut self, css: &str, polls: usize) -> Self {
        self.appear_after.insert(css.to_string(), polls);
        self
    }

    pub fn failing_find(mut self, css: &str) -> Self {
        self.failing_finds.insert(css.to_string());
        self
    }

    pub fn not_clickable(mut self, css: &str) -> Self {
        self.hidden.insert(css.to_string());
        self
    }

    pub fn failing_goto(mut self, url: &str) -> Self {
        self.failing_gotos.insert(url.to_string());
        self
    }

    pub fn find_calls(&self, css: &str) -> usize {
        self.find_calls.get(css).copied().unwrap_or(0)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.clone()
    }

    pub fn clicks(&self) -> usize {
        self.clicks
    }

    pub fn quit_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.quits)
    }
}

impl PageSession for ScriptedSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.visited.push(url.to_string());
        if self.failing_gotos.contains(url) {
            return Err(ScrapeError::UnexpectedResponse(format!("cannot load {url}")));
        }
        Ok(())
    }

    async fn find_all(&mut self, css: &str) -> Result<Vec<ElementHandle>> {
        let calls = self.find_calls.entry(css.to_string()).or_insert(0);
        *calls += 1;
        if self.failing_finds.contains(css) {
            return Err(ScrapeError::UnexpectedResponse(format!("lookup failed: {css}")));
        }
        match self.appear_after.get(css) {
            Some(polls) if *calls > *polls => Ok(vec![ElementHandle(css.to_string())]),
            _ => Ok(Vec::new()),
        }
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String> {
        Ok(format!("text of {}", element.0))
    }

    async fn attribute(&mut self, _element: &ElementHandle, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn is_clickable(&mut self, element: &ElementHandle) -> Result<bool> {
        Ok(!self.hidden.contains(&element.0))
    }

    async fn click(&mut self, _element: &ElementHandle) -> Result<()> {
        self.clicks += 1;
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        self.quits.set(self.quits.get() + 1);
        Ok(())
    }
}

/// Wraps a session so that everything works except releasing it.
pub struct FailingQuit<S> {
    inner: S,
    quits: Rc<Cell<usize>>,
}

impl<S> FailingQuit<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            quits: Rc::default(),
        }
    }

    pub fn quit_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.quits)
    }
}

impl<S: PageSession> PageSession for FailingQuit<S> {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.inner.goto(url).await
    }

    async fn find_all(&mut self, css: &str) -> Result<Vec<ElementHandle>> {
        self.inner.find_all(css).await
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String> {
        self.inner.text(element).await
    }

    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        self.inner.attribute(element, name).await
    }

    async fn is_clickable(&mut self, element: &ElementHandle) -> Result<bool> {
        self.inner.is_clickable(element).await
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.inner.click(element).await
    }

    async fn quit(&mut self) -> Result<()> {
        self.quits.set(self.quits.get() + 1);
        Err(ScrapeError::UnexpectedResponse("browser already gone".to_string()))
    }
}

/// A loopback HTTP/1.1 server. The n-th request gets the n-th canned
/// `(status, body)` response, and the last one repeats. Request lines are
/// recorded as `"METHOD /path"`.
pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let line = read_request_line(&mut socket).await;
                let served = {
                    let mut seen = seen.lock().unwrap();
                    seen.push(line);
                    seen.len() - 1
                };
                let (status, body) = responses[served.min(responses.len() - 1)];
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { url, requests }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Reads one request (head plus `Content-Length` body) and returns its
/// method and path.
async fn read_request_line(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let mut head_len = None;
    let mut wanted = usize::MAX;

    while buf.len() < wanted {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if head_len.is_some() {
            continue;
        }
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_string();
            let body_len = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            head_len = Some(pos + 4);
            wanted = pos + 4 + body_len;
        }
    }

    let head = String::from_utf8_lossy(&buf[..head_len.unwrap_or(buf.len())]).to_string();
    head.lines()
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .take(2)
        .join(" ")
}

/// Serves the same response for every URL and records the requests.
pub struct FakeDownloader {
    status: u16,
    chunks: Vec<Vec<u8>>,
    interrupted: bool,
    unreachable: bool,
    requests: Mutex<Vec<String>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self {
            status: 200,
            chunks: Vec::new(),
            interrupted: false,
            unreachable: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks;
        self
    }

    /// The body stream fails after the configured chunks.
    pub fn interrupted(mut self) -> Self {
        self.interrupted = true;
        self
    }

    /// `get` itself fails, as on a connection error.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl ImageDownloader for FakeDownloader {
    async fn get(&self, url: &str) -> Result<Download> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.unreachable {
            return Err(ScrapeError::UnexpectedResponse("connection refused".to_string()));
        }
        let mut items: Vec<Result<Vec<u8>>> = self.chunks.iter().cloned().map(Ok).collect();
        if self.interrupted {
            items.push(Err(ScrapeError::UnexpectedResponse("connection reset".to_string())));
        }
        Ok(Download {
            status: self.status,
            body: stream::iter(items).boxed(),
        })
    }
}

/// Translates known titles from a table, everything else to `EN(<title>)`,
/// and fails for titles marked as failing.
#[derive(Default)]
pub struct FakeTranslator {
    table: HashMap<String, String>,
    failing: HashSet<String>,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, from: &str, to: &str) -> Self {
        self.table.insert(from.to_string(), to.to_string());
        self
    }

    pub fn failing_on(mut self, title: &str) -> Self {
        self.failing.insert(title.to_string());
        self
    }
}

impl Translator for FakeTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        if self.failing.contains(text) {
            return Err(ScrapeError::Translation(format!("cannot translate {text}")));
        }
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("EN({text})")))
    }
}

#[test]
fn test_settings_waits_are_instant() {
    assert_eq!(
        test_settings().wait(),
        Wait::new(Duration::ZERO, Duration::from_millis(1))
    );
}
