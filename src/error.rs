//! Error type shared by the scraper, its collaborators and the CLI.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("WebDriver error (status {status}) {error}: {message}")]
    WebDriver {
        status: u16,
        error: String,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Unknown element handle: {0}")]
    UnknownElement(String),

    #[error("Translation error: {0}")]
    Translation(String),
}
