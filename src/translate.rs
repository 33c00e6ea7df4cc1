//! Headline translation through the MyMemory public API.
//!
//! ```text
//! GET https://api.mymemory.translated.net/get?q=<text>&langpair=es|en[&de=<email>]
//! {"responseData": {"translatedText": "..."}, "responseStatus": 200, "quotaFinished": false}
//! ```
//!
//! MyMemory reports some failures with HTTP 200 and an error status in the
//! body (`responseStatus` may be a number or a string), so both are checked.
//! [`translate_title`] is the best-effort entry point: it never fails and
//! falls back to the untranslated text.

use crate::config::TranslationSettings;
use crate::error::{Result, ScrapeError};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

/// Translates text between the configured languages.
pub trait Translator {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// [`Translator`] for the MyMemory `get` endpoint.
///
/// The optional contact email is sent as `de`, which raises the anonymous
/// daily quota.
#[derive(Debug)]
pub struct MyMemoryTranslator {
    client: Client,
    endpoint: Url,
    langpair: String,
    email: Option<String>,
}

impl MyMemoryTranslator {
    /// Build a client for `settings.endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Url`] if the endpoint is not a valid URL, or
    /// [`ScrapeError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &TranslationSettings) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(&settings.endpoint)?,
            langpair: format!("{}|{}", settings.source_lang, settings.target_lang),
            email: settings.email.clone(),
        })
    }

    fn request_url(&self, text: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", text).append_pair("langpair", &self.langpair);
            if let Some(email) = &self.email {
                query.append_pair("de", email);
            }
        }
        url
    }
}

impl Translator for MyMemoryTranslator {
    #[instrument(level = "debug", skip(self))]
    async fn translate(&self, text: &str) -> Result<String> {
        let response = self.client.get(self.request_url(text)).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ScrapeError::Translation(format!(
                "status {}: {}",
                status.as_u16(),
                truncate_for_log(&body, 200)
            )));
        }
        parse_response(&body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: ResponseData,
    #[serde(default)]
    response_status: Value,
    #[serde(default)]
    response_details: Option<String>,
    #[serde(default)]
    quota_finished: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

fn parse_response(body: &str) -> Result<String> {
    let response: MyMemoryResponse = serde_json::from_str(body)?;

    let status = match &response.response_status {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    if status != Some(200) {
        return Err(ScrapeError::Translation(format!(
            "service status {}: {}",
            response.response_status,
            response.response_details.unwrap_or_default()
        )));
    }
    if response.quota_finished == Some(true) {
        return Err(ScrapeError::Translation("daily quota exhausted".to_string()));
    }
    match response.response_data.translated_text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ScrapeError::Translation("empty translation".to_string())),
    }
}

/// Translate `title`, or return it unchanged if translation fails.
///
/// # Arguments
///
/// * `translator` - Any [`Translator`]
/// * `title` - Spanish headline
///
/// # Returns
///
/// The translation, or `title` itself after logging the error.
pub async fn translate_title<T: Translator>(translator: &T, title: &str) -> String {
    match translator.translate(title).await {
        Ok(translated) => {
            debug!(original = %title, %translated, "Translated title");
            translated
        }
        Err(e) => {
            error!(error = %e, %title, "Translation error");
            title.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTranslator, StubServer};

    fn translator_for(server: &StubServer) -> MyMemoryTranslator {
        MyMemoryTranslator::new(&TranslationSettings {
            endpoint: format!("{}/get", server.url),
            ..TranslationSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_url_encodes_query() {
        let translator = MyMemoryTranslator::new(&TranslationSettings {
            email: Some("me@example.com".to_string()),
            ..TranslationSettings::default()
        })
        .unwrap();
        let url = translator.request_url("¿Qué pasa, España?");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("api.mymemory.translated.net"));
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "¿Qué pasa, España?".to_string()),
                ("langpair".to_string(), "es|en".to_string()),
                ("de".to_string(), "me@example.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_response_success() {
        let body = r#"{"responseData":{"translatedText":"The end of the war","match":1},
                      "quotaFinished":false,"responseDetails":"","responseStatus":200}"#;
        assert_eq!(parse_response(body).unwrap(), "The end of the war");
    }

    #[test]
    fn test_parse_response_string_status() {
        let body = r#"{"responseData":{"translatedText":"INVALID LANGUAGE PAIR"},
                      "responseDetails":"INVALID LANGUAGE PAIR","responseStatus":"403"}"#;
        assert!(matches!(
            parse_response(body),
            Err(ScrapeError::Translation(_))
        ));
    }

    #[test]
    fn test_parse_response_quota_finished() {
        let body = r#"{"responseData":{"translatedText":"MYMEMORY WARNING"},
                      "quotaFinished":true,"responseStatus":200}"#;
        assert!(parse_response(body).is_err());
    }

    #[test]
    fn test_parse_response_garbage() {
        assert!(matches!(
            parse_response("<html>busy</html>"),
            Err(ScrapeError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_translate_title_falls_back_to_original() {
        let translator = FakeTranslator::new().failing_on("Se acabó");
        assert_eq!(translate_title(&translator, "Se acabó").await, "Se acabó");
        assert_eq!(translate_title(&translator, "Hola").await, "EN(Hola)");
    }

    #[tokio::test]
    async fn test_translate_reads_service_response() {
        let body = r#"{"responseData":{"translatedText":"The war"},"responseStatus":200}"#;
        let server = StubServer::start(vec![(200, body)]).await;

        let translated = translator_for(&server).translate("La guerra").await.unwrap();

        assert_eq!(translated, "The war");
        assert_eq!(server.requests().len(), 1);
        assert!(server.requests()[0].starts_with("GET /get?q=La"));
    }

    #[tokio::test]
    async fn test_translate_http_error_status() {
        let server = StubServer::start(vec![(503, "Service Unavailable")]).await;
        let translator = translator_for(&server);

        match translator.translate("La guerra").await {
            Err(ScrapeError::Translation(message)) => {
                assert_eq!(message, "status 503: Service Unavailable")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(translate_title(&translator, "La guerra").await, "La guerra");
    }
}
