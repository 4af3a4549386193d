use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::foundation::error::{BotError, BotResult};

/// Default endpoint of the public TinyURL creation API.
pub const TINYURL_ENDPOINT: &str = "https://tinyurl.com/api-create.php";

/// Turns a long URL into a short one.
#[async_trait]
pub trait Shortener: Send + Sync {
    async fn shorten(&self, long_url: &str) -> BotResult<String>;
}

/// [`Shortener`] that calls a TinyURL-compatible `GET <endpoint>?url=<long>` API returning the
/// short URL as plain text.
#[derive(Clone, Debug)]
pub struct TinyUrlShortener {
    client: reqwest::Client,
    endpoint: Url,
}

impl TinyUrlShortener {
    pub fn new(endpoint: &str) -> BotResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            BotError::validation(format!("invalid shortener endpoint '{endpoint}': {e}"))
        })?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("roundnote/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| BotError::validation(format!("failed to build http client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    /// Full request URL for `long_url`.
    pub fn request_url(&self, long_url: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("url", long_url);
        url
    }
}

#[async_trait]
impl Shortener for TinyUrlShortener {
    async fn shorten(&self, long_url: &str) -> BotResult<String> {
        let long_url = long_url.trim();
        if long_url.is_empty() {
            return Err(BotError::shorten_failed("nothing to shorten"));
        }

        let response = self
            .client
            .get(self.request_url(long_url))
            .send()
            .await
            .map_err(|e| BotError::shorten_failed(format!("request failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BotError::shorten_failed(format!("failed to read response: {e}")))?;
        parse_short_url(status.as_u16(), &body)
            .inspect(|short| debug!(short = %short, "shortened url"))
    }
}

pub(crate) fn parse_short_url(status: u16, body: &str) -> BotResult<String> {
    let body = body.trim();
    if !(200..300).contains(&status) {
        return Err(BotError::shorten_failed(format!(
            "service answered {status}: {body}"
        )));
    }
    match Url::parse(body) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(body.to_string()),
        _ => Err(BotError::shorten_failed(format!(
            "service returned an unexpected body: {body}"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/links/shorten.rs"]
mod tests;
