// Page fetcher trait and the reqwest-backed implementation.
//
// The crawler only ever talks to `PageFetcher`, so tests can script a whole
// site in memory and count every fetch without touching the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{FetchError, PulseError, PulseResult};

const USER_AGENT: &str = "Mozilla/5.0 SitePulse/1.0";

/// Keeps the server from sending media we would throw away.
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,text/plain";

/// A fetched HTML document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects. Relative links resolve against this.
    pub final_url: Url,
    pub html: String,
}

/// Fetches one page. Implementations must classify failures as transient
/// (worth a retry) or permanent.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Plain HTTP fetcher. Static HTML only; no script execution.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> PulseResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.page_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| PulseError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        debug!(url = %url, "HTTP GET");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| {
                if e.is_redirect() {
                    FetchError::Permanent(format!("too many redirects: {e}"))
                } else {
                    FetchError::Transient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_text_content(content_type) {
                return Err(FetchError::Permanent(format!(
                    "unsupported content type {content_type}"
                )));
            }
        }

        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Transient(format!("failed to read body: {e}")))?;

        Ok(FetchedPage { final_url, html })
    }
}

/// 429 and 5xx may succeed on retry; every other error status will not.
pub fn classify_status(status: StatusCode) -> FetchError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        FetchError::Transient(format!("HTTP {status}"))
    } else {
        FetchError::Permanent(format!("HTTP {status}"))
    }
}

fn is_text_content(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("html") || lower.contains("text/plain") || lower.contains("xml")
}
