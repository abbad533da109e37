use std::time::Duration;

use url::Url;

use crate::config::CrawlerConfig;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Pagecheck/1.0)";
const LINK_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Classified fetch failures, mapped to distinct HTTP responses upstream.
#[derive(Debug)]
pub enum FetchError {
    Timeout,
    Connect,
    Status(u16),
    Other(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Connect => write!(f, "connection failed"),
            FetchError::Status(code) => write!(f, "server responded with status {code}"),
            FetchError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// Result of a HEAD probe against a single link.
#[derive(Debug, Clone)]
pub struct LinkCheck {
    pub url: String,
    pub status: Option<u16>,
    pub accessible: bool,
    pub error: Option<String>,
}

/// Fetches the target page and probes its links. One instance per analyze
/// request; the client carries the configured timeouts and a browser-like
/// User-Agent so sites serve their normal markup.
pub struct Crawler {
    client: reqwest::Client,
    base: Url,
    read_timeout: Duration,
}

impl Crawler {
    pub fn new(base: Url, config: &CrawlerConfig) -> Result<Self, FetchError> {
        let read_timeout = Duration::from_secs(config.read_timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(read_timeout)
            .build()
            .map_err(|e| FetchError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            read_timeout,
        })
    }

    /// Fetch the page body. A timeout gets one retry with a doubled read
    /// timeout before giving up.
    pub async fn fetch_page(&self) -> Result<String, FetchError> {
        match self.get_text(self.base.clone(), self.read_timeout).await {
            Ok(body) => Ok(body),
            Err(FetchError::Timeout) => {
                tracing::warn!("Timeout fetching {}, retrying with extended timeout", self.base);
                self.get_text(self.base.clone(), self.read_timeout * 2).await
            }
            Err(err) => Err(err),
        }
    }

    async fn get_text(&self, url: Url, timeout: Duration) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let response = response.error_for_status().map_err(classify)?;
        response.text().await.map_err(classify)
    }

    /// HEAD-probe a link, following redirects. 2xx/3xx counts as accessible.
    pub async fn check_link(&self, href: &str) -> LinkCheck {
        let absolute = match self.base.join(href) {
            Ok(url) => url,
            Err(e) => {
                return LinkCheck {
                    url: href.to_string(),
                    status: None,
                    accessible: false,
                    error: Some(format!("malformed URL: {e}")),
                }
            }
        };

        match self
            .client
            .head(absolute.clone())
            .timeout(LINK_CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                LinkCheck {
                    url: absolute.to_string(),
                    status: Some(status),
                    accessible: (200..400).contains(&status),
                    error: None,
                }
            }
            Err(e) => LinkCheck {
                url: absolute.to_string(),
                status: None,
                accessible: false,
                error: Some(classify(e).to_string()),
            },
        }
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() {
        FetchError::Connect
    } else if let Some(status) = err.status() {
        FetchError::Status(status.as_u16())
    } else {
        FetchError::Other(err.to_string())
    }
}
