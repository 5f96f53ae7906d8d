use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use crate::error::{AppError, Result};

const USER_AGENT: &str = concat!("gist-search/", env!("CARGO_PKG_VERSION"));

/// Status and body of one upstream GET.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse<T> {
    pub status: u16,
    pub body: T,
}

impl<T> UpstreamResponse<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Unwraps the body of a 2xx response, turning any other status into an upstream error.
    pub fn into_success(self, url: &str) -> Result<T> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(AppError::Upstream(format!("GET {} returned {}", url, self.status)))
        }
    }
}

/// Plain GET access to the gist service.
///
/// Only transport failures are errors here; status codes are left to the
/// caller, which is the only one that knows whether a 404 means "no such user"
/// or "something broke".
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// GET `url` and parse a successful body as JSON. Non-2xx bodies are not parsed.
    async fn get_json(&self, url: &str) -> Result<UpstreamResponse<Value>>;

    /// GET `url` and return the body as text.
    async fn get_text(&self, url: &str) -> Result<UpstreamResponse<String>>;
}

/// `UpstreamClient` over a pooled reqwest client.
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new() -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn get_json(&self, url: &str) -> Result<UpstreamResponse<Value>> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Ok(UpstreamResponse { status: status.as_u16(), body: Value::Null });
        }

        let text = response.text().await?;
        let body = serde_json::from_str(&text)?;
        Ok(UpstreamResponse { status: status.as_u16(), body })
    }

    async fn get_text(&self, url: &str) -> Result<UpstreamResponse<String>> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(UpstreamResponse { status, body })
    }
}

/// URL builder for the GitHub REST endpoints used by the search.
#[derive(Debug, Clone)]
pub struct GithubApi {
    base_url: String,
}

impl GithubApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn user_url(&self, username: &str) -> String {
        format!("{}/users/{}", self.base_url, urlencoding::encode(username))
    }

    pub fn gists_page_url(&self, username: &str, per_page: usize, page: usize) -> String {
        format!(
            "{}/users/{}/gists?per_page={}&page={}",
            self.base_url,
            urlencoding::encode(username),
            per_page,
            page
        )
    }
}
