//! Search across all public gists of one user.
//!
//! ```text
//! validate -> compile pattern -> user exists? -> list pages -> per gist: resolve + match
//! ```
//!
//! Every stage fails fast. No partial results are returned alongside an
//! error, and nothing is retried.

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::gist::Gist;
use crate::lister::GistLister;
use crate::matcher::Matcher;
use crate::resolver::ContentResolver;
use crate::upstream::{GithubApi, UpstreamClient};

/// Body of `POST /api/v1/search`.
///
/// Both fields are optional at decode time so that a missing or `null`
/// value is reported as a bad parameter rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

impl SearchRequest {
    pub fn new(username: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            pattern: Some(pattern.into()),
        }
    }
}

/// A completed search: canonical URLs of matching gists in listing order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub username: String,
    pub pattern: String,
    pub matches: Vec<String>,
}

pub struct SearchPipeline {
    lister: GistLister,
    resolver: ContentResolver,
    gist_web_url: String,
    concurrency: usize,
}

impl SearchPipeline {
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        cache: Option<Arc<dyn CacheStore>>,
        config: &Config,
    ) -> Self {
        let api = GithubApi::new(config.upstream_base_url.clone());
        Self {
            lister: GistLister::new(upstream.clone(), api),
            resolver: ContentResolver::new(upstream, cache),
            gist_web_url: config.gist_web_url.clone(),
            concurrency: config.concurrency.max(1),
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let username = match request.username.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(AppError::BadRequest("username is required".to_string())),
        };
        let pattern = request
            .pattern
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("pattern is required".to_string()))?;

        let matcher = Matcher::new(pattern)?;
        info!("Searching gists of {} for {:?}", username, pattern);

        let gists = self.lister.list(username).await?;
        let total = gists.len();
        let matcher = &matcher;

        // buffered() yields in input order, so matches keep listing order
        let found: Vec<Option<String>> = stream::iter(gists)
            .map(|gist| async move { self.match_url(&gist, matcher, username).await })
            .buffered(self.concurrency)
            .try_collect()
            .await?;
        let matches: Vec<String> = found.into_iter().flatten().collect();

        info!("{} of {} gists of {} matched", matches.len(), total, username);
        Ok(SearchOutcome {
            username: username.to_string(),
            pattern: pattern.to_string(),
            matches,
        })
    }

    async fn match_url(&self, stub: &Gist, matcher: &Matcher, username: &str) -> Result<Option<String>> {
        let gist = self.resolver.resolve(stub).await?;

        // Files resolve one at a time, so nothing past the first match is downloaded.
        match matcher.first_match(gist.files).await? {
            Some(file) => {
                debug!("Gist {} matched in {}", gist.id, file.filename);
                Ok(Some(stub.canonical_url(&self.gist_web_url, username)))
            }
            None => Ok(None),
        }
    }
}
