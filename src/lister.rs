use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::gist::Gist;
use crate::upstream::{GithubApi, UpstreamClient};

/// Largest page the gists endpoint serves.
pub const PER_PAGE: usize = 100;
/// The endpoint stops serving after 3000 gists.
pub const MAX_PAGES: usize = 30;

/// Enumerates every public gist of a user.
pub struct GistLister {
    upstream: Arc<dyn UpstreamClient>,
    api: GithubApi,
    per_page: usize,
    max_pages: usize,
}

impl GistLister {
    pub fn new(upstream: Arc<dyn UpstreamClient>, api: GithubApi) -> Self {
        Self {
            upstream,
            api,
            per_page: PER_PAGE,
            max_pages: MAX_PAGES,
        }
    }

    /// Distinguishes "no such user" from every other failure before listing.
    pub async fn ensure_user_exists(&self, username: &str) -> Result<()> {
        let url = self.api.user_url(username);
        let response = self.upstream.get_json(&url).await?;

        match response.status {
            404 => Err(AppError::UserNotFound(username.to_string())),
            _ => response.into_success(&url).map(|_| ()),
        }
    }

    /// Existence check, then every page of the user's gists in server order.
    ///
    /// Paging continues while the last page came back full, up to `MAX_PAGES`.
    /// Any failed page discards what was collected so far.
    pub async fn list(&self, username: &str) -> Result<Vec<Gist>> {
        self.ensure_user_exists(username).await?;

        let mut gists = Vec::new();
        for page in 1..=self.max_pages {
            let batch = self.fetch_page(username, page).await?;
            let full = batch.len() == self.per_page;
            gists.extend(batch);

            if !full {
                break;
            }
            if page == self.max_pages {
                warn!("Stopped listing gists for {} at the {} page cap", username, self.max_pages);
            }
        }

        info!("Listed {} gists for {}", gists.len(), username);
        Ok(gists)
    }

    async fn fetch_page(&self, username: &str, page: usize) -> Result<Vec<Gist>> {
        let url = self.api.gists_page_url(username, self.per_page, page);
        let body = self.upstream.get_json(&url).await?.into_success(&url)?;
        let batch: Vec<Gist> = serde_json::from_value(body)?;
        debug!("Page {} of {}'s gists had {} entries", page, username, batch.len());
        Ok(batch)
    }
}
