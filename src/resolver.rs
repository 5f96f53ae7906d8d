use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::{AppError, Result};
use crate::gist::{FileEntry, Gist, ResolvedFile};
use crate::upstream::UpstreamClient;

/// A gist whose file texts are produced on demand, in manifest order.
///
/// Each file is fetched only when the stream is polled for it, so dropping
/// the stream early leaves the remaining files untouched.
pub struct ResolvedGist<'a> {
    pub id: String,
    pub files: BoxStream<'a, Result<ResolvedFile>>,
}

/// Turns gist stubs into file text, reading through the cache when one is configured.
///
/// Cache keys are the exact URLs fetched. Gist documents are stored as
/// serialized JSON and raw files as plain text; a hit is returned as-is.
pub struct ContentResolver {
    upstream: Arc<dyn UpstreamClient>,
    cache: Option<Arc<dyn CacheStore>>,
}

impl ContentResolver {
    pub fn new(upstream: Arc<dyn UpstreamClient>, cache: Option<Arc<dyn CacheStore>>) -> Self {
        Self { upstream, cache }
    }

    /// The gist with its full file manifest, fetched from its own URL unless the stub already has one.
    pub async fn manifest(&self, stub: &Gist) -> Result<Gist> {
        if stub.has_manifest() {
            return Ok(stub.clone());
        }
        self.fetch_gist(&stub.url).await
    }

    /// Fetches one gist document by its API URL.
    pub async fn fetch_gist(&self, url: &str) -> Result<Gist> {
        let json = match self.cached(url).await {
            Some(json) => json,
            None => {
                let body = self.upstream.get_json(url).await?.into_success(url)?;
                let json = serde_json::to_string(&body)?;
                self.store(url, &json).await;
                json
            }
        };

        Ok(serde_json::from_str(&json)?)
    }

    /// Full text of one file: inline content, or the raw URL's body when truncated.
    pub async fn file_text(&self, file: &FileEntry) -> Result<String> {
        if !file.truncated {
            return Ok(file.content.clone().unwrap_or_default());
        }

        let raw_url = file.raw_url.as_deref().ok_or_else(|| {
            AppError::Internal(format!("truncated file {} has no raw_url", file.filename))
        })?;
        self.fetch_raw(raw_url).await
    }

    /// Fetches the body behind a raw-content URL.
    pub async fn fetch_raw(&self, url: &str) -> Result<String> {
        if let Some(text) = self.cached(url).await {
            return Ok(text);
        }

        let text = self.upstream.get_text(url).await?.into_success(url)?;
        self.store(url, &text).await;
        Ok(text)
    }

    /// Fetches the manifest of `stub` and hands out its file texts lazily.
    pub async fn resolve(&self, stub: &Gist) -> Result<ResolvedGist<'_>> {
        let gist = self.manifest(stub).await?;
        let files = stream::iter(gist.files)
            .then(move |file| self.resolve_file(file))
            .boxed();

        Ok(ResolvedGist { id: gist.id, files })
    }

    async fn resolve_file(&self, file: FileEntry) -> Result<ResolvedFile> {
        let text = self.file_text(&file).await?;
        Ok(ResolvedFile { filename: file.filename, text })
    }

    async fn cached(&self, url: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        let hit = cache.get(url).await;
        debug!("Cache {} for {}", if hit.is_some() { "hit" } else { "miss" }, url);
        hit
    }

    async fn store(&self, url: &str, body: &str) {
        if let Some(cache) = &self.cache {
            cache.set(url, body.to_string()).await;
        }
    }
}
