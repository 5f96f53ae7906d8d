//! Shared fixtures: a scripted upstream and gist JSON builders.

use async_trait::async_trait;
use gist_search::cache::CacheStore;
use gist_search::config::Config;
use gist_search::error::{AppError, Result};
use gist_search::search::SearchPipeline;
use gist_search::upstream::{UpstreamClient, UpstreamResponse};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const API: &str = "https://api.test";
pub const WEB: &str = "https://gist.test";

#[derive(Clone)]
enum Route {
    Json(u16, Value),
    Text(u16, String),
    Fail,
}

/// In-memory upstream that answers from a route table and records every URL requested.
///
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeUpstream {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
}

#[allow(dead_code)]
impl FakeUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn json(&self, url: impl Into<String>, status: u16, body: Value) {
        self.routes.lock().unwrap().insert(url.into(), Route::Json(status, body));
    }

    pub fn text(&self, url: impl Into<String>, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(url.into(), Route::Text(status, body.to_string()));
    }

    /// Makes `url` fail at the transport level.
    pub fn fail(&self, url: impl Into<String>) {
        self.routes.lock().unwrap().insert(url.into(), Route::Fail);
    }

    /// Delays every response, for deadline tests.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == url).count()
    }

    async fn route(&self, url: &str) -> Option<Route> {
        self.calls.lock().unwrap().push(url.to_string());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.routes.lock().unwrap().get(url).cloned()
    }
}

#[async_trait]
impl UpstreamClient for FakeUpstream {
    async fn get_json(&self, url: &str) -> Result<UpstreamResponse<Value>> {
        match self.route(url).await {
            Some(Route::Json(status, body)) if (200..300).contains(&status) => {
                Ok(UpstreamResponse { status, body })
            }
            Some(Route::Json(status, _)) => Ok(UpstreamResponse { status, body: Value::Null }),
            Some(Route::Text(status, body)) => Ok(UpstreamResponse {
                status,
                body: serde_json::from_str(&body)?,
            }),
            Some(Route::Fail) => Err(AppError::Upstream(format!("connection refused: {}", url))),
            None => Ok(UpstreamResponse { status: 404, body: Value::Null }),
        }
    }

    async fn get_text(&self, url: &str) -> Result<UpstreamResponse<String>> {
        match self.route(url).await {
            Some(Route::Text(status, body)) => Ok(UpstreamResponse { status, body }),
            Some(Route::Json(status, body)) => Ok(UpstreamResponse {
                status,
                body: body.to_string(),
            }),
            Some(Route::Fail) => Err(AppError::Upstream(format!("connection refused: {}", url))),
            None => Ok(UpstreamResponse { status: 404, body: "Not Found".to_string() }),
        }
    }
}

#[allow(dead_code)]
pub fn user_url(username: &str) -> String {
    format!("{}/users/{}", API, username)
}

#[allow(dead_code)]
pub fn page_url(username: &str, page: usize) -> String {
    format!("{}/users/{}/gists?per_page=100&page={}", API, username, page)
}

#[allow(dead_code)]
pub fn gist_url(id: &str) -> String {
    format!("{}/gists/{}", API, id)
}

#[allow(dead_code)]
pub fn raw_url(id: &str, filename: &str) -> String {
    format!("https://raw.test/{}/raw/{}", id, filename)
}

/// A listing entry: files carry only a raw URL.
#[allow(dead_code)]
pub fn stub(id: &str, filenames: &[&str]) -> Value {
    let files: serde_json::Map<String, Value> = filenames
        .iter()
        .map(|name| {
            (
                name.to_string(),
                json!({"filename": name, "raw_url": raw_url(id, name), "size": 10}),
            )
        })
        .collect();
    json!({
        "id": id,
        "url": gist_url(id),
        "html_url": format!("{}/{}", WEB, id),
        "files": files,
    })
}

/// A full gist document. Files given as `None` are truncated and live at their raw URL.
#[allow(dead_code)]
pub fn detail(id: &str, files: &[(&str, Option<&str>)]) -> Value {
    let files: serde_json::Map<String, Value> = files
        .iter()
        .map(|(name, content)| {
            let entry = match content {
                Some(text) => json!({
                    "filename": name,
                    "truncated": false,
                    "content": text,
                    "raw_url": raw_url(id, name),
                }),
                None => json!({
                    "filename": name,
                    "truncated": true,
                    "content": "",
                    "raw_url": raw_url(id, name),
                }),
            };
            (name.to_string(), entry)
        })
        .collect();
    json!({
        "id": id,
        "url": gist_url(id),
        "owner": {"login": "someone"},
        "files": files,
    })
}

/// Registers an existing user whose listing is `pages`, one JSON array per page.
#[allow(dead_code)]
pub fn user_with_pages(upstream: &FakeUpstream, username: &str, pages: Vec<Vec<Value>>) {
    upstream.json(user_url(username), 200, json!({"login": username}));
    if pages.is_empty() {
        upstream.json(page_url(username, 1), 200, json!([]));
    }
    for (i, page) in pages.into_iter().enumerate() {
        upstream.json(page_url(username, i + 1), 200, Value::Array(page));
    }
}

/// Registers a user with the given gists on a single page, each gist's detail and raw files too.
///
/// Each gist is `(id, [(filename, inline text or None for truncated)])`; truncated
/// files are served from their raw URL with `raw_text`.
#[allow(dead_code)]
pub fn user_with_gists(
    upstream: &FakeUpstream,
    username: &str,
    gists: &[(&str, &[(&str, Option<&str>)])],
    raw_text: &str,
) {
    let stubs = gists
        .iter()
        .map(|(id, files)| {
            let names: Vec<&str> = files.iter().map(|(name, _)| *name).collect();
            stub(id, &names)
        })
        .collect();
    user_with_pages(upstream, username, vec![stubs]);

    for (id, files) in gists {
        upstream.json(gist_url(id), 200, detail(id, files));
        for (name, content) in files.iter() {
            if content.is_none() {
                upstream.text(raw_url(id, name), 200, raw_text);
            }
        }
    }
}

#[allow(dead_code)]
pub fn test_config(concurrency: usize) -> Config {
    Config {
        upstream_base_url: API.to_string(),
        gist_web_url: WEB.to_string(),
        concurrency,
        ..Config::default()
    }
}

#[allow(dead_code)]
pub fn pipeline(
    upstream: Arc<FakeUpstream>,
    cache: Option<Arc<dyn CacheStore>>,
    concurrency: usize,
) -> SearchPipeline {
    SearchPipeline::new(upstream, cache, &test_config(concurrency))
}
