pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gist;
pub mod lister;
pub mod matcher;
pub mod resolver;
pub mod search;
pub mod upstream;

use std::sync::Arc;
use config::Config;
use search::SearchPipeline;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<SearchPipeline>,
}
