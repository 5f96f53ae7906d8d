use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub status: &'static str,
    pub username: String,
    pub pattern: String,
    pub matches: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub code: u16,
    pub message: String,
}
