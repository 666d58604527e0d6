use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct PageList {
    pub pages: Vec<Page>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Block {
    pub id: String,
    pub page_id: String,
    /// Block kind: `text`, `heading`, `todo`, `code`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A page plus its ordered block content.
#[derive(Debug, Deserialize)]
pub struct PageDetail {
    #[serde(flatten)]
    pub page: Page,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Deserialize)]
pub struct BlockSearchResults {
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CreateBlockRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub text: &'a str,
}
