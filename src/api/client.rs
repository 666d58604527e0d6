//! Thin HTTP client for the Blok API.
//!
//! Every authenticated call reads its bearer token from the shared
//! [`SessionManager`] at request time, so a token injected mid-process (via
//! the SSE handshake header) is picked up by the next tool call without any
//! client rebuild.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use url::Url;

use super::types::*;
use crate::auth::session::SessionManager;

#[derive(Debug, Error)]
pub enum BlokApiError {
    #[error(
        "not authenticated: set BLOK_MCP_ACCESS_TOKEN, configure BLOK_MCP_EMAIL/BLOK_MCP_PASSWORD, \
         or send an X-Session-Token header on the SSE handshake"
    )]
    NotAuthenticated,
    #[error("invalid Blok API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Blok API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Blok API returned {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
}

#[derive(Debug)]
pub struct BlokClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionManager>,
}

impl BlokClient {
    pub fn new(
        api_url: &str,
        http: reqwest::Client,
        session: Arc<SessionManager>,
    ) -> Result<Self, BlokApiError> {
        let base_url = Url::parse(api_url)?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BlokApiError> {
        Ok(self.base_url.join(path)?)
    }

    fn bearer_token(&self) -> Result<String, BlokApiError> {
        self.session
            .bearer_token()
            .ok_or(BlokApiError::NotAuthenticated)
    }

    /// Exchange email + password for tokens. The only call that does not
    /// require an existing session credential.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, BlokApiError> {
        let url = self.endpoint("/api/v1/auth/login")?;
        debug!("logging in to {}", url);
        let response = self
            .http
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    pub async fn list_pages(
        &self,
        limit: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<PageList, BlokApiError> {
        let mut url = self.endpoint("/api/v1/pages")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }
        self.authed_get(url).await
    }

    pub async fn get_page(&self, page_id: &str) -> Result<PageDetail, BlokApiError> {
        let url = self.endpoint(&format!("/api/v1/pages/{}", page_id))?;
        self.authed_get(url).await
    }

    pub async fn search_blocks(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> Result<BlockSearchResults, BlokApiError> {
        let mut url = self.endpoint("/api/v1/blocks/search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if let Some(limit) = limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        self.authed_get(url).await
    }

    pub async fn create_block(
        &self,
        page_id: &str,
        kind: &str,
        text: &str,
    ) -> Result<Block, BlokApiError> {
        let token = self.bearer_token()?;
        let url = self.endpoint(&format!("/api/v1/pages/{}/blocks", page_id))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&CreateBlockRequest { kind, text })
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn authed_get<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<T, BlokApiError> {
        let token = self.bearer_token()?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        Ok(check_status(response).await?.json().await?)
    }
}

/// Turn non-2xx responses into [`BlokApiError::Api`], pulling the message out
/// of the body when the API sent one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BlokApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or(body);
    Err(BlokApiError::Api { status, message })
}
