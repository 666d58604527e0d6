use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Fixed-error body served by the OAuth stub endpoints. Token issuance is not
/// implemented; clients authenticate by sending `X-Session-Token` on the SSE
/// handshake instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    pub error_description: String,
}

impl OAuthErrorResponse {
    pub fn unsupported_grant_type() -> Self {
        Self {
            error: "unsupported_grant_type".to_string(),
            error_description: "Use X-Session-Token header".to_string(),
        }
    }
}
