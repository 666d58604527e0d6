//! Startup authentication posture.
//!
//! Both entrypoints (stdio and HTTP) resolve exactly one posture from the
//! credential inputs before any server is constructed, so the two transports
//! can never disagree about how the process authenticates.

use crate::core::config::BlokConfig;

/// The authentication strategy a server instance is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPosture {
    /// A pre-fetched access token is used as-is; no login round-trip.
    PreAuthToken(String),
    /// Email + password are exchanged for a token during server construction.
    AutoLogin { email: String, password: String },
    /// No credentials at startup; a session token is expected to arrive later
    /// via the `X-Session-Token` header on the SSE handshake.
    Unauthenticated,
}

impl AuthPosture {
    /// Resolve a posture from the three optional inputs. Priority order, first
    /// match wins:
    ///
    /// 1. pre-fetched token
    /// 2. email AND password
    /// 3. neither; partial credentials (email without password, or the
    ///    reverse) fall through here as well
    ///
    /// Empty and whitespace-only strings count as absent. Pure and
    /// side-effect-free; independent of the order the inputs were read.
    pub fn resolve(
        token: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> AuthPosture {
        let token = present(token);
        let email = present(email);
        let password = present(password);

        if let Some(token) = token {
            return AuthPosture::PreAuthToken(token.to_string());
        }
        if let (Some(email), Some(password)) = (email, password) {
            return AuthPosture::AutoLogin {
                email: email.to_string(),
                password: password.to_string(),
            };
        }
        AuthPosture::Unauthenticated
    }

    pub fn from_config(config: &BlokConfig) -> AuthPosture {
        AuthPosture::resolve(
            config.access_token.as_deref(),
            config.email.as_deref(),
            config.password.as_deref(),
        )
    }

    /// Short label for startup logging. Never exposes credential material.
    pub fn describe(&self) -> &'static str {
        match self {
            AuthPosture::PreAuthToken(_) => "pre-auth token",
            AuthPosture::AutoLogin { .. } => "auto-login",
            AuthPosture::Unauthenticated => "unauthenticated (awaiting X-Session-Token)",
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
