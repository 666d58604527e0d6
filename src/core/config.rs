// ---------------------------------------------------------------------------
// BlokConfig — env-derived startup configuration, read once per process
// ---------------------------------------------------------------------------

pub const ENV_ACCESS_TOKEN: &str = "BLOK_MCP_ACCESS_TOKEN";
pub const ENV_EMAIL: &str = "BLOK_MCP_EMAIL";
pub const ENV_PASSWORD: &str = "BLOK_MCP_PASSWORD";
pub const ENV_API_URL: &str = "BLOK_API_URL";
pub const ENV_DEBUG: &str = "BLOK_MCP_DEBUG";

pub const DEFAULT_API_URL: &str = "https://api.blok.app";

/// Credential and endpoint inputs consumed at startup.
///
/// The environment is read exactly once (by the entrypoint); nothing in the
/// bridge re-reads env vars after construction, so both transports observe
/// the same values for the life of the process.
#[derive(Clone, Debug, Default)]
pub struct BlokConfig {
    /// Base URL of the Blok API, e.g. `https://api.blok.app`.
    pub api_url: String,
    /// Pre-fetched access token (skips login entirely).
    pub access_token: Option<String>,
    /// Email for auto-login at startup.
    pub email: Option<String>,
    /// Password for auto-login at startup.
    pub password: Option<String>,
    /// Verbose request logging.
    pub debug: bool,
}

impl BlokConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env_nonempty(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            access_token: env_nonempty(ENV_ACCESS_TOKEN),
            email: env_nonempty(ENV_EMAIL),
            password: env_nonempty(ENV_PASSWORD),
            debug: env_flag(ENV_DEBUG),
        }
    }
}

/// Read an env var, treating unset, empty, and whitespace-only as absent.
fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_flag(key: &str) -> bool {
    let Ok(v) = std::env::var(key) else {
        return false;
    };
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// HTTP client timeouts, shared by both transports.
pub fn http_timeout_secs() -> u64 {
    std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(30)
}

pub fn http_connect_timeout_secs() -> u64 {
    std::env::var("HTTP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(10)
}
