use rmcp::model::{ErrorCode, ErrorData};
use serde_json::Value;

use crate::api::BlokApiError;

pub fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, ErrorData> {
    arguments.get(key).and_then(|v| v.as_str()).ok_or_else(|| {
        ErrorData::new(
            ErrorCode::INVALID_PARAMS,
            format!("Missing required parameter: {}", key),
            None,
        )
    })
}

pub fn optional_str<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(|v| v.as_str())
}

pub fn optional_u32(arguments: &Value, key: &str) -> Option<u32> {
    arguments
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|n| n as u32)
}

/// Map a vendor API failure onto the protocol error space. Authentication
/// gaps are parameter-level problems from the client's point of view (it can
/// fix them by supplying a credential); everything else is internal.
pub fn api_error(e: BlokApiError) -> ErrorData {
    let code = match &e {
        BlokApiError::NotAuthenticated => ErrorCode::INVALID_REQUEST,
        BlokApiError::Api { status, .. } if status.is_client_error() => ErrorCode::INVALID_PARAMS,
        _ => ErrorCode::INTERNAL_ERROR,
    };
    ErrorData::new(code, e.to_string(), None)
}
