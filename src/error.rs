use thiserror::Error;

use crate::mcp_gateway::protocol::error_codes;

/// Startup configuration failures. All of these are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HEADLESS_AGENTS_API_KEY environment variable is required")]
    MissingApiKey,

    #[error("HEADLESS_AGENTS_BASE_URL is not a valid absolute URL: {value}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HEADLESS_AGENTS_TIMEOUT_MS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
}

/// Failures of the single outbound call to the agent API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors surfaced on the local channel as JSON-RPC error objects.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid Request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Missing parameters")]
    MissingParams,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Error calling Headless Agents API: {0}")]
    Upstream(#[from] UpstreamError),
}

impl GatewayError {
    pub fn code(&self) -> i64 {
        match self {
            GatewayError::Parse(_) => error_codes::PARSE_ERROR,
            GatewayError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            GatewayError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            GatewayError::MissingParams
            | GatewayError::UnknownTool(_)
            | GatewayError::InvalidArguments(_) => error_codes::INVALID_PARAMS,
            GatewayError::Upstream(_) => error_codes::INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_prefixed() {
        let err = GatewayError::from(UpstreamError::Status(500));
        assert_eq!(
            err.to_string(),
            "Error calling Headless Agents API: HTTP error! status: 500"
        );
        assert_eq!(err.code(), error_codes::INTERNAL_ERROR);
    }

    #[test]
    fn unknown_tool_names_the_tool() {
        let err = GatewayError::UnknownTool("unknown_tool".into());
        assert!(err.to_string().contains("unknown_tool"));
        assert_eq!(err.code(), error_codes::INVALID_PARAMS);
    }

    #[test]
    fn decode_error_keeps_underlying_message() {
        let inner = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let msg = inner.to_string();
        let err = GatewayError::from(UpstreamError::from(inner));
        assert!(err.to_string().ends_with(&msg));
    }
}
