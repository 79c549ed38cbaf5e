// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Errors returned by the data-access adapter.

use serde_json::Value;

/// Prefix used for every transport-level failure message.
pub const NETWORK_ERROR_PREFIX: &str = "Network error";

/// Failure of a REST or auth call.
///
/// The adapter never classifies backend errors by status code: any non-2xx
/// response becomes [`ClientError::Api`] carrying the decoded body verbatim.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// DNS, connect, TLS, timeout or abort.
    #[error("{message}")]
    Network { message: String },

    /// Non-success HTTP response from the backend.
    #[error("API error ({status}): {}", api_message(.body))]
    Api { status: u16, body: Value },

    /// Success response whose body did not match the expected shape.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Operation requires a session and none is held.
    #[error("No active session")]
    NotAuthenticated,
}

impl ClientError {
    pub(crate) fn network(err: impl std::fmt::Display) -> Self {
        ClientError::Network {
            message: format!("{}: {}", NETWORK_ERROR_PREFIX, err),
        }
    }

    pub(crate) fn decode(err: impl std::fmt::Display) -> Self {
        ClientError::Decode {
            message: err.to_string(),
        }
    }

    /// Human-readable message, extracted from the backend body when possible.
    pub fn message(&self) -> String {
        match self {
            ClientError::Api { body, .. } => api_message(body),
            other => other.to_string(),
        }
    }

    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a message out of a PostgREST or GoTrue error body.
///
/// PostgREST uses `message`; GoTrue uses `msg`, `error_description` or
/// `error` depending on the endpoint.
fn api_message(body: &Value) -> String {
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Result type alias for adapter calls.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_prefers_postgrest_message() {
        let err = ClientError::Api {
            status: 409,
            body: json!({"code": "23505", "message": "duplicate key value"}),
        };
        assert_eq!(err.message(), "duplicate key value");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_message_falls_back_to_gotrue_fields() {
        let err = ClientError::Api {
            status: 400,
            body: json!({"error": "invalid_grant", "error_description": "Invalid login credentials"}),
        };
        assert_eq!(err.message(), "Invalid login credentials");

        let err = ClientError::Api {
            status: 422,
            body: json!({"code": 422, "msg": "User already registered"}),
        };
        assert_eq!(err.message(), "User already registered");
    }

    #[test]
    fn test_message_unknown_body_is_raw_json() {
        let err = ClientError::Api {
            status: 500,
            body: json!({"weird": true}),
        };
        assert_eq!(err.message(), r#"{"weird":true}"#);
    }

    #[test]
    fn test_network_message_prefix() {
        let err = ClientError::network("connection refused");
        assert_eq!(err.message(), "Network error: connection refused");
        assert_eq!(err.status(), None);
    }
}
