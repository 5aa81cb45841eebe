use std::collections::BTreeSet;
use std::fmt;

use reqwest::StatusCode;
use reqwest::header::InvalidHeaderValue;
use serde::{Deserialize, Serialize};

use crate::auth::refresh::RefreshError;
use crate::decode::DecodeFailure;
use crate::scope::{Scope, display_scopes};
use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    #[error("Unauthorized: no access token")]
    Unauthorized,

    #[error(
        "Insufficient scope: required {}, granted {}",
        display_scopes(.required),
        display_scopes(.granted)
    )]
    InsufficientScope {
        required: BTreeSet<Scope>,
        granted: BTreeSet<Scope>,
    },

    #[error("Failed to refresh access token: {0}")]
    Refresh(#[from] RefreshError),

    /// The authorization manager reported a successful refresh but the token
    /// is still expired. This is a bug in the refresh implementation; retrying
    /// the call will not help.
    #[error("Access token was expired after just refreshing it")]
    TokenExpiredAfterRefresh,

    #[error("Invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Spotify responded with http status {status}: {body}")]
    Http { status: StatusCode, body: ErrorBody },

    #[error(transparent)]
    Decode(#[from] Box<DecodeFailure>),
}

impl SpotifyError {
    /// The http status of the response that caused this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SpotifyError::Http { status, .. } => Some(*status),
            SpotifyError::Decode(failure) => failure.status(),
            _ => None,
        }
    }
}

/// The [error object] returned by the Web API.
///
/// [error object]: https://developer.spotify.com/documentation/web-api/concepts/api-calls#response-schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyApiError {
    pub status: u16,
    pub message: String,
    /// Present on player endpoints, e.g. `NO_ACTIVE_DEVICE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpotifyApiErrorEnvelope {
    error: SpotifyApiError,
}

/// Error returned by the accounts service while retrieving or refreshing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    Api(SpotifyApiError),
    Authentication(AuthenticationError),
    /// Neither error shape matched; the raw bytes are kept.
    Raw(Vec<u8>),
}

impl ErrorBody {
    /// Decode a non-2xx body, trying the Web API error object first and the
    /// accounts service error second.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if let Ok(envelope) = serde_json::from_slice::<SpotifyApiErrorEnvelope>(bytes) {
            return ErrorBody::Api(envelope.error);
        }
        if let Ok(error) = serde_json::from_slice::<AuthenticationError>(bytes) {
            return ErrorBody::Authentication(error);
        }
        ErrorBody::Raw(bytes.to_vec())
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorBody::Api(error) => match &error.reason {
                Some(reason) => write!(f, "{} ({})", error.message, reason),
                None => f.write_str(&error.message),
            },
            ErrorBody::Authentication(error) => match &error.error_description {
                Some(description) => write!(f, "{}: {}", error.error, description),
                None => f.write_str(&error.error),
            },
            ErrorBody::Raw(bytes) if bytes.is_empty() => f.write_str("<empty body>"),
            ErrorBody::Raw(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_api_error() {
        let body = br#"{"error": {"status": 404, "message": "Player command failed", "reason": "NO_ACTIVE_DEVICE"}}"#;
        let decoded = ErrorBody::from_bytes(body);
        assert_eq!(
            decoded,
            ErrorBody::Api(SpotifyApiError {
                status: 404,
                message: "Player command failed".to_string(),
                reason: Some("NO_ACTIVE_DEVICE".to_string()),
            })
        );
        assert_eq!(decoded.to_string(), "Player command failed (NO_ACTIVE_DEVICE)");
    }

    #[test]
    fn test_error_body_authentication_error() {
        let body = br#"{"error": "invalid_grant", "error_description": "Refresh token revoked"}"#;
        assert_eq!(
            ErrorBody::from_bytes(body),
            ErrorBody::Authentication(AuthenticationError {
                error: "invalid_grant".to_string(),
                error_description: Some("Refresh token revoked".to_string()),
            })
        );
    }

    #[test]
    fn test_error_body_falls_back_to_raw() {
        let body = b"<html>Bad Gateway</html>";
        let decoded = ErrorBody::from_bytes(body);
        assert_eq!(decoded, ErrorBody::Raw(body.to_vec()));
        assert_eq!(decoded.to_string(), "<html>Bad Gateway</html>");
    }

    #[test]
    fn test_insufficient_scope_message_names_both_sets() {
        let error = SpotifyError::InsufficientScope {
            required: BTreeSet::from([Scope::UserReadEmail, Scope::PlaylistModifyPublic]),
            granted: BTreeSet::from([Scope::UserReadEmail]),
        };
        assert_eq!(
            error.to_string(),
            "Insufficient scope: required {playlist-modify-public, user-read-email}, granted {user-read-email}"
        );
    }
}
