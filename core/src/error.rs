//! Error types for the netroute client.
//!
//! # Design
//! Callers of `fetch` only ever see `NetworkError`, the small taxonomy the
//! app surfaces to users. The richer per-stage errors (`EncodingError`,
//! `BuildError`, `TransportError`, `DecodeError`) exist so that each stage can
//! be tested and logged precisely before being folded into a `NetworkError`.
//! `ConfigError` is separate: it is returned at startup, before any request
//! can be made.

use thiserror::Error;

use crate::encoding::ParameterEncoding;

/// The error delivered to callers of `fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Catch-all; no stage of the pipeline produces it today.
    #[error("An error has occurred. Please try again.")]
    Generic,

    /// The endpoint could not be turned into a valid request (bad URL,
    /// parameters or header).
    #[error("Invalid parameters sent to the server.")]
    InvalidResource,

    /// The exchange failed after the request was built.
    #[error("{message}")]
    ServerError { message: String },
}

impl NetworkError {
    pub fn server(message: impl Into<String>) -> Self {
        NetworkError::ServerError {
            message: message.into(),
        }
    }

    /// The server-side message, if this is a `ServerError`.
    pub fn message(&self) -> Option<&str> {
        match self {
            NetworkError::ServerError { message } => Some(message),
            _ => None,
        }
    }
}

/// Parameters could not be encoded for the endpoint's encoding.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("{encoding} encoding requires {expected} parameters")]
    ShapeMismatch {
        encoding: ParameterEncoding,
        expected: &'static str,
    },

    #[error("parameter `{key}` is a nested array or object and cannot be url-encoded")]
    NestedValue { key: String },

    #[error("parameters must serialize to a JSON object")]
    NotAMap,

    #[error("parameter serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// An endpoint could not be turned into an `HttpRequest`.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: url::ParseError },

    #[error("header `{name}` is not a valid http header")]
    InvalidHeader { name: String },
}

/// The transport failed before a complete response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("The request timed out.")]
    Timeout,

    #[error("cancelled")]
    Cancelled,

    #[error("Could not connect to the server: {0}")]
    Connect(String),

    #[error("{0}")]
    Request(String),

    #[error("Could not read the response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            TransportError::Body(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// A response body could not be decoded into the requested type.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is well-formed JSON that does not match the target shape.
    #[error("body does not match the expected shape: {0}")]
    Mismatch(serde_json::Error),

    /// The body is not well-formed JSON.
    #[error("body is not valid JSON: {0}")]
    Malformed(serde_json::Error),
}

/// Startup configuration is missing or invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("api key is missing or blank; provide `apiKey` in the config file or NETROUTE_API_KEY")]
    MissingApiKey,

    #[error("api key contains characters that cannot be sent in an http header")]
    InvalidApiKey,

    #[error("base url `{url}` is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: url::ParseError },

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("unknown environment `{0}` (expected local, staging or production)")]
    UnknownEnvironment(String),

    #[error("cannot read config file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config file `{path}` is malformed: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build http client: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_displays_its_message() {
        let err = NetworkError::server("Not Found");
        assert_eq!(err.to_string(), "Not Found");
        assert_eq!(err.message(), Some("Not Found"));
    }

    #[test]
    fn fixed_variants_have_user_facing_text() {
        assert_eq!(
            NetworkError::InvalidResource.to_string(),
            "Invalid parameters sent to the server."
        );
        assert_eq!(NetworkError::Generic.message(), None);
    }

    #[test]
    fn shape_mismatch_names_the_encoding() {
        let err = EncodingError::ShapeMismatch {
            encoding: ParameterEncoding::Path,
            expected: "string",
        };
        assert_eq!(err.to_string(), "path encoding requires string parameters");
    }
}
