//! Maps a transport outcome onto `Result<T, NetworkError>`.
//!
//! # Design
//! The checks run in a fixed order: transport failure, missing body, a short
//! list of status codes with fixed messages, then decoding. Status codes not
//! in that list are not inspected; a 500 with a decodable body succeeds.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::decode::decode;
use crate::error::{DecodeError, NetworkError, TransportError};
use crate::http::HttpResponse;

pub const NO_DATA_MESSAGE: &str = "There was no data returned from the server";
pub const PARSE_MESSAGE: &str = "Could not parse the data returned from the server.";
pub const DECODE_MESSAGE: &str = "Could not deserialize or decode the data";

/// Fixed error message for status codes that short-circuit decoding.
pub fn status_message(status: u16) -> Option<&'static str> {
    match status {
        401 => Some("Unauthorized"),
        404 => Some("Not Found"),
        429 => Some("Too Many Requests"),
        498 => Some("Expired Token"),
        _ => None,
    }
}

/// Classifies `outcome` and decodes the body into `T` on success.
pub fn map_response<T: DeserializeOwned>(
    outcome: Result<HttpResponse, TransportError>,
) -> Result<T, NetworkError> {
    let response = outcome.map_err(|e| NetworkError::server(e.to_string()))?;

    let Some(body) = response.body else {
        return Err(NetworkError::server(NO_DATA_MESSAGE));
    };

    if let Some(message) = status_message(response.status) {
        return Err(NetworkError::server(message));
    }

    decode(&body).map_err(|e| {
        warn!(status = response.status, error = %e, "response body did not decode");
        match e {
            DecodeError::Mismatch(_) => NetworkError::server(PARSE_MESSAGE),
            DecodeError::Malformed(_) => NetworkError::server(DECODE_MESSAGE),
        }
    })
}
