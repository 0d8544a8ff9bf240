//! Typed decoding of response bodies.

use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::DecodeError;

/// Decodes `bytes` as JSON into `T`.
///
/// Well-formed JSON of the wrong shape yields `DecodeError::Mismatch`;
/// anything that is not well-formed JSON yields `DecodeError::Malformed`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| match e.classify() {
        Category::Data => DecodeError::Mismatch(e),
        Category::Syntax | Category::Eof | Category::Io => DecodeError::Malformed(e),
    })
}
