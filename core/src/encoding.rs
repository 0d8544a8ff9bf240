//! Parameter encoding strategies.
//!
//! An endpoint's parameters end up in one of three places depending on its
//! `ParameterEncoding`: a JSON request body, a query string, or an extra path
//! segment. `Parameters` is a checked variant so the encoder can reject a
//! payload of the wrong shape instead of guessing.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::EncodingError;

/// How an endpoint's parameters are attached to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterEncoding {
    /// JSON object in the request body.
    Json,
    /// `?key=value&...` appended to the URL.
    Url,
    /// A single string appended to the URL as `/{segment}`.
    Path,
}

impl ParameterEncoding {
    /// Value sent in both `Content-Type` and `Accept`.
    pub fn content_type(&self) -> &'static str {
        match self {
            ParameterEncoding::Json => "application/json",
            ParameterEncoding::Url | ParameterEncoding::Path => "application/x-www-form-urlencoded",
        }
    }
}

impl fmt::Display for ParameterEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParameterEncoding::Json => "json",
            ParameterEncoding::Url => "url",
            ParameterEncoding::Path => "path",
        })
    }
}

/// Request parameters carried by an endpoint descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameters {
    /// Key/value pairs, for `Json` and `Url` encodings.
    Map(Map<String, Value>),
    /// A literal path segment, for `Path` encoding.
    Path(String),
}

impl Parameters {
    /// Builds `Parameters::Map` from any value that serializes to a JSON
    /// object, such as a struct or a `HashMap<String, _>`.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, EncodingError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Parameters::Map(map)),
            _ => Err(EncodingError::NotAMap),
        }
    }

    pub fn path(segment: impl Into<String>) -> Self {
        Parameters::Path(segment.into())
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(map: Map<String, Value>) -> Self {
        Parameters::Map(map)
    }
}

/// Where encoded parameters go in the built request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedParameters {
    None,
    Body(Vec<u8>),
    Query(String),
    PathSegment(String),
}

/// Encodes `parameters` according to `encoding`.
///
/// Absent or empty parameters produce `EncodedParameters::None`. Query pairs
/// are emitted in key order.
pub fn encode_parameters(
    parameters: Option<&Parameters>,
    encoding: ParameterEncoding,
) -> Result<EncodedParameters, EncodingError> {
    let Some(parameters) = parameters else {
        return Ok(EncodedParameters::None);
    };

    match (encoding, parameters) {
        (ParameterEncoding::Json, Parameters::Map(map)) => {
            if map.is_empty() {
                return Ok(EncodedParameters::None);
            }
            Ok(EncodedParameters::Body(serde_json::to_vec(map)?))
        }
        (ParameterEncoding::Url, Parameters::Map(map)) => {
            if map.is_empty() {
                return Ok(EncodedParameters::None);
            }
            Ok(EncodedParameters::Query(url_encode(map)?))
        }
        (ParameterEncoding::Path, Parameters::Path(segment)) => {
            Ok(EncodedParameters::PathSegment(segment.clone()))
        }
        (ParameterEncoding::Path, Parameters::Map(_)) => Err(EncodingError::ShapeMismatch {
            encoding,
            expected: "string",
        }),
        (ParameterEncoding::Json | ParameterEncoding::Url, Parameters::Path(_)) => {
            Err(EncodingError::ShapeMismatch {
                encoding,
                expected: "key/value",
            })
        }
    }
}

/// Form-style encoding: a space becomes `+`, not `%20`, matching the
/// `application/x-www-form-urlencoded` content type sent with the request.
fn url_encode(map: &Map<String, Value>) -> Result<String, EncodingError> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut pairs = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => {
                return Err(EncodingError::NestedValue { key: key.clone() })
            }
        };
        pairs.push(format!("{}={}", escape(key), escape(&value)));
    }
    Ok(pairs.join("&"))
}

fn escape(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
