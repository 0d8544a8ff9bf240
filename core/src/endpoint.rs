//! Endpoint descriptors.
//!
//! # Design
//! A group of routes is a plain enum implementing `Endpoint`; each variant
//! resolves to an `EndpointDescriptor` through an exhaustive `match`. The
//! config is passed in so routes can be built against the configured base URL
//! rather than a global.

use crate::config::ApiConfig;
use crate::encoding::{ParameterEncoding, Parameters};
use crate::http::HttpMethod;

/// Everything needed to build one request.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    pub url: String,
    pub method: HttpMethod,
    /// Endpoint-specific headers, applied after `Content-Type`/`Accept`.
    pub headers: Vec<(String, String)>,
    pub parameters: Option<Parameters>,
    pub encoding: ParameterEncoding,
}

impl EndpointDescriptor {
    /// A `GET` descriptor with JSON encoding and no headers or parameters.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            parameters: None,
            encoding: ParameterEncoding::Json,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// A route that can be fetched.
pub trait Endpoint {
    fn descriptor(&self, config: &ApiConfig) -> EndpointDescriptor;
}

impl Endpoint for EndpointDescriptor {
    fn descriptor(&self, _config: &ApiConfig) -> EndpointDescriptor {
        self.clone()
    }
}

impl<E: Endpoint + ?Sized> Endpoint for &E {
    fn descriptor(&self, config: &ApiConfig) -> EndpointDescriptor {
        (**self).descriptor(config)
    }
}
