//! Declarative HTTP client core.
//!
//! # Overview
//! Routes are closed enums implementing `Endpoint`. `NetworkService::fetch`
//! turns a route into an `HttpRequest`, executes it once through a
//! `Transport`, and maps the outcome onto `Result<T, NetworkError>`.
//!
//! # Design
//! - `ApiConfig` is validated at startup and injected; nothing is global.
//! - Parameters are a checked variant (`Parameters::Map` / `Parameters::Path`)
//!   so a mismatch with the endpoint's encoding is an error, not a crash.
//! - The transport sits behind a trait; `ReqwestTransport` shares one pooled
//!   client and supports cancelling everything in flight.
//! - Only 401, 404, 429 and 498 are special-cased; other statuses go straight
//!   to decoding.

pub mod client;
pub mod config;
pub mod decode;
pub mod encoding;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod response;
pub mod routes;
pub mod transport;
pub mod types;

pub use client::{NetworkService, API_KEY_HEADER};
pub use config::{ApiConfig, ApiKey, Environment};
pub use encoding::{ParameterEncoding, Parameters};
pub use endpoint::{Endpoint, EndpointDescriptor};
pub use error::{BuildError, ConfigError, DecodeError, EncodingError, NetworkError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use routes::{GeneralRoute, UserRoute};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Name, Picture, RandomUser, UserProfile};
