//! Builds requests from endpoints and runs them through a transport.
//!
//! # Design
//! `NetworkService` holds the validated `ApiConfig` and a `Transport`, and no
//! other state. A fetch is a single pass: resolve the endpoint's descriptor,
//! build an `HttpRequest`, execute it once, and map the outcome. Every failure
//! after `fetch` starts comes back as a `NetworkError`; nothing is retried.

use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::encoding::{encode_parameters, EncodedParameters};
use crate::endpoint::Endpoint;
use crate::error::{BuildError, ConfigError, NetworkError, TransportError};
use crate::http::{set_header, HttpRequest, HttpResponse};
use crate::response::map_response;
use crate::transport::{ReqwestTransport, Transport};

/// Header carrying the configured credential on every request.
pub const API_KEY_HEADER: &str = "apiKey";

/// Declarative HTTP client.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct NetworkService<T = ReqwestTransport> {
    config: ApiConfig,
    transport: T,
}

impl NetworkService<ReqwestTransport> {
    /// Creates a service backed by a pooled reqwest client using the
    /// configured timeout.
    pub fn new(config: ApiConfig) -> Result<Self, ConfigError> {
        let transport =
            ReqwestTransport::new(config.timeout()).map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> NetworkService<T> {
    pub fn with_transport(config: ApiConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Turns `endpoint` into a wire request.
    ///
    /// `Content-Type` and `Accept` are set from the encoding, then the
    /// endpoint's own headers, then `apiKey`. A later header replaces an
    /// earlier one with the same name.
    pub fn build_request<E: Endpoint + ?Sized>(&self, endpoint: &E) -> Result<HttpRequest, BuildError> {
        let descriptor = endpoint.descriptor(&self.config);

        let mut url = descriptor.url;
        let mut body = None;
        match encode_parameters(descriptor.parameters.as_ref(), descriptor.encoding)? {
            EncodedParameters::None => {}
            EncodedParameters::Body(bytes) => body = Some(bytes),
            EncodedParameters::Query(query) => {
                url.push(if url.contains('?') { '&' } else { '?' });
                url.push_str(&query);
            }
            EncodedParameters::PathSegment(segment) => {
                url.push('/');
                url.push_str(&segment);
            }
        }

        if let Err(reason) = url::Url::parse(&url) {
            return Err(BuildError::InvalidUrl { url, reason });
        }

        let content_type = descriptor.encoding.content_type();
        let mut headers = Vec::with_capacity(descriptor.headers.len() + 3);
        set_header(&mut headers, "Content-Type", content_type);
        set_header(&mut headers, "Accept", content_type);
        for (name, value) in &descriptor.headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err() || HeaderValue::from_str(value).is_err() {
                return Err(BuildError::InvalidHeader { name: name.clone() });
            }
            set_header(&mut headers, name, value);
        }
        set_header(&mut headers, API_KEY_HEADER, self.config.api_key().as_str());

        Ok(HttpRequest {
            method: descriptor.method,
            url,
            headers,
            body,
        })
    }

    /// Fetches `endpoint` and decodes the response body into `R`.
    pub async fn fetch<R, E>(&self, endpoint: &E) -> Result<R, NetworkError>
    where
        R: DeserializeOwned,
        E: Endpoint + ?Sized,
    {
        let request = match self.build_request(endpoint) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "could not build request");
                return Err(NetworkError::InvalidResource);
            }
        };

        log_request(&request);
        let method = request.method;
        let url = request.url.clone();

        let outcome = self.transport.execute(request).await;
        log_response(&url, &outcome);

        let result = map_response(outcome);
        if let Err(e) = &result {
            warn!(%method, %url, error = %e, "request failed");
        }
        result
    }

    /// Aborts every in-flight request; each resolves with a `ServerError`.
    /// The service remains usable afterwards.
    pub fn cancel_all_requests(&self) {
        info!("cancelling all in-flight requests");
        self.transport.cancel_all();
    }
}

impl<T: Transport + 'static> NetworkService<T> {
    /// Spawns the fetch on the current tokio runtime and hands the result to
    /// `callback` exactly once.
    ///
    /// The callback runs on a runtime worker thread. Callers that update UI
    /// state must hop to their UI context themselves.
    pub fn fetch_with_callback<R, E, F>(self: &Arc<Self>, endpoint: E, callback: F) -> JoinHandle<()>
    where
        R: DeserializeOwned + Send + 'static,
        E: Endpoint + Send + Sync + 'static,
        F: FnOnce(Result<R, NetworkError>) + Send + 'static,
    {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let result = service.fetch(&endpoint).await;
            callback(result);
        })
    }
}

fn log_request(request: &HttpRequest) {
    let headers: Vec<(&str, &str)> = request
        .headers
        .iter()
        .map(|(name, value)| {
            if name.eq_ignore_ascii_case(API_KEY_HEADER) {
                (name.as_str(), "***")
            } else {
                (name.as_str(), value.as_str())
            }
        })
        .collect();
    let body = request
        .body
        .as_deref()
        .map(|b| String::from_utf8_lossy(b).into_owned());
    debug!(method = %request.method, url = %request.url, ?headers, ?body, "sending request");
}

fn log_response(url: &str, outcome: &Result<HttpResponse, TransportError>) {
    match outcome {
        Ok(response) => debug!(
            %url,
            status = response.status,
            headers = ?response.headers,
            body_len = response.body.as_ref().map(Vec::len),
            "received response"
        ),
        Err(e) => debug!(%url, error = %e, "transport error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;

    use crate::encoding::{ParameterEncoding, Parameters};
    use crate::endpoint::EndpointDescriptor;
    use crate::http::HttpMethod;
    use crate::response::PARSE_MESSAGE;

    const BASE_URL: &str = "http://localhost:3000/api";

    #[derive(Default)]
    struct StubTransport {
        outcome: Mutex<Option<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<HttpRequest>>,
        cancelled: AtomicBool,
    }

    impl StubTransport {
        fn responding(status: u16, body: &str) -> Self {
            let stub = Self::default();
            *stub.outcome.lock().unwrap() = Some(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: Some(body.as_bytes().to_vec()),
            }));
            stub
        }

        fn failing(err: TransportError) -> Self {
            let stub = Self::default();
            *stub.outcome.lock().unwrap() = Some(Err(err));
            stub
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.outcome
                .lock()
                .unwrap()
                .take()
                .expect("stub outcome already consumed")
        }

        fn cancel_all(&self) {
            self.cancelled.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Status {
        status: String,
    }

    fn config() -> ApiConfig {
        ApiConfig::builder("test-key").base_url(BASE_URL).build().unwrap()
    }

    fn service(transport: StubTransport) -> NetworkService<StubTransport> {
        NetworkService::with_transport(config(), transport)
    }

    fn map(value: serde_json::Value) -> Parameters {
        Parameters::from_serialize(&value).unwrap()
    }

    #[test]
    fn build_without_parameters() {
        let req = service(StubTransport::default())
            .build_request(&EndpointDescriptor::get(format!("{BASE_URL}/status")))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/status");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
                ("apiKey".to_string(), "test-key".to_string()),
            ]
        );
    }

    #[test]
    fn build_json_body() {
        let endpoint = EndpointDescriptor::new(HttpMethod::Post, format!("{BASE_URL}/users"))
            .parameters(map(json!({"name": "Ada", "admin": false})));
        let req = service(StubTransport::default()).build_request(&endpoint).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/users");
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Ada", "admin": false}));
    }

    #[test]
    fn build_url_query() {
        let endpoint = EndpointDescriptor::get(format!("{BASE_URL}/search"))
            .parameters(map(json!({"q": "a b", "page": 1})))
            .encoding(ParameterEncoding::Url);
        let req = service(StubTransport::default()).build_request(&endpoint).unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/search?page=1&q=a+b");
        assert!(req.body.is_none());
        assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(req.header("accept"), Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn build_url_query_extends_existing_query() {
        let endpoint = EndpointDescriptor::get(format!("{BASE_URL}/search?lang=en"))
            .parameters(map(json!({"q": "x"})))
            .encoding(ParameterEncoding::Url);
        let req = service(StubTransport::default()).build_request(&endpoint).unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/search?lang=en&q=x");
    }

    #[test]
    fn build_path_segment() {
        let endpoint = EndpointDescriptor::get(BASE_URL)
            .parameters(Parameters::path("42"))
            .encoding(ParameterEncoding::Path);
        let req = service(StubTransport::default()).build_request(&endpoint).unwrap();
        assert_eq!(req.url, format!("{BASE_URL}/42"));
        assert!(req.body.is_none());
    }

    #[test]
    fn path_encoding_with_map_is_an_encoding_error() {
        let endpoint = EndpointDescriptor::get(BASE_URL)
            .parameters(map(json!({"id": 42})))
            .encoding(ParameterEncoding::Path);
        let err = service(StubTransport::default()).build_request(&endpoint).unwrap_err();
        assert!(matches!(err, BuildError::Encoding(_)));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = service(StubTransport::default())
            .build_request(&EndpointDescriptor::get("not a url"))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidUrl { ref url, .. } if url == "not a url"));
    }

    #[test]
    fn endpoint_headers_override_defaults() {
        let endpoint = EndpointDescriptor::get(BASE_URL)
            .header("accept", "text/plain")
            .header("X-Trace", "1")
            .header("X-Trace", "2");
        let req = service(StubTransport::default()).build_request(&endpoint).unwrap();
        assert_eq!(req.header("Accept"), Some("text/plain"));
        assert_eq!(req.header("x-trace"), Some("2"));
        assert_eq!(req.headers.iter().filter(|(n, _)| n.eq_ignore_ascii_case("accept")).count(), 1);
    }

    #[test]
    fn invalid_endpoint_header_is_a_build_error() {
        let svc = service(StubTransport::default());
        let err = svc
            .build_request(&EndpointDescriptor::get(BASE_URL).header("bad header", "x"))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidHeader { ref name } if name == "bad header"));

        let err = svc
            .build_request(&EndpointDescriptor::get(BASE_URL).header("X-Note", "line\nbreak"))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidHeader { ref name } if name == "X-Note"));
    }

    #[test]
    fn api_key_header_cannot_be_overridden_by_endpoint() {
        let endpoint = EndpointDescriptor::get(BASE_URL).header("apikey", "spoofed");
        let req = service(StubTransport::default()).build_request(&endpoint).unwrap();
        assert_eq!(req.header(API_KEY_HEADER), Some("test-key"));
    }

    #[tokio::test]
    async fn fetch_decodes_success() {
        let svc = service(StubTransport::responding(200, r#"{"status":"ok"}"#));
        let status: Status = svc.fetch(&EndpointDescriptor::get(BASE_URL)).await.unwrap();
        assert_eq!(status.status, "ok");

        let seen = svc.transport().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, BASE_URL);
    }

    #[tokio::test]
    async fn fetch_reports_invalid_resource_without_sending() {
        let svc = service(StubTransport::default());
        let err = svc
            .fetch::<Status, _>(&EndpointDescriptor::get("::bad::"))
            .await
            .unwrap_err();
        assert_eq!(err, NetworkError::InvalidResource);
        assert!(svc.transport().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_with_invalid_header_is_invalid_resource() {
        let svc = service(StubTransport::default());
        let endpoint = EndpointDescriptor::get(format!("{BASE_URL}/echo")).header("bad header", "x");
        let err = svc.fetch::<Status, _>(&endpoint).await.unwrap_err();
        assert_eq!(err, NetworkError::InvalidResource);
        assert!(svc.transport().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_maps_transport_error() {
        let svc = service(StubTransport::failing(TransportError::Timeout));
        let err = svc.fetch::<Status, _>(&EndpointDescriptor::get(BASE_URL)).await.unwrap_err();
        assert_eq!(err, NetworkError::server("The request timed out."));
    }

    #[tokio::test]
    async fn fetch_maps_special_status() {
        let svc = service(StubTransport::responding(498, r#"{"status":"ok"}"#));
        let err = svc.fetch::<Status, _>(&EndpointDescriptor::get(BASE_URL)).await.unwrap_err();
        assert_eq!(err, NetworkError::server("Expired Token"));
    }

    #[tokio::test]
    async fn fetch_maps_shape_mismatch() {
        let svc = service(StubTransport::responding(200, r#"[1,2,3]"#));
        let err = svc.fetch::<Status, _>(&EndpointDescriptor::get(BASE_URL)).await.unwrap_err();
        assert_eq!(err, NetworkError::server(PARSE_MESSAGE));
    }

    #[tokio::test]
    async fn fetch_with_callback_delivers_once() {
        let svc = Arc::new(service(StubTransport::responding(200, r#"{"status":"ok"}"#)));
        let (tx, rx) = tokio::sync::oneshot::channel();
        svc.fetch_with_callback(EndpointDescriptor::get(BASE_URL), move |result: Result<Status, _>| {
            tx.send(result).ok();
        })
        .await
        .unwrap();
        assert_eq!(rx.await.unwrap().unwrap().status, "ok");
    }

    #[test]
    fn cancel_all_reaches_the_transport() {
        let svc = service(StubTransport::default());
        svc.cancel_all_requests();
        assert!(svc.transport().cancelled.load(Ordering::SeqCst));
    }
}
