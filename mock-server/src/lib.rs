use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Key the mock accepts in the `apiKey` header unless told otherwise.
pub const DEFAULT_API_KEY: &str = "mock-api-key";

/// A request as the server saw it, returned by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EchoedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Header names are lower-cased by the HTTP stack.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

struct MockState {
    api_key: String,
}

type SharedState = Arc<MockState>;

pub fn app() -> Router {
    app_with_key(DEFAULT_API_KEY)
}

/// Routes under `/api` require `apiKey: {api_key}`; the diagnostic routes
/// do not.
pub fn app_with_key(api_key: impl Into<String>) -> Router {
    let state: SharedState = Arc::new(MockState {
        api_key: api_key.into(),
    });
    Router::new()
        .route("/api/status", get(status))
        .route("/api/compatibility", get(compatibility))
        .route("/api/users", get(random_user))
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/status/{code}", get(status_code))
        .route("/slow/{ms}", get(slow))
        .route("/malformed", get(malformed))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: impl Into<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_key(api_key)).await
}

fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let presented = headers.get("apikey").and_then(|v| v.to_str().ok());
    if presented == Some(state.api_key.as_str()) {
        return Ok(());
    }
    tracing::debug!(?presented, "rejecting request without a valid apiKey");
    Err((
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "missing or invalid apiKey"})),
    )
        .into_response())
}

async fn status(State(state): State<SharedState>, headers: HeaderMap) -> Result<Json<Value>, Response> {
    authorize(&state, &headers)?;
    Ok(Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")})))
}

async fn compatibility(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Value>, Response> {
    authorize(&state, &headers)?;
    Ok(Json(json!({"compatible": true, "minimumVersion": "1.0.0"})))
}

async fn random_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Value>, Response> {
    authorize(&state, &headers)?;
    Ok(Json(json!({
        "results": [{
            "gender": "female",
            "name": {"title": "Ms", "first": "Ada", "last": "Lovelace"},
            "email": "ada@example.com",
            "picture": {
                "large": "https://randomuser.me/api/portraits/women/1.jpg",
                "medium": "https://randomuser.me/api/portraits/med/women/1.jpg",
                "thumbnail": "https://randomuser.me/api/portraits/thumb/women/1.jpg"
            }
        }],
        "info": {"seed": "mock", "results": 1, "page": 1, "version": "1.4"}
    })))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<EchoedRequest> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(EchoedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Responds with the requested status and a body that would otherwise decode.
async fn status_code(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, Json(json!({"status": "ok"}))).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn slow(Path(ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({"status": "slow"}))
}

async fn malformed() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "this is not json")
}
