//! Service health routes on the app's own API.

use serde_json::Value;

use crate::client::NetworkService;
use crate::config::ApiConfig;
use crate::endpoint::{Endpoint, EndpointDescriptor};
use crate::error::NetworkError;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralRoute {
    Status,
    Compatibility,
}

impl Endpoint for GeneralRoute {
    fn descriptor(&self, config: &ApiConfig) -> EndpointDescriptor {
        match self {
            GeneralRoute::Status => EndpointDescriptor::get(format!("{}/status", config.base_url())),
            GeneralRoute::Compatibility => {
                EndpointDescriptor::get(format!("{}/compatibility", config.base_url()))
            }
        }
    }
}

/// `GET {base}/status`, returned as an untyped JSON document.
pub async fn get_status<T: Transport>(service: &NetworkService<T>) -> Result<Value, NetworkError> {
    service.fetch(&GeneralRoute::Status).await
}

/// `GET {base}/compatibility`, returned as an untyped JSON document.
pub async fn get_compatibility<T: Transport>(service: &NetworkService<T>) -> Result<Value, NetworkError> {
    service.fetch(&GeneralRoute::Compatibility).await
}
