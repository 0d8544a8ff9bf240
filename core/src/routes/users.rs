//! Random user lookup.

use crate::client::NetworkService;
use crate::config::ApiConfig;
use crate::endpoint::{Endpoint, EndpointDescriptor};
use crate::error::NetworkError;
use crate::transport::Transport;
use crate::types::RandomUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRoute {
    GetUser,
}

impl Endpoint for UserRoute {
    fn descriptor(&self, config: &ApiConfig) -> EndpointDescriptor {
        match self {
            UserRoute::GetUser => EndpointDescriptor::get(config.users_url()),
        }
    }
}

pub async fn get_user<T: Transport>(service: &NetworkService<T>) -> Result<RandomUser, NetworkError> {
    service.fetch(&UserRoute::GetUser).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USERS_URL;

    #[test]
    fn get_user_uses_users_url() {
        let config = ApiConfig::builder("k").build().unwrap();
        assert_eq!(UserRoute::GetUser.descriptor(&config).url, DEFAULT_USERS_URL);

        let config = ApiConfig::builder("k")
            .users_url("http://127.0.0.1:4000/api/users")
            .build()
            .unwrap();
        assert_eq!(
            UserRoute::GetUser.descriptor(&config).url,
            "http://127.0.0.1:4000/api/users"
        );
    }
}
