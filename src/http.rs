use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::StablemanConfig;
use crate::error::ProviderError;

/// Builds the HTTP client shared by the providers
pub fn build_client(
    config: &StablemanConfig,
    provider: &'static str,
) -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ProviderError::RequestFailed {
            provider,
            message: e.to_string(),
        })
}

/// Makes an HTTP GET request and deserializes the JSON response
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: &'static str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ProviderError> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| ProviderError::RequestFailed {
            provider,
            message: e.to_string(),
        })?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited { provider });
    }
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::InvalidData {
            provider,
            message: e.to_string(),
        })
}
