pub mod graphhopper;
pub mod osrm;

use std::time::Duration;

use crate::error::ProviderError;

pub(crate) fn build_http_client(
    user_agent: &str,
    timeout: Duration,
) -> Result<reqwest::Client, ProviderError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?;

    Ok(client)
}

/// Fails on any non-2xx status, otherwise returns the body as text.
pub(crate) async fn read_success_body(response: reqwest::Response) -> Result<String, ProviderError> {
    if response.status().is_success() {
        Ok(response.text().await?)
    } else {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Err(ProviderError::Api { status, message })
    }
}
