use std::time::Duration;

use reqwest::Client;

/// HTTP client used for sheet downloads.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Download a CSV resource. Non-success statuses are errors.
pub async fn fetch_csv(client: &Client, url: &str) -> reqwest::Result<String> {
    tracing::debug!(url, "fetching sheet");
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    tracing::info!(url, bytes = body.len(), "fetched sheet");
    Ok(body)
}
