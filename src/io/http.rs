use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, ToolError};

const USER_AGENT: &str = concat!("c4-rank/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by the leaderboard and GitHub adapters.
pub fn build_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Issues a GET request and decodes the JSON body, treating any non-success
/// status as a failure.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    bearer: Option<&str>,
    accept: Option<&'static str>,
) -> Result<T> {
    let mut request = client.get(url);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }
    if let Some(accept) = accept {
        request = request.header(ACCEPT, accept);
    }

    let response = request.send().await?;
    let status = response.status();
    debug!(%url, status = status.as_u16(), "received response");
    if !status.is_success() {
        return Err(ToolError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
