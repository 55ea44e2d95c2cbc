mod client;
mod basic;

pub use client::HttpClient;
pub use basic::BasicClient;

use crate::error::SourceError;

/// Issues a single `GET` and returns the body of a successful response.
///
/// Non-success statuses are reported as [`SourceError::Transport`].
pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>, SourceError> {
    let url = url
        .parse::<reqwest::Url>()
        .map_err(|e| SourceError::Transport(format!("invalid url '{url}': {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Transport(format!("service returned status {status}")));
    }

    Ok(resp.bytes().await?.to_vec())
}
