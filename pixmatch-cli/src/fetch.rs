//! Downloading query images over HTTP.

use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0";
const TIMEOUT: Duration = Duration::from_secs(30);

/// Returns true when `target` should be fetched rather than opened.
pub fn is_url(target: &str) -> bool {
    let lower = target.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Downloads `url` into memory.
pub fn download(url: &str) -> Result<Vec<u8>, reqwest::Error> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()?;
    let response = client.get(url.trim()).send()?.error_for_status()?;
    tracing::info!(status = %response.status(), "downloaded query image");
    Ok(response.bytes()?.to_vec())
}
