//! HTTP plumbing shared by the pollution feed and the city air client.

mod url_param;

pub use url_param::UrlParam;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// Minimal async HTTP abstraction so feed logic can be tested without a network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

/// Plain reqwest-backed client with bounded timeouts.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}

/// Issues a GET and parses the body as JSON.
///
/// # Errors
///
/// Returns an error on transport failure, a non-2xx status, or a body that
/// is not valid JSON.
pub async fn fetch_json<C: HttpClient>(client: &C, url: &str) -> Result<serde_json::Value> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("GET {url} returned status {status}");
    }

    Ok(resp.json().await?)
}
