use std::{error::Error as StdError, future::Future, time::Duration};

use bytes::Bytes;
use reqwest::header::HeaderMap;
pub use reqwest::StatusCode;
use url::Url;

/// Result of a request that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// HTTP 200 with its body.
    Body(Bytes),
    /// Any other status. Missing resources and access errors both land here.
    Unavailable(StatusCode),
}

/// The request never produced a response.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { Self::Timeout } else { Self::Transport(Box::new(err)) }
    }
}

/// Outbound HTTP used by a tick. Each call is attempted once.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> impl Future<Output = Result<Fetched, FetchError>> + Send;

    fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<StatusCode, FetchError>> + Send;
}

/// [`Fetcher`] backed by a shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, headers: HeaderMap) -> Result<Fetched, FetchError> {
        let response = self.client.get(url.clone()).headers(headers).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!("GET {} returned {}", url, status);
            return Ok(Fetched::Unavailable(status));
        }
        Ok(Fetched::Body(response.bytes().await?))
    }

    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
    ) -> Result<StatusCode, FetchError> {
        let response = self.client.post(url.clone()).json(body).send().await?;
        Ok(response.status())
    }
}
