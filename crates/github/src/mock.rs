//! In-memory [`Fetcher`] that serves canned responses and records every call.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use bytes::Bytes;
use reqwest::{StatusCode, header::HeaderMap};
use url::Url;

use crate::fetch::{FetchError, Fetched, Fetcher};

#[derive(Debug, Clone)]
pub enum MockResponse {
    Ok(Bytes),
    Status(StatusCode),
    Timeout,
    Transport(&'static str),
}

impl MockResponse {
    pub fn json(value: serde_json::Value) -> Self { Self::Ok(Bytes::from(value.to_string())) }

    /// A contents API response carrying `content` the way GitHub encodes it.
    pub fn file_content(content: &[u8]) -> Self {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        // GitHub wraps the payload every 60 characters
        let wrapped = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| std::str::from_utf8(c).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n");
        Self::json(serde_json::json!({
            "type": "file",
            "encoding": "base64",
            "path": "requirements.txt",
            "content": format!("{wrapped}\n"),
        }))
    }

    fn into_result(self) -> Result<Fetched, FetchError> {
        match self {
            Self::Ok(body) => Ok(Fetched::Body(body)),
            Self::Status(status) => Ok(Fetched::Unavailable(status)),
            Self::Timeout => Err(FetchError::Timeout),
            Self::Transport(msg) => Err(FetchError::Transport(msg.into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Get { url: String, headers: HeaderMap },
    Post { url: String, body: serde_json::Value },
}

impl MockCall {
    pub fn url(&self) -> &str {
        match self {
            Self::Get { url, .. } | Self::Post { url, .. } => url,
        }
    }
}

#[derive(Default)]
struct MockState {
    gets: HashMap<String, MockResponse>,
    post_response: Option<MockResponse>,
    calls: Vec<MockCall>,
}

/// Unregistered GET URLs answer 404; POSTs answer 200 unless overridden.
#[derive(Clone, Default)]
pub struct MockFetcher {
    state: Arc<Mutex<MockState>>,
}

impl MockFetcher {
    pub fn new() -> Self { Self::default() }

    pub fn on_get(&self, url: &str, response: MockResponse) -> &Self {
        self.lock().gets.insert(url.to_string(), response);
        self
    }

    pub fn on_post(&self, response: MockResponse) -> &Self {
        self.lock().post_response = Some(response);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> { self.lock().calls.clone() }

    pub fn posts(&self) -> Vec<(String, serde_json::Value)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Post { url, body } => Some((url.clone(), body.clone())),
                MockCall::Get { .. } => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &Url, headers: HeaderMap) -> Result<Fetched, FetchError> {
        let response = {
            let mut state = self.lock();
            state.calls.push(MockCall::Get { url: url.to_string(), headers });
            state.gets.get(url.as_str()).cloned()
        };
        response.unwrap_or(MockResponse::Status(StatusCode::NOT_FOUND)).into_result()
    }

    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
    ) -> Result<StatusCode, FetchError> {
        let response = {
            let mut state = self.lock();
            state.calls.push(MockCall::Post { url: url.to_string(), body: body.clone() });
            state.post_response.clone()
        };
        match response.unwrap_or(MockResponse::Status(StatusCode::OK)).into_result()? {
            Fetched::Body(_) => Ok(StatusCode::OK),
            Fetched::Unavailable(status) => Ok(status),
        }
    }
}
