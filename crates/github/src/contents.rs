use base64::Engine;
use reqwatch_core::{
    models::{ComparisonResult, FileSnapshot, RepositoryRef, TRACKED_FILE},
    util::UrlExt,
};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    GITHUB_JSON, GitHub,
    fetch::{FetchError, Fetched, Fetcher},
};

/// The file's content could not be determined on a branch.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("GitHub returned {0}")]
    Status(StatusCode),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("unexpected response body")]
    Decode(#[from] serde_json::Error),
    #[error("content not inlined (encoding {0:?})")]
    NotInline(String),
    #[error("invalid base64 content")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// Decode a contents API body. GitHub wraps the base64 payload in newlines.
pub fn decode_content(body: &[u8]) -> Result<FileSnapshot, ContentError> {
    let response: ContentsResponse = serde_json::from_slice(body)?;
    let Some(content) = response.content else {
        return Ok(FileSnapshot::Absent);
    };
    match response.encoding.as_deref() {
        None | Some("base64") => {}
        Some(other) => return Err(ContentError::NotInline(other.to_string())),
    }
    let compact = content.split_ascii_whitespace().collect::<String>();
    Ok(FileSnapshot::Present(base64::engine::general_purpose::STANDARD.decode(compact)?))
}

impl<F: Fetcher> GitHub<F> {
    /// The tracked file on `branch`. A 404 means the branch has no such file.
    pub async fn file_snapshot(
        &self,
        repo: &RepositoryRef,
        branch: &str,
    ) -> Result<FileSnapshot, ContentError> {
        let url =
            self.repo_url(repo, &["contents", TRACKED_FILE]).with_query([("ref", branch)]);
        match self.fetcher.fetch(&url, self.headers(Some(GITHUB_JSON))).await? {
            Fetched::Body(body) => decode_content(&body),
            Fetched::Unavailable(StatusCode::NOT_FOUND) => Ok(FileSnapshot::Absent),
            Fetched::Unavailable(status) => Err(ContentError::Status(status)),
        }
    }

    /// Fetch the tracked file on both branches concurrently and compare them.
    pub async fn compare(
        &self,
        repo: &RepositoryRef,
        candidate_branch: &str,
        baseline_branch: &str,
    ) -> ComparisonResult {
        let (candidate, baseline) = tokio::join!(
            self.file_snapshot(repo, candidate_branch),
            self.file_snapshot(repo, baseline_branch),
        );
        let available = |result: Result<FileSnapshot, ContentError>, branch: &str| {
            result.unwrap_or_else(|e| {
                tracing::warn!("{TRACKED_FILE} unavailable on {repo}@{branch}: {e}");
                FileSnapshot::Absent
            })
        };
        let candidate = available(candidate, candidate_branch);
        let baseline = available(baseline, baseline_branch);
        let result = ComparisonResult::of(&candidate, &baseline);
        tracing::debug!(
            "{repo}: {TRACKED_FILE} on {candidate_branch} vs {baseline_branch}: {result:?}"
        );
        result
    }
}
