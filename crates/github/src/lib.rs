pub mod contents;
pub mod fetch;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod pulls;

use reqwatch_core::{config::GitHubConfig, models::RepositoryRef, util::UrlExt};
use reqwest::{
    StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};
use url::Url;

use crate::fetch::{FetchError, Fetcher, HttpFetcher};

/// Media type for the structured (JSON, base64 content) representation.
pub const GITHUB_JSON: &str = "application/vnd.github.v3+json";

#[derive(Debug, thiserror::Error)]
pub enum GitHubSetupError {
    #[error("invalid GitHub API URL {0:?}")]
    ApiUrl(String, #[source] url::ParseError),
    #[error("invalid GitHub token")]
    Token,
    #[error("failed to create HTTP client")]
    Client(#[from] reqwest::Error),
}

/// A required GitHub API call failed.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("GitHub returned {0}")]
    Status(StatusCode),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("unexpected response body")]
    Decode(#[from] serde_json::Error),
}

/// Thin REST client over the three endpoints a tick needs.
///
/// Requests go through a [`Fetcher`] rather than a typed API client so callers see the raw
/// status of every response (a 404 on the contents endpoint is an answer, not an error) and
/// tests can swap in an in-memory fetcher.
#[derive(Clone)]
pub struct GitHub<F = HttpFetcher> {
    pub fetcher: F,
    api_url: Url,
    auth: Option<HeaderValue>,
}

impl GitHub<HttpFetcher> {
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubSetupError> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| GitHubSetupError::ApiUrl(config.api_url.clone(), e))?;
        let fetcher = HttpFetcher::new(&config.user_agent, config.timeout())?;
        let mut github = Self::with_fetcher(fetcher, api_url);
        if let Some(token) = &config.token {
            github = github.with_token(token)?;
        }
        tracing::info!(
            "GitHub API at {} ({})",
            github.api_url,
            if github.auth.is_some() { "authenticated" } else { "anonymous" }
        );
        Ok(github)
    }
}

impl<F: Fetcher> GitHub<F> {
    pub fn with_fetcher(fetcher: F, api_url: Url) -> Self { Self { fetcher, api_url, auth: None } }

    pub fn with_token(mut self, token: &str) -> Result<Self, GitHubSetupError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| GitHubSetupError::Token)?;
        value.set_sensitive(true);
        self.auth = Some(value);
        Ok(self)
    }

    /// `{api}/repos/{owner}/{name}/{rest...}`
    pub fn repo_url<'a>(&self, repo: &'a RepositoryRef, rest: &[&'a str]) -> Url {
        let base = ["repos", repo.owner.as_str(), repo.name.as_str()];
        self.api_url.with_segments(base.into_iter().chain(rest.iter().copied()))
    }

    fn headers(&self, accept: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(accept) = accept {
            headers.insert(ACCEPT, HeaderValue::from_static(accept));
        }
        if let Some(auth) = &self.auth {
            headers.insert(AUTHORIZATION, auth.clone());
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFetcher;

    fn github() -> GitHub<MockFetcher> {
        GitHub::with_fetcher(MockFetcher::new(), Url::parse("https://api.github.com").unwrap())
    }

    #[test]
    fn test_repo_url() {
        let github = github();
        let repo = RepositoryRef::parse("https://github.com/acme/widget").unwrap();
        assert_eq!(
            github.repo_url(&repo, &["contents", "requirements.txt"]).as_str(),
            "https://api.github.com/repos/acme/widget/contents/requirements.txt"
        );
    }

    #[test]
    fn test_token_header() {
        let authed = github().with_token("secret").unwrap();
        let headers = authed.headers(Some(GITHUB_JSON));
        assert_eq!(headers[ACCEPT], GITHUB_JSON);
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");

        assert!(github().headers(None).is_empty());
        assert!(matches!(github().with_token("bad\ntoken"), Err(GitHubSetupError::Token)));
    }
}
