use reqwatch_core::{
    models::{PullRequest, RepositoryRef},
    util::UrlExt,
};

use crate::{
    GitHub, UpstreamError,
    fetch::{Fetched, Fetcher},
};

impl<F: Fetcher> GitHub<F> {
    /// The single most recently updated pull request, whatever its state.
    ///
    /// An empty listing is `Ok(None)`; anything short of a decodable 200 is an error.
    pub async fn select_candidate(
        &self,
        repo: &RepositoryRef,
    ) -> Result<Option<PullRequest>, UpstreamError> {
        let url = self.repo_url(repo, &["pulls"]).with_query([
            ("sort", "updated"),
            ("direction", "desc"),
            ("per_page", "1"),
        ]);
        let body = match self.fetcher.fetch(&url, self.headers(None)).await? {
            Fetched::Body(body) => body,
            Fetched::Unavailable(status) => return Err(UpstreamError::Status(status)),
        };
        let pulls: Vec<PullRequest> = serde_json::from_slice(&body)?;
        Ok(pulls.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::{
        fetch::FetchError,
        mock::{MockFetcher, MockResponse},
    };

    const PULLS: &str =
        "https://api.github.com/repos/acme/widget/pulls?sort=updated&direction=desc&per_page=1";

    fn setup() -> (MockFetcher, GitHub<MockFetcher>, RepositoryRef) {
        let mock = MockFetcher::new();
        let github =
            GitHub::with_fetcher(mock.clone(), Url::parse("https://api.github.com").unwrap());
        (mock, github, RepositoryRef::parse("https://github.com/acme/widget").unwrap())
    }

    #[tokio::test]
    async fn test_select_most_recent() {
        let (mock, github, repo) = setup();
        mock.on_get(
            PULLS,
            MockResponse::json(json!([
                {"number": 7, "state": "closed", "head": {"ref": "old-fix"}, "updated_at": null}
            ])),
        );
        let pr = github.select_candidate(&repo).await.unwrap().unwrap();
        assert_eq!(pr.number, 7);
        assert_eq!(pr.head_branch, "old-fix");
        assert_eq!(mock.calls().len(), 1);
        assert_eq!(mock.calls()[0].url(), PULLS);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let (mock, github, repo) = setup();
        mock.on_get(PULLS, MockResponse::json(json!([])));
        assert!(github.select_candidate(&repo).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listing_failures() {
        let (mock, github, repo) = setup();
        mock.on_get(PULLS, MockResponse::Status(StatusCode::FORBIDDEN));
        assert!(matches!(
            github.select_candidate(&repo).await,
            Err(UpstreamError::Status(StatusCode::FORBIDDEN))
        ));

        mock.on_get(PULLS, MockResponse::Timeout);
        assert!(matches!(
            github.select_candidate(&repo).await,
            Err(UpstreamError::Fetch(FetchError::Timeout))
        ));

        mock.on_get(PULLS, MockResponse::json(json!({"message": "Moved Permanently"})));
        assert!(matches!(github.select_candidate(&repo).await, Err(UpstreamError::Decode(_))));
    }
}
