use std::sync::Arc;

use reqwatch_core::models::{
    BASELINE_BRANCH, ComparisonResult, ParseRepositoryError, RepositoryRef, TickOutcome,
};
use reqwatch_github::{GitHub, UpstreamError, fetch::Fetcher};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::notify::{DispatchOutcome, notify};

#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error(transparent)]
    InvalidInput(#[from] ParseRepositoryError),
    #[error("Failed to fetch pull requests for {repo}: {source}")]
    UpstreamUnavailable {
        repo: RepositoryRef,
        #[source]
        source: UpstreamError,
    },
}

/// One check of a repository's most recently updated pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickJob {
    pub repository: RepositoryRef,
    /// Webhook notified when the tracked file changed. `None` only compares.
    pub target: Option<String>,
}

impl TickJob {
    /// Validates the repository URL; nothing is fetched.
    pub fn new(repo_url: &str, target: Option<String>) -> Result<Self, TickError> {
        Ok(Self { repository: RepositoryRef::parse(repo_url)?, target })
    }
}

/// Everything a tick found, for callers that want more than the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    #[serde(flatten)]
    pub outcome: TickOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchOutcome>,
}

/// Blocking tick: parse, then select, compare and notify before returning.
pub async fn run_tick<F: Fetcher>(
    github: &GitHub<F>,
    repo_url: &str,
    target: Option<String>,
) -> Result<TickReport, TickError> {
    let job = TickJob::new(repo_url, target)?;
    process_tick_job(github, &job).await
}

/// Select, compare and notify. Only a failed pull request listing is an error.
pub async fn process_tick_job<F: Fetcher>(
    github: &GitHub<F>,
    job: &TickJob,
) -> Result<TickReport, TickError> {
    let repo = &job.repository;
    let candidate = github
        .select_candidate(repo)
        .await
        .map_err(|source| TickError::UpstreamUnavailable { repo: repo.clone(), source })?;
    let Some(pr) = candidate else {
        tracing::info!("No pull requests found for {}", repo);
        return Ok(TickReport {
            outcome: TickOutcome::no_pull_requests(),
            head_branch: None,
            comparison: None,
            dispatch: None,
        });
    };
    tracing::info!("Checking {}#{} ({})", repo, pr.number, pr.head_branch);

    let comparison = github.compare(repo, &pr.head_branch, BASELINE_BRANCH).await;
    let dispatch = match (comparison, &job.target) {
        (ComparisonResult::Changed, Some(target)) => {
            Some(notify(&github.fetcher, target, pr.number).await)
        }
        (ComparisonResult::Changed, None) => {
            tracing::info!("{}#{} changed, not notifying", repo, pr.number);
            None
        }
        _ => None,
    };
    tracing::info!("Checked {}#{}: {:?}", repo, pr.number, comparison);

    Ok(TickReport {
        outcome: TickOutcome::checked(pr.number),
        head_branch: Some(pr.head_branch),
        comparison: Some(comparison),
        dispatch,
    })
}

/// Run a tick on its own task. The caller gets nothing back but the handle; the
/// tick runs to completion even if the handle is dropped.
pub fn spawn_tick_job<F: Fetcher>(github: Arc<GitHub<F>>, job: TickJob) -> JoinHandle<()> {
    let span = tracing::info_span!("tick", repo = %job.repository);
    tokio::spawn(
        async move {
            match process_tick_job(&github, &job).await {
                Ok(report) => tracing::info!("{}", report.outcome.message),
                Err(e) => tracing::error!("{e}"),
            }
        }
        .instrument(span),
    )
}
