use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reqwatch_core::{AppError, models::TickOutcome};
use reqwatch_github::fetch::Fetcher;
use reqwatch_jobs::{TickError, TickJob, process_tick_job, spawn_tick_job};
use serde::Deserialize;

use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TickParams {
    /// Run the tick before responding instead of acknowledging first.
    #[serde(default)]
    wait: bool,
    repo_url: Option<String>,
    #[serde(alias = "telex_webhook_url")]
    webhook_url: Option<String>,
}

/// Either the direct shape or the integration platform's settings list.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TickRequest {
    #[serde(alias = "repository_url")]
    repo_url: Option<String>,
    #[serde(alias = "telex_webhook_url", alias = "return_url")]
    webhook_url: Option<String>,
    settings: Vec<Setting>,
}

#[derive(Debug, Deserialize)]
struct Setting {
    label: String,
    #[serde(default)]
    default: serde_json::Value,
}

impl TickRequest {
    fn repository_url(&self) -> Option<&str> {
        if let Some(url) = self.repo_url.as_deref() {
            return Some(url);
        }
        self.settings
            .iter()
            .find(|s| s.label.to_ascii_lowercase().contains("repository"))
            .and_then(|s| s.default.as_str())
    }
}

pub async fn tick<F: Fetcher>(
    State(state): State<AppState<F>>,
    Query(params): Query<TickParams>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: TickRequest = if body.is_empty() {
        TickRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };
    // Body fields, including the settings list, take precedence over query parameters
    let repo_url = request
        .repository_url()
        .or(params.repo_url.as_deref())
        .ok_or_else(|| AppError::BadRequest("Missing GitHub repository URL".to_string()))?;
    let Some(target) = request.webhook_url.clone().or(params.webhook_url) else {
        return Err(AppError::BadRequest("Missing notification webhook URL".to_string()));
    };
    let job = TickJob::new(repo_url, Some(target)).map_err(tick_error)?;

    if params.wait {
        let report = process_tick_job(&state.github, &job).await.map_err(tick_error)?;
        return Ok(Json(report.outcome).into_response());
    }
    let outcome = TickOutcome::accepted(&job.repository);
    tracing::info!("Accepted tick for {}", job.repository);
    spawn_tick_job(state.github.clone(), job);
    Ok((StatusCode::ACCEPTED, Json(outcome)).into_response())
}

fn tick_error(err: TickError) -> AppError {
    match err {
        TickError::InvalidInput(e) => AppError::BadRequest(e.to_string()),
        e @ TickError::UpstreamUnavailable { .. } => AppError::BadGateway(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_from_settings() {
        let request: TickRequest = serde_json::from_str(
            r#"{
                "channel_id": "0195",
                "return_url": "https://ping.example/return/0195",
                "settings": [
                    {"label": "interval", "type": "dropdown", "default": "Daily"},
                    {"label": "Github Repository URL", "type": "text", "default": "https://github.com/acme/widget"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(request.repository_url(), Some("https://github.com/acme/widget"));
        assert_eq!(request.webhook_url.as_deref(), Some("https://ping.example/return/0195"));
    }

    #[test]
    fn test_direct_shape_wins() {
        let request: TickRequest = serde_json::from_str(
            r#"{
                "repo_url": "https://github.com/acme/widget",
                "settings": [{"label": "Repository", "default": "https://github.com/other/repo"}]
            }"#,
        )
        .unwrap();
        assert_eq!(request.repository_url(), Some("https://github.com/acme/widget"));
        assert!(request.webhook_url.is_none());
    }
}
