use reqwatch_core::models::TRACKED_FILE;
use reqwatch_github::fetch::Fetcher;
use serde::Serialize;
use url::Url;

/// What happened to a notification. Delivery is best-effort and never fails a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum DispatchOutcome {
    Delivered,
    /// The target answered with a non-2xx status.
    Rejected { status: u16 },
    /// Nothing was delivered: bad target URL or transport failure.
    Failed { reason: String },
}

pub fn notification_message(pr_number: u64) -> String {
    format!("Latest Pull Request #{pr_number} contains changes to {TRACKED_FILE}.")
}

/// POST `{"message": ...}` to `target` once.
pub async fn notify<F: Fetcher>(fetcher: &F, target: &str, pr_number: u64) -> DispatchOutcome {
    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Invalid notification target {:?}: {}", target, e);
            return DispatchOutcome::Failed { reason: format!("invalid target URL: {e}") };
        }
    };
    let body = serde_json::json!({ "message": notification_message(pr_number) });
    match fetcher.post_json(&url, &body).await {
        Ok(status) if status.is_success() => {
            tracing::info!(
                "Notified {} about PR #{}",
                url.host_str().unwrap_or("[unknown]"),
                pr_number
            );
            DispatchOutcome::Delivered
        }
        Ok(status) => {
            tracing::warn!("Notification for PR #{} rejected with {}", pr_number, status);
            DispatchOutcome::Rejected { status: status.as_u16() }
        }
        Err(e) => {
            tracing::warn!("Failed to deliver notification for PR #{}: {}", pr_number, e);
            DispatchOutcome::Failed { reason: e.to_string() }
        }
    }
}
