use axum::{Json, extract::State};
use reqwatch_core::RequestOrigin;
use reqwatch_github::fetch::Fetcher;
use serde_json::{Value, json};

use crate::AppState;

/// Static metadata the integration platform reads to register the tick endpoint.
pub async fn get_integration<F: Fetcher>(
    State(state): State<AppState<F>>,
    RequestOrigin(origin): RequestOrigin,
) -> Json<Value> {
    let integration = &state.config.integration;
    let base_url = integration.base_url.as_deref().unwrap_or(&origin).trim_end_matches('/');
    let target_url = integration.target_url.as_deref().unwrap_or(base_url);
    Json(json!({
        "data": {
            "date": {"created_at": "2025-02-20", "updated_at": "2025-02-20"},
            "descriptions": {
                "app_name": "DependencyTracker",
                "app_description": "Monitors pull requests for changes to requirements.txt and notifies the channel.",
                "app_logo": "https://avatars.githubusercontent.com/u/27347476?s=280&v=4",
                "app_url": base_url,
                "background_color": "#fff",
            },
            "is_active": true,
            "integration_type": "interval",
            "integration_category": "Email & Messaging",
            "key_features": ["github", "dependency tracker", "requirements.txt"],
            "author": "Godstime01",
            "settings": [
                {
                    "label": "interval",
                    "type": "dropdown",
                    "required": true,
                    "default": "Daily",
                    "options": ["Daily", "Weekly", "Monthly"],
                },
                {
                    "label": "Github Repository URL",
                    "type": "text",
                    "description": "Link to the repository you intend to track",
                    "required": true,
                    "default": "",
                },
            ],
            "target_url": target_url,
            "tick_url": format!("{base_url}/tick"),
        }
    }))
}
