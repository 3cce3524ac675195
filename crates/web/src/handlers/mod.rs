use axum::{
    Router,
    routing::{get, post},
};
use reqwatch_github::fetch::Fetcher;

use crate::AppState;

mod integration;
mod tick;

pub fn build_router<F: Fetcher>() -> Router<AppState<F>> {
    Router::new()
        .route("/integration.json", get(integration::get_integration::<F>))
        .route("/tick", post(tick::tick::<F>))
}
