pub mod config;
pub mod models;
pub mod util;

use std::convert::Infallible;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::models::TickOutcome;

pub enum AppError {
    Status(StatusCode),
    /// Rejected input, reported to the caller as a failed outcome.
    BadRequest(String),
    /// An upstream API the request depends on failed.
    BadGateway(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Status(status) if status == StatusCode::NOT_FOUND => {
                (status, "Not found").into_response()
            }
            Self::Status(status) => status.into_response(),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(TickOutcome::failed(message))).into_response()
            }
            Self::BadGateway(message) => {
                tracing::warn!("{message}");
                (StatusCode::BAD_GATEWAY, Json(TickOutcome::failed(message))).into_response()
            }
            Self::Internal(err) => {
                tracing::error!("{:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(TickOutcome::failed(format!("Something went wrong: {err}"))),
                )
                    .into_response()
            }
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self { Self::Internal(err.into()) }
}

/// Scheme and authority the client used to reach us, e.g. `https://reqwatch.example`.
/// Honors `x-forwarded-proto` and `x-forwarded-host` when behind a proxy.
pub struct RequestOrigin(pub String);

impl<S> FromRequestParts<S> for RequestOrigin
where S: Send + Sync
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_str = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());
        let scheme = header_str("x-forwarded-proto")
            .or_else(|| parts.uri.scheme_str())
            .unwrap_or("http")
            .to_string();
        let host = header_str("x-forwarded-host")
            .or_else(|| header_str(header::HOST.as_str()))
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost")
            .to_string();
        Ok(RequestOrigin(format!("{scheme}://{host}")))
    }
}
