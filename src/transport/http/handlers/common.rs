use crate::domain::{ErrorCode, RequestContext, ServiceError};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::OnceLock;
use std::time::Duration;

/// Lets a caller shrink its deadline below the server default.
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout-ms";

/// Builds the per-request context from the server budget and the caller's header.
///
/// A header of `0` means the caller has no budget left; an unparsable header is ignored.
pub fn request_context(state: &AppState, headers: &HeaderMap) -> RequestContext {
    let requested = headers
        .get(REQUEST_TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis);

    let timeout = match requested {
        Some(requested) => requested.min(state.request_timeout),
        None => state.request_timeout,
    };
    RequestContext::with_timeout(timeout)
}

/// 499 Client Closed Request. `http` has no named constant for it.
fn client_closed_request() -> StatusCode {
    static STATUS: OnceLock<StatusCode> = OnceLock::new();
    *STATUS.get_or_init(|| StatusCode::from_u16(499).expect("499 is within 100..=999"))
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Canceled => client_closed_request(),
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: ServiceError) -> Response {
    let code = err.code();
    (
        status_for(code),
        Json(ApiResponse::failure(code, err.to_string())),
    )
        .into_response()
}

pub fn ok_response<T: Serialize>(data: T) -> Response {
    match serde_json::to_value(data) {
        Ok(value) => (StatusCode::OK, Json(ApiResponse::ok(value))).into_response(),
        Err(e) => error_response(ServiceError::internal(format!(
            "Failed to serialize response: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ReviewService;
    use crate::storage::InMemoryReviewStore;
    use axum::http::HeaderValue;
    use std::sync::Arc;

    fn state(timeout_ms: u64) -> AppState {
        AppState {
            review_service: ReviewService::new(Arc::new(InMemoryReviewStore::new())),
            request_timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[test]
    fn every_error_code_has_a_distinct_status() {
        assert_eq!(status_for(ErrorCode::InvalidArgument), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::Canceled).as_u16(), 499);
        assert_eq!(
            status_for(ErrorCode::Internal),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn zero_timeout_header_yields_expired_context() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_TIMEOUT_HEADER, HeaderValue::from_static("0"));
        let ctx = request_context(&state(5_000), &headers);
        assert!(ctx.is_done());
    }

    #[test]
    fn garbage_header_falls_back_to_server_budget() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_TIMEOUT_HEADER, HeaderValue::from_static("soon"));
        let ctx = request_context(&state(5_000), &headers);
        assert!(!ctx.is_done());
        assert!(ctx.deadline().is_some());
    }

    #[test]
    fn header_cannot_extend_server_budget() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_TIMEOUT_HEADER, HeaderValue::from_static("600000"));
        let ctx = request_context(&state(0), &headers);
        assert!(ctx.is_done());
    }
}
