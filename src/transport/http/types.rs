use crate::app::ReviewService;
use crate::domain::{ErrorCode, Review};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub review_service: ReviewService,
    /// Deadline budget given to every request unless the caller asks for less.
    pub request_timeout: Duration,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            code: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code.as_str().to_string()),
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Wire shape of a review. Timestamps are RFC3339 with second precision.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ReviewDto {
    pub id: i64,
    pub media_id: i64,
    pub user_id: i64,
    pub content: String,
    pub rating: i32,
    #[schema(example = "2024-05-01T12:00:00Z")]
    pub created_at: String,
    #[schema(example = "2024-05-01T12:00:00Z")]
    pub updated_at: String,
}

fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl From<&Review> for ReviewDto {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            media_id: review.media_id,
            user_id: review.user_id,
            content: review.content.clone(),
            rating: review.rating,
            created_at: rfc3339(&review.created_at),
            updated_at: rfc3339(&review.updated_at),
        }
    }
}

impl From<Review> for ReviewDto {
    fn from(review: Review) -> Self {
        Self::from(&review)
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ReviewResponse {
    pub review: ReviewDto,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewDto>,
}

impl ReviewListResponse {
    pub fn from_reviews(reviews: Vec<Review>) -> Self {
        Self {
            reviews: reviews.into_iter().map(ReviewDto::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct DeleteReviewResponse {
    pub success: bool,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::failure(
            ErrorCode::InvalidArgument,
            format!("Invalid JSON body: {} (expected: {})", err, expected),
        )),
    )
}

pub fn path_400(err: PathRejection) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::failure(
            ErrorCode::InvalidArgument,
            format!("Invalid path parameter: {}", err),
        )),
    )
}
