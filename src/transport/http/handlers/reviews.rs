use crate::app::{CreateReviewRequest, UpdateReviewRequest};
use crate::domain::{Review, ServiceError};
use crate::transport::http::handlers::common::{error_response, ok_response, request_context};
use crate::transport::http::types::{
    json_422, path_400, ApiResponse, AppState, DeleteReviewResponse, ReviewDto,
    ReviewListResponse, ReviewResponse,
};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;

fn review_response(review: Review) -> Response {
    ok_response(ReviewResponse {
        review: ReviewDto::from(review),
    })
}

fn list_response(result: Result<Vec<Review>, ServiceError>) -> Response {
    match result {
        Ok(reviews) => ok_response(ReviewListResponse::from_reviews(reviews)),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    params(
        ("x-request-timeout-ms" = Option<u64>, Header, description = "Caller deadline in milliseconds")
    ),
    responses(
        (status = 200, description = "Review created", body = ApiResponse),
        (status = 400, description = "Rating out of range", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 499, description = "Request context cancelled", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn create_review_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(
                e,
                "{\"media_id\": int, \"user_id\": int, \"content\": string, \"rating\": 1..10}",
            )
            .into_response()
        }
    };

    let ctx = request_context(&state, &headers);
    match state.review_service.create(&ctx, request).await {
        Ok(review) => review_response(review),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    params(
        ("id" = i64, Path, description = "Review id")
    ),
    responses(
        (status = 200, description = "Review found", body = ApiResponse),
        (status = 404, description = "No review with this id", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn get_review_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(v) => v,
        Err(e) => return path_400(e).into_response(),
    };

    let ctx = request_context(&state, &headers);
    match state.review_service.get_by_id(&ctx, id).await {
        Ok(review) => review_response(review),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/reviews/{id}",
    params(
        ("id" = i64, Path, description = "Review id")
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse),
        (status = 400, description = "Rating out of range", body = ApiResponse),
        (status = 404, description = "No review with this id", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn update_review_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
    request: Result<Json<UpdateReviewRequest>, JsonRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(v) => v,
        Err(e) => return path_400(e).into_response(),
    };
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"content\"?: string, \"rating\"?: 1..10}").into_response()
        }
    };

    let ctx = request_context(&state, &headers);
    match state.review_service.update(&ctx, id, request).await {
        Ok(review) => review_response(review),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(
        ("id" = i64, Path, description = "Review id")
    ),
    responses(
        (status = 200, description = "Review deleted", body = ApiResponse),
        (status = 404, description = "No review with this id", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn delete_review_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(v) => v,
        Err(e) => return path_400(e).into_response(),
    };

    let ctx = request_context(&state, &headers);
    match state.review_service.delete(&ctx, id).await {
        Ok(success) => ok_response(DeleteReviewResponse { success }),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "All reviews", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_reviews_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = request_context(&state, &headers);
    list_response(state.review_service.list(&ctx).await)
}

#[utoipa::path(
    get,
    path = "/api/reviews/by-rating/{rating}",
    params(
        ("rating" = i32, Path, description = "Rating between 1 and 10")
    ),
    responses(
        (status = 200, description = "Reviews with this rating", body = ApiResponse),
        (status = 400, description = "Rating out of range", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_by_rating_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    rating: Result<Path<i32>, PathRejection>,
) -> Response {
    let Path(rating) = match rating {
        Ok(v) => v,
        Err(e) => return path_400(e).into_response(),
    };

    let ctx = request_context(&state, &headers);
    list_response(state.review_service.list_by_rating(&ctx, rating).await)
}

#[utoipa::path(
    get,
    path = "/api/reviews/by-user/{user_id}",
    params(
        ("user_id" = i64, Path, description = "Author id")
    ),
    responses(
        (status = 200, description = "Reviews by this author", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_by_user_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    user_id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Path(user_id) = match user_id {
        Ok(v) => v,
        Err(e) => return path_400(e).into_response(),
    };

    let ctx = request_context(&state, &headers);
    list_response(state.review_service.list_by_author(&ctx, user_id).await)
}

#[utoipa::path(
    get,
    path = "/api/reviews/by-media/{media_id}",
    params(
        ("media_id" = i64, Path, description = "Media item id")
    ),
    responses(
        (status = 200, description = "Reviews of this media item", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_by_media_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    media_id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Path(media_id) = match media_id {
        Ok(v) => v,
        Err(e) => return path_400(e).into_response(),
    };

    let ctx = request_context(&state, &headers);
    list_response(
        state
            .review_service
            .list_by_media_subject(&ctx, media_id)
            .await,
    )
}
