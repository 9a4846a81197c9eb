use crate::app::{CreateReviewRequest, UpdateReviewRequest};
use crate::transport::http::handlers::{health, reviews};
use crate::transport::http::types::{
    ApiResponse, AppState, DeleteReviewResponse, ReviewDto, ReviewListResponse, ReviewResponse,
};
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        reviews::create_review_handler,
        reviews::get_review_handler,
        reviews::update_review_handler,
        reviews::delete_review_handler,
        reviews::list_reviews_handler,
        reviews::list_by_rating_handler,
        reviews::list_by_user_handler,
        reviews::list_by_media_handler
    ),
    components(schemas(
        ApiResponse,
        ReviewDto,
        ReviewResponse,
        ReviewListResponse,
        DeleteReviewResponse,
        CreateReviewRequest,
        UpdateReviewRequest
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/reviews",
            get(reviews::list_reviews_handler).post(reviews::create_review_handler),
        )
        .route(
            "/api/reviews/:id",
            get(reviews::get_review_handler)
                .patch(reviews::update_review_handler)
                .delete(reviews::delete_review_handler),
        )
        .route(
            "/api/reviews/by-rating/:rating",
            get(reviews::list_by_rating_handler),
        )
        .route(
            "/api/reviews/by-user/:user_id",
            get(reviews::list_by_user_handler),
        )
        .route(
            "/api/reviews/by-media/:media_id",
            get(reviews::list_by_media_handler),
        )
        .with_state(app_state)
}
