//! The review request handler.
//!
//! This module sits between the transport and the storage port. For every
//! operation it:
//! 1.  Refuses to start if the request context is already cancelled.
//! 2.  Validates ratings before any storage write. Update fetches the record
//!     first, so an unknown id reports "not found" ahead of a bad rating.
//! 3.  Calls the [`ReviewStore`] and folds its errors into [`ServiceError`],
//!     keeping "not found" distinct from every other failure.
//! 4.  Emits one log event describing the outcome.

use crate::domain::{NewReview, Rating, RequestContext, Review, ReviewPatch, ServiceError};
use crate::storage::{ReviewStore, StoreError};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct CreateReviewRequest {
    pub media_id: i64,
    pub user_id: i64,
    pub content: String,
    /// Must be between 1 and 10. Omitted means 0, which is rejected.
    #[serde(default)]
    pub rating: i32,
}

#[derive(Deserialize, Debug, Clone, Default, ToSchema)]
pub struct UpdateReviewRequest {
    /// Replaces the content when non-empty.
    #[serde(default)]
    pub content: Option<String>,
    /// Replaces the rating when non-zero; must then be between 1 and 10.
    #[serde(default)]
    pub rating: Option<i32>,
}

/// Stateless apart from the shared store handle; clone freely per request.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn ReviewStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn ReviewStore {
        self.store.as_ref()
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: CreateReviewRequest,
    ) -> Result<Review, ServiceError> {
        const OPERATION: &str = "create";
        ensure_live(ctx, OPERATION)?;

        let rating = Rating::new(request.rating).map_err(|e| rejected(OPERATION, e))?;
        let new_review = NewReview {
            media_id: request.media_id,
            user_id: request.user_id,
            content: request.content,
            rating,
        };

        let review = self.store.create(&new_review).await.map_err(|e| {
            storage_failure(OPERATION, "Failed to create review", e)
        })?;

        info!(
            operation = OPERATION,
            review_id = review.id,
            media_id = review.media_id,
            user_id = review.user_id,
            "review created"
        );
        Ok(review)
    }

    pub async fn get_by_id(&self, ctx: &RequestContext, id: i64) -> Result<Review, ServiceError> {
        const OPERATION: &str = "get_by_id";
        ensure_live(ctx, OPERATION)?;

        let review = self
            .store
            .get_by_id(id)
            .await
            .map_err(|e| storage_failure(OPERATION, "Failed to get review", e))?;

        info!(operation = OPERATION, review_id = id, "review fetched");
        Ok(review)
    }

    /// Partial update: empty content and a zero rating leave the stored values alone.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        request: UpdateReviewRequest,
    ) -> Result<Review, ServiceError> {
        const OPERATION: &str = "update";
        ensure_live(ctx, OPERATION)?;

        let mut review = self
            .store
            .get_by_id(id)
            .await
            .map_err(|e| storage_failure(OPERATION, "Failed to get review", e))?;

        let patch = ReviewPatch::from_wire(request.content, request.rating)
            .map_err(|e| rejected(OPERATION, e))?;
        review.apply(patch);

        let review = self
            .store
            .update(&review)
            .await
            .map_err(|e| storage_failure(OPERATION, "Failed to update review", e))?;

        info!(operation = OPERATION, review_id = id, rating = review.rating, "review updated");
        Ok(review)
    }

    /// Checks existence first so a missing id never reaches the delete statement.
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<bool, ServiceError> {
        const OPERATION: &str = "delete";
        ensure_live(ctx, OPERATION)?;

        self.store
            .get_by_id(id)
            .await
            .map_err(|e| storage_failure(OPERATION, "Failed to check review existence", e))?;

        self.store
            .delete(id)
            .await
            .map_err(|e| storage_failure(OPERATION, "Failed to delete review", e))?;

        info!(operation = OPERATION, review_id = id, "review deleted");
        Ok(true)
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Review>, ServiceError> {
        const OPERATION: &str = "list";
        ensure_live(ctx, OPERATION)?;

        let reviews = self
            .store
            .get_all()
            .await
            .map_err(|e| storage_failure(OPERATION, "Failed to get reviews", e))?;

        info!(operation = OPERATION, count = reviews.len(), "reviews fetched");
        Ok(reviews)
    }

    pub async fn list_by_rating(
        &self,
        ctx: &RequestContext,
        rating: i32,
    ) -> Result<Vec<Review>, ServiceError> {
        const OPERATION: &str = "list_by_rating";
        ensure_live(ctx, OPERATION)?;

        let rating = Rating::new(rating).map_err(|e| rejected(OPERATION, e))?;

        let reviews = self
            .store
            .get_by_rating(rating.get())
            .await
            .map_err(|e| storage_failure(OPERATION, "Failed to get reviews by rating", e))?;

        info!(
            operation = OPERATION,
            rating = rating.get(),
            count = reviews.len(),
            "reviews fetched"
        );
        Ok(reviews)
    }

    pub async fn list_by_author(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> Result<Vec<Review>, ServiceError> {
        const OPERATION: &str = "list_by_author";
        ensure_live(ctx, OPERATION)?;

        let reviews = self
            .store
            .get_by_user(user_id)
            .await
            .map_err(|e| storage_failure(OPERATION, "Failed to get reviews by user", e))?;

        info!(operation = OPERATION, user_id, count = reviews.len(), "reviews fetched");
        Ok(reviews)
    }

    pub async fn list_by_media_subject(
        &self,
        ctx: &RequestContext,
        media_id: i64,
    ) -> Result<Vec<Review>, ServiceError> {
        const OPERATION: &str = "list_by_media_subject";
        ensure_live(ctx, OPERATION)?;

        let reviews = self
            .store
            .get_by_media(media_id)
            .await
            .map_err(|e| storage_failure(OPERATION, "Failed to get reviews by media", e))?;

        info!(operation = OPERATION, media_id, count = reviews.len(), "reviews fetched");
        Ok(reviews)
    }
}

fn ensure_live(ctx: &RequestContext, operation: &'static str) -> Result<(), ServiceError> {
    match ctx.err() {
        None => Ok(()),
        Some(reason) => {
            error!(operation, error = reason, "operation canceled");
            Err(ServiceError::canceled(reason))
        }
    }
}

fn rejected(operation: &'static str, err: ServiceError) -> ServiceError {
    warn!(operation, error = %err, "invalid argument");
    err
}

fn storage_failure(operation: &'static str, action: &str, err: StoreError) -> ServiceError {
    match err {
        StoreError::NotFound { id } => {
            warn!(operation, review_id = id, "review not found");
            ServiceError::not_found(format!("Review not found: {}", err))
        }
        StoreError::Database { .. } => {
            error!(operation, error = %err, "{}", action);
            ServiceError::internal(format!("{}: {}", action, err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::storage::review::MockReviewStore;
    use crate::storage::InMemoryReviewStore;
    use chrono::Utc;
    use rstest::rstest;

    fn service(store: impl ReviewStore + 'static) -> ReviewService {
        ReviewService::new(Arc::new(store))
    }

    fn stored(id: i64, content: &str, rating: i32) -> Review {
        let now = Utc::now();
        Review {
            id,
            media_id: 7,
            user_id: 3,
            content: content.to_string(),
            rating,
            created_at: now,
            updated_at: now,
        }
    }

    fn create_request(rating: i32) -> CreateReviewRequest {
        CreateReviewRequest {
            media_id: 7,
            user_id: 3,
            content: "great".to_string(),
            rating,
        }
    }

    fn cancelled() -> RequestContext {
        let ctx = RequestContext::new();
        ctx.cancel();
        ctx
    }

    #[tokio::test]
    async fn end_to_end_scenario_against_memory_store() {
        let svc = service(InMemoryReviewStore::new());
        let ctx = RequestContext::new();

        let created = svc.create(&ctx, create_request(9)).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.rating, 9);

        let fetched = svc.get_by_id(&ctx, 1).await.unwrap();
        assert_eq!(fetched, created);

        let updated = svc
            .update(
                &ctx,
                1,
                UpdateReviewRequest {
                    content: Some(String::new()),
                    rating: Some(5),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.content, "great");
        assert_eq!(updated.rating, 5);

        let by_rating = svc.list_by_rating(&ctx, 5).await.unwrap();
        assert!(by_rating.iter().any(|r| r.id == 1));

        assert!(svc.delete(&ctx, 1).await.unwrap());
        let err = svc.get_by_id(&ctx, 1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(11)]
    #[tokio::test]
    async fn create_rejects_out_of_range_rating_without_storage(#[case] rating: i32) {
        let svc = service(MockReviewStore::new());
        let err = svc
            .create(&RequestContext::new(), create_request(rating))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(err.to_string(), "Rating must be between 1 and 10");
    }

    #[rstest]
    #[case(1)]
    #[case(10)]
    #[tokio::test]
    async fn create_accepts_boundary_ratings(#[case] rating: i32) {
        let svc = service(InMemoryReviewStore::new());
        let review = svc
            .create(&RequestContext::new(), create_request(rating))
            .await
            .unwrap();
        assert_eq!(review.rating, rating);
    }

    #[tokio::test]
    async fn create_maps_storage_failure_to_internal() {
        let mut store = MockReviewStore::new();
        store
            .expect_create()
            .times(1)
            .returning(|_| Err(StoreError::database("connection refused")));

        let err = service(store)
            .create(&RequestContext::new(), create_request(9))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
        assert!(err.to_string().starts_with("Failed to create review"));
    }

    #[tokio::test]
    async fn get_missing_review_is_not_found_not_internal() {
        let mut store = MockReviewStore::new();
        store
            .expect_get_by_id()
            .times(1)
            .returning(|id| Err(StoreError::NotFound { id }));

        let err = service(store)
            .get_by_id(&RequestContext::new(), 404)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn get_maps_other_storage_failures_to_internal() {
        let mut store = MockReviewStore::new();
        store
            .expect_get_by_id()
            .times(1)
            .returning(|_| Err(StoreError::database("timeout")));

        let err = service(store)
            .get_by_id(&RequestContext::new(), 1)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[tokio::test]
    async fn update_with_sentinels_keeps_record_unchanged() {
        let svc = service(InMemoryReviewStore::new());
        let ctx = RequestContext::new();
        let created = svc.create(&ctx, create_request(9)).await.unwrap();

        let updated = svc
            .update(
                &ctx,
                created.id,
                UpdateReviewRequest {
                    content: Some(String::new()),
                    rating: Some(0),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.content, created.content);
        assert_eq!(updated.rating, created.rating);
        assert_eq!(updated.media_id, created.media_id);
        assert_eq!(updated.user_id, created.user_id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_replaces_content_when_present() {
        let svc = service(InMemoryReviewStore::new());
        let ctx = RequestContext::new();
        let created = svc.create(&ctx, create_request(9)).await.unwrap();

        let updated = svc
            .update(
                &ctx,
                created.id,
                UpdateReviewRequest {
                    content: Some("actually fine".to_string()),
                    rating: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.content, "actually fine");
        assert_eq!(updated.rating, 9);
    }

    #[rstest]
    #[case(-5)]
    #[case(11)]
    #[tokio::test]
    async fn update_rejects_out_of_range_rating_without_writing(#[case] rating: i32) {
        let mut store = MockReviewStore::new();
        store
            .expect_get_by_id()
            .times(1)
            .returning(|id| Ok(stored(id, "great", 9)));
        store.expect_update().never();

        let err = service(store)
            .update(
                &RequestContext::new(),
                1,
                UpdateReviewRequest {
                    content: None,
                    rating: Some(rating),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn update_missing_review_is_not_found_and_skips_update() {
        let mut store = MockReviewStore::new();
        store
            .expect_get_by_id()
            .times(1)
            .returning(|id| Err(StoreError::NotFound { id }));
        store.expect_update().never();

        let err = service(store)
            .update(&RequestContext::new(), 9, UpdateReviewRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_missing_review_with_bad_rating_is_not_found() {
        let svc = service(InMemoryReviewStore::new());
        let err = svc
            .update(
                &RequestContext::new(),
                999,
                UpdateReviewRequest {
                    content: None,
                    rating: Some(11),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_persists_merged_record() {
        let mut store = MockReviewStore::new();
        store
            .expect_get_by_id()
            .times(1)
            .returning(|id| Ok(stored(id, "great", 9)));
        store
            .expect_update()
            .withf(|r| r.id == 2 && r.content == "great" && r.rating == 4)
            .times(1)
            .returning(|r| Ok(r.clone()));

        let review = service(store)
            .update(
                &RequestContext::new(),
                2,
                UpdateReviewRequest {
                    content: None,
                    rating: Some(4),
                },
            )
            .await
            .unwrap();
        assert_eq!(review.rating, 4);
    }

    #[tokio::test]
    async fn update_maps_write_failure_to_internal() {
        let mut store = MockReviewStore::new();
        store
            .expect_get_by_id()
            .returning(|id| Ok(stored(id, "great", 9)));
        store
            .expect_update()
            .times(1)
            .returning(|_| Err(StoreError::database("deadlock detected")));

        let err = service(store)
            .update(&RequestContext::new(), 2, UpdateReviewRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[tokio::test]
    async fn delete_missing_review_never_issues_delete() {
        let mut store = MockReviewStore::new();
        store
            .expect_get_by_id()
            .times(1)
            .returning(|id| Err(StoreError::NotFound { id }));
        store.expect_delete().never();

        let err = service(store)
            .delete(&RequestContext::new(), 12)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_existing_review_succeeds() {
        let mut store = MockReviewStore::new();
        store
            .expect_get_by_id()
            .times(1)
            .returning(|id| Ok(stored(id, "great", 9)));
        store
            .expect_delete()
            .withf(|id| *id == 12)
            .times(1)
            .returning(|_| Ok(()));

        assert!(service(store)
            .delete(&RequestContext::new(), 12)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn delete_maps_existence_check_failure_to_internal() {
        let mut store = MockReviewStore::new();
        store
            .expect_get_by_id()
            .times(1)
            .returning(|_| Err(StoreError::database("broken pipe")));
        store.expect_delete().never();

        let err = service(store)
            .delete(&RequestContext::new(), 12)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
        assert!(err.to_string().starts_with("Failed to check review existence"));
    }

    #[tokio::test]
    async fn list_operations_return_empty_vectors_when_nothing_matches() {
        let svc = service(InMemoryReviewStore::new());
        let ctx = RequestContext::new();
        assert!(svc.list(&ctx).await.unwrap().is_empty());
        assert!(svc.list_by_rating(&ctx, 3).await.unwrap().is_empty());
        assert!(svc.list_by_author(&ctx, 3).await.unwrap().is_empty());
        assert!(svc.list_by_media_subject(&ctx, 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_filters_route_to_matching_store_calls() {
        let svc = service(InMemoryReviewStore::new());
        let ctx = RequestContext::new();
        svc.create(&ctx, create_request(9)).await.unwrap();
        svc.create(
            &ctx,
            CreateReviewRequest {
                media_id: 8,
                user_id: 4,
                content: "meh".to_string(),
                rating: 4,
            },
        )
        .await
        .unwrap();

        assert_eq!(svc.list(&ctx).await.unwrap().len(), 2);
        assert_eq!(svc.list_by_author(&ctx, 4).await.unwrap()[0].content, "meh");
        assert_eq!(svc.list_by_media_subject(&ctx, 7).await.unwrap()[0].rating, 9);
    }

    #[rstest]
    #[case(0)]
    #[case(11)]
    #[tokio::test]
    async fn list_by_rating_rejects_out_of_range_without_storage(#[case] rating: i32) {
        let err = service(MockReviewStore::new())
            .list_by_rating(&RequestContext::new(), rating)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn list_maps_storage_failure_to_internal() {
        let mut store = MockReviewStore::new();
        store
            .expect_get_all()
            .times(1)
            .returning(|| Err(StoreError::database("relation \"review\" does not exist")));

        let err = service(store)
            .list(&RequestContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits_every_operation() {
        // No expectations: any storage call panics the mock.
        let svc = service(MockReviewStore::new());
        let ctx = cancelled();

        let results = [
            svc.create(&ctx, create_request(9)).await.map(|_| ()),
            svc.get_by_id(&ctx, 1).await.map(|_| ()),
            svc.update(&ctx, 1, UpdateReviewRequest::default())
                .await
                .map(|_| ()),
            svc.delete(&ctx, 1).await.map(|_| ()),
            svc.list(&ctx).await.map(|_| ()),
            svc.list_by_rating(&ctx, 5).await.map(|_| ()),
            svc.list_by_author(&ctx, 3).await.map(|_| ()),
            svc.list_by_media_subject(&ctx, 7).await.map(|_| ()),
        ];

        for result in results {
            assert_eq!(result.unwrap_err().code(), ErrorCode::Canceled);
        }
    }

    #[tokio::test]
    async fn cancellation_wins_over_validation() {
        let err = service(MockReviewStore::new())
            .create(&cancelled(), create_request(42))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Canceled);
        assert_eq!(err.to_string(), "context canceled");
    }

    #[tokio::test]
    async fn expired_deadline_counts_as_cancelled() {
        let ctx = RequestContext::with_timeout(std::time::Duration::ZERO);
        let err = service(MockReviewStore::new())
            .get_by_id(&ctx, 1)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Canceled);
        assert_eq!(err.to_string(), "context deadline exceeded");
    }
}
