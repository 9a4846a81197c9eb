//! Storage port for review records.
//!
//! The handler depends only on [`ReviewStore`]; backends are picked at startup:
//! - [`PostgresReviewStore`] persists into the `review` table through sqlx.
//! - [`InMemoryReviewStore`] keeps rows in process memory (tests, local runs).

use crate::domain::{NewReview, Review};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryReviewStore;
pub use postgres::PostgresReviewStore;

/// Failures raised by storage adapters.
///
/// `NotFound` is the only kind the handler tells apart; everything else is
/// opaque and surfaces as an internal error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("review {id} not found")]
    NotFound { id: i64 },
    #[error("database error: {message}")]
    Database { message: String },
}

impl StoreError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::database(err.to_string())
    }
}

/// Contract every review backend implements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Inserts a row and returns it with the engine-assigned id and timestamps.
    async fn create(&self, review: &NewReview) -> Result<Review, StoreError>;

    /// Point lookup. Returns [`StoreError::NotFound`] when no row matches.
    async fn get_by_id(&self, id: i64) -> Result<Review, StoreError>;

    /// Full-row update keyed by `review.id`; the engine bumps `updated_at`.
    async fn update(&self, review: &Review) -> Result<Review, StoreError>;

    /// Hard delete by primary key.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    async fn get_all(&self) -> Result<Vec<Review>, StoreError>;

    async fn get_by_rating(&self, rating: i32) -> Result<Vec<Review>, StoreError>;

    async fn get_by_user(&self, user_id: i64) -> Result<Vec<Review>, StoreError>;

    async fn get_by_media(&self, media_id: i64) -> Result<Vec<Review>, StoreError>;

    /// Connectivity check used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
