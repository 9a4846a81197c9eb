//! Process-local review store.

use super::{ReviewStore, StoreError};
use crate::domain::{NewReview, Review};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Review>,
    last_id: i64,
}

/// Keeps review rows in memory with the same id and timestamp rules as the
/// `review` table: ids come from a monotonic counter and are never reused.
#[derive(Default)]
pub struct InMemoryReviewStore {
    table: RwLock<Table>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered<F>(&self, keep: F) -> Vec<Review>
    where
        F: Fn(&Review) -> bool,
    {
        let table = self.table.read().await;
        table.rows.values().filter(|r| keep(r)).cloned().collect()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn create(&self, review: &NewReview) -> Result<Review, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let now = Utc::now();
        let stored = Review {
            id: table.last_id,
            media_id: review.media_id,
            user_id: review.user_id,
            content: review.content.clone(),
            rating: review.rating.get(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> Result<Review, StoreError> {
        let table = self.table.read().await;
        table
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn update(&self, review: &Review) -> Result<Review, StoreError> {
        let mut table = self.table.write().await;
        let stored = table
            .rows
            .get_mut(&review.id)
            .ok_or(StoreError::NotFound { id: review.id })?;
        stored.media_id = review.media_id;
        stored.user_id = review.user_id;
        stored.content = review.content.clone();
        stored.rating = review.rating;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { id })
    }

    async fn get_all(&self) -> Result<Vec<Review>, StoreError> {
        Ok(self.filtered(|_| true).await)
    }

    async fn get_by_rating(&self, rating: i32) -> Result<Vec<Review>, StoreError> {
        Ok(self.filtered(|r| r.rating == rating).await)
    }

    async fn get_by_user(&self, user_id: i64) -> Result<Vec<Review>, StoreError> {
        Ok(self.filtered(|r| r.user_id == user_id).await)
    }

    async fn get_by_media(&self, media_id: i64) -> Result<Vec<Review>, StoreError> {
        Ok(self.filtered(|r| r.media_id == media_id).await)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
