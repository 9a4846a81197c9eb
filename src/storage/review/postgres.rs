//! Persistent review store implementation using PostgreSQL.

use super::{ReviewStore, StoreError};
use crate::domain::{NewReview, Review};
use crate::infra::config::DatabaseConfig;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::debug;

/// A review store backed by the `review` table through a shared connection pool.
#[derive(Clone)]
pub struct PostgresReviewStore {
    pool: PgPool,
}

impl PostgresReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the process-wide pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let options = config.connect_options()?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Whether the `review` table is present in the current schema.
    pub async fn table_exists(&self) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = 'review'
            )",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn fetch_where(&self, sql: &str, value: i64) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query(sql).bind(value).fetch_all(&self.pool).await?;
        reviews_from_rows(&rows)
    }
}

fn reviews_from_rows(rows: &[PgRow]) -> Result<Vec<Review>, StoreError> {
    let reviews = rows
        .iter()
        .map(review_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = reviews.len(), "review rows fetched");
    Ok(reviews)
}

fn review_from_row(row: &PgRow) -> Result<Review, sqlx::Error> {
    Ok(Review {
        id: row.try_get("id")?,
        media_id: row.try_get("media_id")?,
        user_id: row.try_get("user_id")?,
        content: row.try_get("content")?,
        rating: row.try_get("rating")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ReviewStore for PostgresReviewStore {
    async fn create(&self, review: &NewReview) -> Result<Review, StoreError> {
        let row = sqlx::query(
            "INSERT INTO review (media_id, user_id, content, rating) VALUES ($1, $2, $3, $4)
             RETURNING id, media_id, user_id, content, rating, created_at, updated_at",
        )
        .bind(review.media_id)
        .bind(review.user_id)
        .bind(&review.content)
        .bind(review.rating.get())
        .fetch_one(&self.pool)
        .await?;
        Ok(review_from_row(&row)?)
    }

    async fn get_by_id(&self, id: i64) -> Result<Review, StoreError> {
        let row = sqlx::query(
            "SELECT id, media_id, user_id, content, rating, created_at, updated_at
             FROM review WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(review_from_row(&row)?),
            None => Err(StoreError::NotFound { id }),
        }
    }

    async fn update(&self, review: &Review) -> Result<Review, StoreError> {
        let row = sqlx::query(
            "UPDATE review
             SET media_id = $2, user_id = $3, content = $4, rating = $5, updated_at = now()
             WHERE id = $1
             RETURNING id, media_id, user_id, content, rating, created_at, updated_at",
        )
        .bind(review.id)
        .bind(review.media_id)
        .bind(review.user_id)
        .bind(&review.content)
        .bind(review.rating)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(review_from_row(&row)?),
            None => Err(StoreError::NotFound { id: review.id }),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM review WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, media_id, user_id, content, rating, created_at, updated_at
             FROM review ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        reviews_from_rows(&rows)
    }

    async fn get_by_rating(&self, rating: i32) -> Result<Vec<Review>, StoreError> {
        // `rating` is INTEGER, so bind the i32 rather than going through fetch_where.
        let rows = sqlx::query(
            "SELECT id, media_id, user_id, content, rating, created_at, updated_at
             FROM review WHERE rating = $1 ORDER BY id",
        )
        .bind(rating)
        .fetch_all(&self.pool)
        .await?;
        reviews_from_rows(&rows)
    }

    async fn get_by_user(&self, user_id: i64) -> Result<Vec<Review>, StoreError> {
        self.fetch_where(
            "SELECT id, media_id, user_id, content, rating, created_at, updated_at
             FROM review WHERE user_id = $1 ORDER BY id",
            user_id,
        )
        .await
    }

    async fn get_by_media(&self, media_id: i64) -> Result<Vec<Review>, StoreError> {
        self.fetch_where(
            "SELECT id, media_id, user_id, content, rating, created_at, updated_at
             FROM review WHERE media_id = $1 ORDER BY id",
            media_id,
        )
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
