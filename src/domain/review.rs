//! The review record and the validated inputs that produce or change it.

use crate::domain::error::ServiceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

/// A stored review of a media item.
///
/// `rating` is the raw column value: rows that were never rated carry `0`,
/// which is not a valid [`Rating`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub media_id: i64,
    pub user_id: i64,
    pub content: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Applies the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: ReviewPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating.get();
        }
    }
}

/// A rating within `MIN_RATING..=MAX_RATING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rating(i32);

impl Rating {
    pub fn new(value: i32) -> Result<Self, ServiceError> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ServiceError::invalid_argument(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )))
        }
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

/// Validated input for a new review. Storage assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub media_id: i64,
    pub user_id: i64,
    pub content: String,
    pub rating: Rating,
}

/// Partial update: `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub content: Option<String>,
    pub rating: Option<Rating>,
}

impl ReviewPatch {
    /// Builds a patch from wire values where `""` and `0` mean "not supplied".
    pub fn from_wire(content: Option<String>, rating: Option<i32>) -> Result<Self, ServiceError> {
        let content = content.filter(|c| !c.is_empty());
        let rating = match rating {
            None | Some(0) => None,
            Some(value) => Some(Rating::new(value)?),
        };
        Ok(Self { content, rating })
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.content.is_none() && self.rating.is_none()
    }
}
