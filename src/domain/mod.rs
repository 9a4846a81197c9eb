//! Review domain: the record, its validated inputs, the request context and outcome kinds.

pub mod context;
pub mod error;
pub mod review;

pub use context::RequestContext;
pub use error::{ErrorCode, ServiceError};
pub use review::{NewReview, Rating, Review, ReviewPatch, MAX_RATING, MIN_RATING};
