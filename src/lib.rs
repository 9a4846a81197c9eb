pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{CreateReviewRequest, ReviewService, UpdateReviewRequest};
pub use domain::{ErrorCode, RequestContext, Review, ServiceError};
pub use infra::AppConfig;
pub use storage::{InMemoryReviewStore, PostgresReviewStore, ReviewStore, StoreError};
