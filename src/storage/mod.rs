pub mod review;

pub use review::{InMemoryReviewStore, PostgresReviewStore, ReviewStore, StoreError};
