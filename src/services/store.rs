use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::core::filters::ScanPlan;
use crate::models::{Auctioneer, Bidder, JobPost};

/// Errors that can occur when reading the job-post corpus
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Seed error: {0}")]
    Seed(String),
}

/// Read access to the job-post corpus
///
/// Implementations return job posts with their owner and bids loaded, except
/// `scan`, which may leave bids for `load_bids`. Ordered methods use the
/// listing order: `bid_end_date` descending, then `id` ascending.
#[async_trait]
pub trait CorpusReader: Send + Sync {
    /// Total number of job posts
    async fn count(&self) -> Result<u64, StorageError>;

    /// One ordered window of the corpus
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<JobPost>, StorageError>;

    /// All job posts owned by an auctioneer
    async fn fetch_by_owner(&self, auctioneer_id: i64) -> Result<Vec<JobPost>, StorageError>;

    /// Candidate job posts for a search.
    ///
    /// Readers may use the plan to narrow the scan but must return a superset of
    /// every post the plan admits; the caller re-applies the exact predicate.
    async fn scan(&self, plan: &ScanPlan) -> Result<Vec<JobPost>, StorageError>;

    /// Attach bids to posts returned by `scan`
    async fn load_bids(&self, posts: Vec<JobPost>) -> Result<Vec<JobPost>, StorageError> {
        Ok(posts)
    }

    /// Backend name for logging and health output
    fn name(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StorageError>;
}

/// Lookup from a user account to its marketplace roles
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn bidder_for(&self, user_id: i64) -> Result<Option<Bidder>, StorageError>;

    async fn auctioneer_for(&self, user_id: i64) -> Result<Option<Auctioneer>, StorageError>;
}
