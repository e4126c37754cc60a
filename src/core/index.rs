use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::filters::JobPostPredicate;
use crate::error::{DiscoveryError, Result};
use crate::models::{JobPost, Paginated};
use crate::services::{CorpusReader, StorageError};

/// Listing order: latest `bid_end_date` first, then lowest id
pub fn listing_order(a: &JobPost, b: &JobPost) -> Ordering {
    b.bid_end_date
        .cmp(&a.bid_end_date)
        .then_with(|| a.id.cmp(&b.id))
}

/// Validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self> {
        if page == 0 {
            return Err(DiscoveryError::InvalidFilter("page must be a positive integer".into()));
        }
        if limit == 0 {
            return Err(DiscoveryError::InvalidFilter("limit must be a positive integer".into()));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// Query layer over the job-post corpus
///
/// Applies ordering, pagination and compiled predicates. Access control is the
/// caller's job. Every storage call is bounded by `timeout`.
#[derive(Clone)]
pub struct JobPostIndex {
    corpus: Arc<dyn CorpusReader>,
    timeout: Duration,
}

impl JobPostIndex {
    pub fn new(corpus: Arc<dyn CorpusReader>, timeout: Duration) -> Self {
        Self { corpus, timeout }
    }

    pub fn backend(&self) -> &'static str {
        self.corpus.name()
    }

    /// Run one storage call under the configured timeout
    pub(crate) async fn bounded<T, F>(&self, call: F) -> std::result::Result<T, StorageError>
    where
        F: Future<Output = std::result::Result<T, StorageError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StorageError::Timeout(self.timeout))?
    }

    /// Unfiltered, paginated listing
    ///
    /// A page past the end yields empty `data` with the real `total`.
    pub async fn list_all(&self, request: PageRequest) -> Result<Paginated<JobPost>> {
        // Count and page are separate reads; a concurrent write between them can
        // leave `total` one step off from `data`.
        let total = self.bounded(self.corpus.count()).await?;
        let limit = request.limit() as u64;
        let offset = request.offset();

        let mut data = if offset >= total {
            Vec::new()
        } else {
            self.bounded(self.corpus.fetch_page(offset, limit)).await?
        };
        data.truncate(request.limit() as usize);

        tracing::debug!(
            "Listed page {} ({} of {} job posts)",
            request.page(),
            data.len(),
            total
        );

        Ok(Paginated {
            data,
            total,
            page: request.page(),
            total_pages: total.div_ceil(limit),
        })
    }

    /// Every job post owned by the auctioneer, in listing order
    pub async fn list_by_owner(&self, auctioneer_id: i64) -> Result<Vec<JobPost>> {
        let mut posts = self.bounded(self.corpus.fetch_by_owner(auctioneer_id)).await?;
        posts.sort_by(listing_order);
        Ok(posts)
    }

    /// Every job post the predicate accepts, in listing order, unpaginated
    pub async fn search(&self, predicate: &JobPostPredicate) -> Result<Vec<JobPost>> {
        let plan = predicate.scan_plan();
        let candidates = self.bounded(self.corpus.scan(&plan)).await?;
        let scanned = candidates.len();

        let mut matches: Vec<JobPost> = candidates
            .into_iter()
            .filter(|post| predicate.matches(post))
            .collect();
        matches.sort_by(listing_order);

        tracing::debug!(
            "Search matched {} of {} candidates (bbox pushdown: {})",
            matches.len(),
            scanned,
            plan.bounding_box.is_some()
        );

        Ok(self.bounded(self.corpus.load_bids(matches)).await?)
    }

    pub async fn health_check(&self) -> std::result::Result<(), StorageError> {
        self.bounded(self.corpus.health_check()).await
    }
}
