use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::core::filters::ScanPlan;
use crate::core::index::listing_order;
use crate::models::{Auctioneer, Bid, Bidder, JobPost};
use crate::services::store::{CorpusReader, RoleResolver, StorageError};

/// Seed document for the in-memory store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(rename = "jobPosts", default)]
    pub job_posts: Vec<JobPost>,
    #[serde(default)]
    pub auctioneers: Vec<Auctioneer>,
    #[serde(default)]
    pub bidders: Vec<Bidder>,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

/// Immutable in-process corpus
///
/// Posts are kept in listing order, so paging is a slice. Scans walk the whole
/// vector and apply the plan's cheap checks.
pub struct MemoryStore {
    posts: Vec<JobPost>,
    bidders_by_user: HashMap<i64, Bidder>,
    auctioneers_by_user: HashMap<i64, Auctioneer>,
}

impl MemoryStore {
    pub fn new(posts: Vec<JobPost>, auctioneers: Vec<Auctioneer>, bidders: Vec<Bidder>) -> Self {
        Self::from_seed(Seed {
            job_posts: posts,
            auctioneers,
            bidders,
            bids: Vec::new(),
        })
    }

    pub fn from_seed(seed: Seed) -> Self {
        let auctioneers_by_id: HashMap<i64, Auctioneer> = seed
            .auctioneers
            .iter()
            .map(|a| (a.id, a.clone()))
            .collect();

        let mut bids_by_post: HashMap<i64, Vec<Bid>> = HashMap::new();
        for bid in seed.bids {
            bids_by_post.entry(bid.job_post_id).or_default().push(bid);
        }

        let mut posts = seed.job_posts;
        for post in &mut posts {
            if post.auctioneer.is_none() {
                post.auctioneer = auctioneers_by_id.get(&post.auctioneer_id).cloned();
            }
            if let Some(bids) = bids_by_post.remove(&post.id) {
                post.bids.extend(bids);
            }
        }
        posts.sort_by(listing_order);

        Self {
            posts,
            bidders_by_user: seed.bidders.into_iter().map(|b| (b.user_id, b)).collect(),
            auctioneers_by_user: seed
                .auctioneers
                .into_iter()
                .map(|a| (a.user_id, a))
                .collect(),
        }
    }

    /// Load a JSON seed file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StorageError::Seed(format!("{}: {}", path.display(), e)))?;
        let seed: Seed = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Seed(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            "Loaded seed {} ({} job posts, {} bidders, {} auctioneers)",
            path.display(),
            seed.job_posts.len(),
            seed.bidders.len(),
            seed.auctioneers.len()
        );

        Ok(Self::from_seed(seed))
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[async_trait]
impl CorpusReader for MemoryStore {
    async fn count(&self) -> Result<u64, StorageError> {
        Ok(self.posts.len() as u64)
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<JobPost>, StorageError> {
        let len = self.posts.len() as u64;
        let start = offset.min(len) as usize;
        let end = offset.saturating_add(limit).min(len) as usize;
        Ok(self.posts[start..end].to_vec())
    }

    async fn fetch_by_owner(&self, auctioneer_id: i64) -> Result<Vec<JobPost>, StorageError> {
        Ok(self
            .posts
            .iter()
            .filter(|p| p.auctioneer_id == auctioneer_id)
            .cloned()
            .collect())
    }

    async fn scan(&self, plan: &ScanPlan) -> Result<Vec<JobPost>, StorageError> {
        Ok(self
            .posts
            .iter()
            .filter(|p| plan.admits(p))
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[async_trait]
impl RoleResolver for MemoryStore {
    async fn bidder_for(&self, user_id: i64) -> Result<Option<Bidder>, StorageError> {
        Ok(self.bidders_by_user.get(&user_id).cloned())
    }

    async fn auctioneer_for(&self, user_id: i64) -> Result<Option<Auctioneer>, StorageError> {
        Ok(self.auctioneers_by_user.get(&user_id).cloned())
    }
}
