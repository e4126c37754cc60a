use std::sync::Arc;

use crate::core::filters::{FilterCompiler, NormalizedFilter};
use crate::core::index::{JobPostIndex, PageRequest};
use crate::error::{DiscoveryError, Result};
use crate::models::{FilterSpec, JobPost, Paginated};
use crate::services::RoleResolver;

/// Defaults applied to caller input
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryDefaults {
    pub radius_km: f64,
    pub page: u32,
    pub limit: u32,
}

impl Default for DiscoveryDefaults {
    fn default() -> Self {
        Self {
            radius_km: 7.0,
            page: 1,
            limit: 10,
        }
    }
}

/// Entry point for the three job-post listings
///
/// # Operations
/// 1. Nearby search for bidders (role and location checked first)
/// 2. Owner listing for auctioneers
/// 3. Public paginated listing
#[derive(Clone)]
pub struct DiscoveryService {
    roles: Arc<dyn RoleResolver>,
    index: JobPostIndex,
    compiler: FilterCompiler,
    defaults: DiscoveryDefaults,
}

impl DiscoveryService {
    pub fn new(
        roles: Arc<dyn RoleResolver>,
        index: JobPostIndex,
        compiler: FilterCompiler,
        defaults: DiscoveryDefaults,
    ) -> Self {
        Self {
            roles,
            index,
            compiler,
            defaults,
        }
    }

    pub fn index(&self) -> &JobPostIndex {
        &self.index
    }

    /// Job posts within the filter radius of the calling bidder
    ///
    /// Fails with `NotAuthorized` when the user is not a bidder and with
    /// `MissingLocation` when the bidder has no coordinate on file. Results are
    /// unpaginated.
    pub async fn search_for_bidder(&self, user_id: i64, spec: &FilterSpec) -> Result<Vec<JobPost>> {
        let bidder = self
            .index
            .bounded(self.roles.bidder_for(user_id))
            .await?
            .ok_or_else(|| {
                DiscoveryError::NotAuthorized("only bidders can search nearby job posts".into())
            })?;

        let origin = bidder.location.ok_or(DiscoveryError::MissingLocation)?;

        let filter = NormalizedFilter::from_spec(spec, self.defaults.radius_km);
        let predicate = self.compiler.compile(origin, &filter)?;
        let matches = self.index.search(&predicate).await?;

        tracing::info!(
            "Found {} job posts within {} km for bidder {}",
            matches.len(),
            filter.radius_km,
            bidder.id
        );

        Ok(matches)
    }

    /// Job posts owned by the calling auctioneer
    pub async fn list_for_auctioneer(&self, user_id: i64) -> Result<Vec<JobPost>> {
        let auctioneer = self
            .index
            .bounded(self.roles.auctioneer_for(user_id))
            .await?
            .ok_or_else(|| {
                DiscoveryError::NotAuthorized("only auctioneers can list their job posts".into())
            })?;

        self.index.list_by_owner(auctioneer.id).await
    }

    /// Public paginated listing, no role check
    pub async fn list_all(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<JobPost>> {
        let request = PageRequest::new(
            page.unwrap_or(self.defaults.page),
            limit.unwrap_or(self.defaults.limit),
        )?;
        self.index.list_all(request).await
    }
}
