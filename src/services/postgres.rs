use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::DatabaseSettings;
use crate::core::filters::ScanPlan;
use crate::models::{Auctioneer, Bid, Bidder, Coordinate, JobPost};
use crate::services::store::{CorpusReader, RoleResolver, StorageError};

const SELECT_JOB_POSTS: &str = r#"
    SELECT
        jp.id,
        jp.auctioneer_id,
        a.user_id AS auctioneer_user_id,
        jp.title,
        jp.latitude,
        jp.longitude,
        jp.boat_length,
        jp.additional_services,
        jp.bid_start_date,
        jp.bid_end_date
    FROM job_posts jp
    JOIN auctioneers a ON a.id = jp.auctioneer_id
"#;

const LISTING_ORDER: &str = " ORDER BY jp.bid_end_date DESC, jp.id ASC";

#[derive(Debug, sqlx::FromRow)]
struct JobPostRow {
    id: i64,
    auctioneer_id: i64,
    auctioneer_user_id: i64,
    title: String,
    latitude: f64,
    longitude: f64,
    boat_length: f64,
    additional_services: Vec<String>,
    bid_start_date: DateTime<Utc>,
    bid_end_date: DateTime<Utc>,
}

impl From<JobPostRow> for JobPost {
    fn from(row: JobPostRow) -> Self {
        JobPost {
            id: row.id,
            auctioneer_id: row.auctioneer_id,
            auctioneer: Some(Auctioneer {
                id: row.auctioneer_id,
                user_id: row.auctioneer_user_id,
            }),
            title: row.title,
            location: Coordinate::new(row.latitude, row.longitude),
            boat_length: row.boat_length,
            additional_services: row.additional_services.into_iter().collect(),
            bid_start_date: row.bid_start_date,
            bid_end_date: row.bid_end_date,
            bids: Vec::new(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BidRow {
    id: i64,
    job_post_id: i64,
    bidder_id: i64,
    amount: f64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct BidderRow {
    id: i64,
    user_id: i64,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<BidderRow> for Bidder {
    fn from(row: BidderRow) -> Self {
        // A half-set location is treated as unset
        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        };
        Bidder {
            id: row.id,
            user_id: row.user_id,
            location,
        }
    }
}

/// PostgreSQL-backed job-post corpus and role lookup
///
/// Read-only apart from the optional schema migration at startup. Search scans
/// push the bounding box, boat-length bounds and service containment into SQL;
/// the exact great-circle check still happens in the index.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the database section of the settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StorageError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {} connections)",
            settings.max_connections.unwrap_or(10)
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections.unwrap_or(10))
            .min_connections(settings.min_connections.unwrap_or(1))
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)))
            .idle_timeout(Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)))
            .test_before_acquire(true)
            .connect(&settings.url)
            .await?;

        if settings.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");
        }

        Ok(Self { pool })
    }
}

/// Ordered window of the corpus
fn page_query(offset: u64, limit: u64) -> QueryBuilder<'static, Postgres> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_JOB_POSTS);
    query
        .push(LISTING_ORDER)
        .push(" LIMIT ")
        .push_bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .push(" OFFSET ")
        .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));
    query
}

fn owner_query(auctioneer_id: i64) -> QueryBuilder<'static, Postgres> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_JOB_POSTS);
    query
        .push(" WHERE jp.auctioneer_id = ")
        .push_bind(auctioneer_id)
        .push(LISTING_ORDER);
    query
}

/// Candidate query for a scan plan
///
/// Every bound is inclusive, matching `ScanPlan::admits`, so the rows returned
/// are a superset of what the exact predicate accepts.
fn scan_query(plan: &ScanPlan) -> QueryBuilder<'static, Postgres> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_JOB_POSTS);
    query.push(" WHERE TRUE");

    if let Some(bbox) = plan.bounding_box {
        query
            .push(" AND jp.latitude BETWEEN ")
            .push_bind(bbox.min_lat())
            .push(" AND ")
            .push_bind(bbox.max_lat())
            .push(" AND jp.longitude BETWEEN ")
            .push_bind(bbox.min_lon())
            .push(" AND ")
            .push_bind(bbox.max_lon());
    }
    if let Some(from) = plan.boat_length_from {
        query.push(" AND jp.boat_length >= ").push_bind(from);
    }
    if let Some(to) = plan.boat_length_to {
        query.push(" AND jp.boat_length <= ").push_bind(to);
    }
    if !plan.services.is_empty() {
        let services: Vec<String> = plan.services.iter().cloned().collect();
        query.push(" AND jp.additional_services @> ").push_bind(services);
    }
    query.push(LISTING_ORDER);
    query
}

#[async_trait]
impl CorpusReader for PostgresStore {
    async fn count(&self) -> Result<u64, StorageError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<JobPost>, StorageError> {
        let mut query = page_query(offset, limit);
        let rows: Vec<JobPostRow> = query
            .build_query_as::<JobPostRow>()
            .fetch_all(&self.pool)
            .await?;
        self.load_bids(rows.into_iter().map(JobPost::from).collect()).await
    }

    async fn fetch_by_owner(&self, auctioneer_id: i64) -> Result<Vec<JobPost>, StorageError> {
        let mut query = owner_query(auctioneer_id);
        let rows: Vec<JobPostRow> = query
            .build_query_as::<JobPostRow>()
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!("Auctioneer {} owns {} job posts", auctioneer_id, rows.len());
        self.load_bids(rows.into_iter().map(JobPost::from).collect()).await
    }

    /// Candidates come back without bids; the index loads them for the
    /// posts that survive the exact check.
    async fn scan(&self, plan: &ScanPlan) -> Result<Vec<JobPost>, StorageError> {
        let mut query = scan_query(plan);
        let rows: Vec<JobPostRow> = query
            .build_query_as::<JobPostRow>()
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!("Scan returned {} candidate rows", rows.len());
        Ok(rows.into_iter().map(JobPost::from).collect())
    }

    async fn load_bids(&self, mut posts: Vec<JobPost>) -> Result<Vec<JobPost>, StorageError> {
        if posts.is_empty() {
            return Ok(posts);
        }

        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let bid_rows: Vec<BidRow> = sqlx::query_as(
            r#"
            SELECT id, job_post_id, bidder_id, amount, created_at
            FROM bids
            WHERE job_post_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_post: HashMap<i64, Vec<Bid>> = HashMap::new();
        for row in bid_rows {
            by_post.entry(row.job_post_id).or_default().push(Bid {
                id: row.id,
                job_post_id: row.job_post_id,
                bidder_id: row.bidder_id,
                amount: row.amount,
                created_at: row.created_at,
            });
        }

        for post in &mut posts {
            if let Some(bids) = by_post.remove(&post.id) {
                post.bids = bids;
            }
        }

        Ok(posts)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RoleResolver for PostgresStore {
    async fn bidder_for(&self, user_id: i64) -> Result<Option<Bidder>, StorageError> {
        let row: Option<BidderRow> = sqlx::query_as(
            "SELECT id, user_id, latitude, longitude FROM bidders WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Bidder::from))
    }

    async fn auctioneer_for(&self, user_id: i64) -> Result<Option<Auctioneer>, StorageError> {
        let row: Option<(i64, i64)> =
            sqlx::query_as("SELECT id, user_id FROM auctioneers WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id, user_id)| Auctioneer { id, user_id }))
    }
}
