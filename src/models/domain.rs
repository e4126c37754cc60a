use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Finite and within [-90, 90] / [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(value: Coordinate) -> Self {
        geo::Point::new(value.longitude, value.latitude)
    }
}

/// Account that owns job posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auctioneer {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// Account that searches for and bids on job posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bidder {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(default)]
    pub location: Option<Coordinate>,
}

/// Bid placed on a job post, loaded for display only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: i64,
    #[serde(rename = "jobPostId")]
    pub job_post_id: i64,
    #[serde(rename = "bidderId")]
    pub bidder_id: i64,
    pub amount: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A service request posted by an auctioneer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPost {
    pub id: i64,
    #[serde(rename = "auctioneerId")]
    pub auctioneer_id: i64,
    #[serde(default)]
    pub auctioneer: Option<Auctioneer>,
    pub title: String,
    pub location: Coordinate,
    #[serde(rename = "boatLength")]
    pub boat_length: f64,
    #[serde(rename = "additionalServices", default)]
    pub additional_services: BTreeSet<String>,
    pub bid_start_date: DateTime<Utc>,
    pub bid_end_date: DateTime<Utc>,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

/// Caller-supplied discovery filters, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Search radius in kilometers
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(rename = "boatLengthFrom", default)]
    pub boat_length_from: Option<f64>,
    #[serde(rename = "boatLengthTo", default)]
    pub boat_length_to: Option<f64>,
    /// Comma-delimited service tags
    #[serde(rename = "additionalServices", default)]
    pub additional_services: Option<String>,
}

impl FilterSpec {
    pub fn with_radius(radius: f64) -> Self {
        Self {
            radius: Some(radius),
            ..Self::default()
        }
    }
}

/// One page of an ordered listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

/// Geospatial bounding box, boundary-inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    rect: geo::Rect<f64>,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            rect: geo::Rect::new(
                geo::coord! { x: min_lon, y: min_lat },
                geo::coord! { x: max_lon, y: max_lat },
            ),
        }
    }

    pub fn min_lat(&self) -> f64 {
        self.rect.min().y
    }

    pub fn max_lat(&self) -> f64 {
        self.rect.max().y
    }

    pub fn min_lon(&self) -> f64 {
        self.rect.min().x
    }

    pub fn max_lon(&self) -> f64 {
        self.rect.max().x
    }

    #[inline]
    pub fn contains(&self, point: Coordinate) -> bool {
        use geo::Intersects;
        self.rect
            .intersects(&geo::coord! { x: point.longitude, y: point.latitude })
    }
}
