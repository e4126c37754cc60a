//! Harbor Match - geospatial job discovery for the boat services marketplace
//!
//! Finds open job posts within a radius of a bidder using great-circle distance,
//! narrowed by boat length and required services, and serves the owner and
//! public listings with a fixed ordering policy.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{DiscoveryDefaults, DiscoveryService, FilterCompiler, GeoMath, JobPostIndex};
pub use error::DiscoveryError;
pub use models::{Bidder, Coordinate, FilterSpec, JobPost, Paginated};
