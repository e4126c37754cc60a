// Core discovery exports
pub mod discovery;
pub mod distance;
pub mod filters;
pub mod index;

pub use discovery::{DiscoveryDefaults, DiscoveryService};
pub use distance::{validate_coordinate, GeoMath, EARTH_RADIUS_KM};
pub use filters::{
    parse_services, Clause, FilterCompiler, JobPostPredicate, NormalizedFilter, ScanPlan,
};
pub use index::{listing_order, JobPostIndex, PageRequest};
