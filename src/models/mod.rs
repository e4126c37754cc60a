// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Auctioneer, Bid, Bidder, BoundingBox, Coordinate, FilterSpec, JobPost, Paginated};
pub use requests::{Claims, NearbyQuery, PaginationQuery};
pub use responses::{ErrorResponse, HealthResponse};
