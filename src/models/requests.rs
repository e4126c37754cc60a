use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::FilterSpec;

/// Query string for `GET /jobpost`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PaginationQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1))]
    pub limit: Option<u32>,
}

/// Query string for `GET /jobpost/nearby`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NearbyQuery {
    pub radius: Option<f64>,
    #[serde(rename = "boatLengthFrom")]
    pub boat_length_from: Option<f64>,
    #[serde(rename = "boatLengthTo")]
    pub boat_length_to: Option<f64>,
    #[serde(rename = "additionalServices")]
    #[validate(length(max = 1024))]
    pub additional_services: Option<String>,
}

impl From<NearbyQuery> for FilterSpec {
    fn from(value: NearbyQuery) -> Self {
        FilterSpec {
            radius: value.radius,
            boat_length_from: value.boat_length_from,
            boat_length_to: value.boat_length_to,
            additional_services: value.additional_services,
        }
    }
}

/// JWT claims carried by bearer tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric user id
    pub sub: i64,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}
