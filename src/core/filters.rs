use std::collections::BTreeSet;

use crate::core::distance::{validate_coordinate, GeoMath};
use crate::error::{DiscoveryError, Result};
use crate::models::{BoundingBox, Coordinate, FilterSpec, JobPost};

/// FilterSpec after defaults are applied and the services string is parsed
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFilter {
    pub radius_km: f64,
    pub boat_length_from: Option<f64>,
    pub boat_length_to: Option<f64>,
    pub services: BTreeSet<String>,
}

impl NormalizedFilter {
    /// Fill in the default radius and split the comma-delimited services
    ///
    /// Performs no validation; a non-positive radius is rejected at compile time.
    pub fn from_spec(spec: &FilterSpec, default_radius_km: f64) -> Self {
        Self {
            radius_km: spec.radius.unwrap_or(default_radius_km),
            boat_length_from: spec.boat_length_from,
            boat_length_to: spec.boat_length_to,
            services: spec
                .additional_services
                .as_deref()
                .map(parse_services)
                .unwrap_or_default(),
        }
    }
}

/// Split a comma-delimited tag list into a set of trimmed, non-empty tags
pub fn parse_services(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// One conjunct of a compiled predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    WithinRadius { origin: Coordinate, radius_km: f64 },
    BoatLengthAtLeast(f64),
    BoatLengthAtMost(f64),
    ServicesSuperset(BTreeSet<String>),
}

impl Clause {
    #[inline]
    fn matches(&self, geo: &GeoMath, post: &JobPost) -> bool {
        match self {
            Clause::WithinRadius { origin, radius_km } => {
                match geo.distance_km(*origin, post.location) {
                    Ok(distance) => distance <= *radius_km,
                    Err(e) => {
                        tracing::warn!("Skipping job post {}: {}", post.id, e);
                        false
                    }
                }
            }
            Clause::BoatLengthAtLeast(from) => post.boat_length >= *from,
            Clause::BoatLengthAtMost(to) => post.boat_length <= *to,
            Clause::ServicesSuperset(required) => required
                .iter()
                .all(|service| post.additional_services.contains(service)),
        }
    }
}

/// Conjunction of clauses over a job post
///
/// Built by [`FilterCompiler::compile`]. The clause list doubles as a query
/// plan that storage backends can partially push down via [`ScanPlan`].
#[derive(Debug, Clone)]
pub struct JobPostPredicate {
    geo: GeoMath,
    clauses: Vec<Clause>,
}

impl JobPostPredicate {
    #[inline]
    pub fn matches(&self, post: &JobPost) -> bool {
        self.clauses.iter().all(|clause| clause.matches(&self.geo, post))
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Cheap candidate filter a storage backend may apply before the exact check
    pub fn scan_plan(&self) -> ScanPlan {
        let mut plan = ScanPlan::default();
        for clause in &self.clauses {
            match clause {
                Clause::WithinRadius { origin, radius_km } => {
                    plan.bounding_box = self.geo.bounding_box(*origin, *radius_km);
                }
                Clause::BoatLengthAtLeast(from) => plan.boat_length_from = Some(*from),
                Clause::BoatLengthAtMost(to) => plan.boat_length_to = Some(*to),
                Clause::ServicesSuperset(services) => plan.services = services.clone(),
            }
        }
        plan
    }
}

/// Pushdown-friendly subset of a predicate
///
/// Everything the exact predicate accepts, the plan admits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPlan {
    pub bounding_box: Option<BoundingBox>,
    pub boat_length_from: Option<f64>,
    pub boat_length_to: Option<f64>,
    pub services: BTreeSet<String>,
}

impl ScanPlan {
    #[inline]
    pub fn admits(&self, post: &JobPost) -> bool {
        if let Some(bbox) = &self.bounding_box {
            if !bbox.contains(post.location) {
                return false;
            }
        }
        if let Some(from) = self.boat_length_from {
            if post.boat_length < from {
                return false;
            }
        }
        if let Some(to) = self.boat_length_to {
            if post.boat_length > to {
                return false;
            }
        }
        self.services
            .iter()
            .all(|service| post.additional_services.contains(service))
    }
}

/// Turns a normalized filter into a job-post predicate
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterCompiler {
    geo: GeoMath,
}

impl FilterCompiler {
    pub fn new(geo: GeoMath) -> Self {
        Self { geo }
    }

    /// Compile a filter anchored at `origin`
    ///
    /// The spatial clause is always present; the boat-length and services
    /// clauses only when the filter sets them. Clauses combine with AND.
    pub fn compile(
        &self,
        origin: Coordinate,
        filter: &NormalizedFilter,
    ) -> Result<JobPostPredicate> {
        validate_coordinate(origin)?;

        if !filter.radius_km.is_finite() || filter.radius_km <= 0.0 {
            return Err(DiscoveryError::InvalidFilter(format!(
                "radius must be a positive number of kilometers, got {}",
                filter.radius_km
            )));
        }

        let mut clauses = vec![Clause::WithinRadius {
            origin,
            radius_km: filter.radius_km,
        }];

        if let Some(from) = filter.boat_length_from {
            if !from.is_finite() {
                return Err(DiscoveryError::InvalidFilter("boatLengthFrom must be a number".into()));
            }
            clauses.push(Clause::BoatLengthAtLeast(from));
        }

        if let Some(to) = filter.boat_length_to {
            if !to.is_finite() {
                return Err(DiscoveryError::InvalidFilter("boatLengthTo must be a number".into()));
            }
            clauses.push(Clause::BoatLengthAtMost(to));
        }

        if !filter.services.is_empty() {
            clauses.push(Clause::ServicesSuperset(filter.services.clone()));
        }

        Ok(JobPostPredicate {
            geo: self.geo,
            clauses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_post(lat: f64, lon: f64, boat_length: f64, services: &[&str]) -> JobPost {
        JobPost {
            id: 1,
            auctioneer_id: 1,
            auctioneer: None,
            title: "Hull cleaning".to_string(),
            location: Coordinate::new(lat, lon),
            boat_length,
            additional_services: services.iter().map(|s| s.to_string()).collect(),
            bid_start_date: Utc::now(),
            bid_end_date: Utc::now(),
            bids: vec![],
        }
    }

    fn filter(radius_km: f64) -> NormalizedFilter {
        NormalizedFilter {
            radius_km,
            boat_length_from: None,
            boat_length_to: None,
            services: BTreeSet::new(),
        }
    }

    fn origin() -> Coordinate {
        Coordinate::new(40.0, -73.0)
    }

    #[test]
    fn test_parse_services() {
        let parsed = parse_services(" wash, fuel ,,wash, ,  detailing ");
        let expected: BTreeSet<String> =
            ["detailing", "fuel", "wash"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parsed, expected);

        assert!(parse_services("").is_empty());
        assert!(parse_services(" , ,").is_empty());
    }

    #[test]
    fn test_normalize_applies_default_radius() {
        let normalized = NormalizedFilter::from_spec(&FilterSpec::default(), 7.0);
        assert_eq!(normalized.radius_km, 7.0);
        assert!(normalized.services.is_empty());

        let normalized = NormalizedFilter::from_spec(&FilterSpec::with_radius(25.0), 7.0);
        assert_eq!(normalized.radius_km, 25.0);
    }

    #[test]
    fn test_only_spatial_clause_by_default() {
        let predicate = FilterCompiler::default().compile(origin(), &filter(7.0)).unwrap();
        assert_eq!(predicate.clauses().len(), 1);
        assert!(matches!(predicate.clauses()[0], Clause::WithinRadius { .. }));
    }

    #[test]
    fn test_blank_services_skip_clause() {
        let spec = FilterSpec {
            additional_services: Some(" , ".to_string()),
            ..FilterSpec::default()
        };
        let normalized = NormalizedFilter::from_spec(&spec, 7.0);
        let predicate = FilterCompiler::default().compile(origin(), &normalized).unwrap();
        assert_eq!(predicate.clauses().len(), 1);
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = FilterCompiler::default().compile(origin(), &filter(radius));
            assert!(matches!(result, Err(DiscoveryError::InvalidFilter(_))), "radius {}", radius);
        }
    }

    #[test]
    fn test_rejects_invalid_origin() {
        let result = FilterCompiler::default().compile(Coordinate::new(120.0, 0.0), &filter(7.0));
        assert!(matches!(result, Err(DiscoveryError::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_spatial_clause() {
        let predicate = FilterCompiler::default().compile(origin(), &filter(10.0)).unwrap();

        assert!(predicate.matches(&create_test_post(40.01, -73.0, 30.0, &[])));
        assert!(!predicate.matches(&create_test_post(40.2, -73.0, 30.0, &[])));
        // Job posts with corrupt locations never match
        assert!(!predicate.matches(&create_test_post(f64::NAN, -73.0, 30.0, &[])));
    }

    #[test]
    fn test_boat_length_bounds_inclusive() {
        let mut normalized = filter(10.0);
        normalized.boat_length_from = Some(20.0);
        normalized.boat_length_to = Some(40.0);
        let predicate = FilterCompiler::default().compile(origin(), &normalized).unwrap();

        assert!(predicate.matches(&create_test_post(40.0, -73.0, 20.0, &[])));
        assert!(predicate.matches(&create_test_post(40.0, -73.0, 40.0, &[])));
        assert!(!predicate.matches(&create_test_post(40.0, -73.0, 19.9, &[])));
        assert!(!predicate.matches(&create_test_post(40.0, -73.0, 40.1, &[])));
    }

    #[test]
    fn test_inverted_bounds_match_nothing() {
        let mut normalized = filter(10.0);
        normalized.boat_length_from = Some(40.0);
        normalized.boat_length_to = Some(20.0);
        let predicate = FilterCompiler::default().compile(origin(), &normalized).unwrap();

        for length in [10.0, 20.0, 30.0, 40.0, 50.0] {
            assert!(!predicate.matches(&create_test_post(40.0, -73.0, length, &[])));
        }
    }

    #[test]
    fn test_services_subset() {
        let mut normalized = filter(10.0);
        normalized.services = parse_services("wash, fuel");
        let predicate = FilterCompiler::default().compile(origin(), &normalized).unwrap();

        assert!(predicate.matches(&create_test_post(40.0, -73.0, 30.0, &["fuel", "wash"])));
        assert!(predicate.matches(&create_test_post(40.0, -73.0, 30.0, &["fuel", "wash", "tow"])));
        assert!(!predicate.matches(&create_test_post(40.0, -73.0, 30.0, &["wash"])));
        assert!(!predicate.matches(&create_test_post(40.0, -73.0, 30.0, &[])));
    }

    #[test]
    fn test_scan_plan_admits_every_match() {
        let mut normalized = filter(25.0);
        normalized.boat_length_from = Some(10.0);
        normalized.services = parse_services("wash");
        let predicate = FilterCompiler::default().compile(origin(), &normalized).unwrap();
        let plan = predicate.scan_plan();

        assert!(plan.bounding_box.is_some());
        assert_eq!(plan.boat_length_from, Some(10.0));
        assert_eq!(plan.boat_length_to, None);

        for step in 0..200 {
            let lat = 39.7 + step as f64 * 0.003;
            let post = create_test_post(lat, -73.0 + step as f64 * 0.001, 12.0, &["wash"]);
            if predicate.matches(&post) {
                assert!(plan.admits(&post), "plan rejected a match at {}", lat);
            }
        }
    }
}
