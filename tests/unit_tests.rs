// Unit tests for Harbor Match

use chrono::Utc;
use harbor_match::core::{parse_services, Clause, FilterCompiler, GeoMath, NormalizedFilter};
use harbor_match::models::{Coordinate, FilterSpec, JobPost};
use harbor_match::services::{CorpusReader, MemoryStore};

fn grid() -> Vec<Coordinate> {
    let mut points = Vec::new();
    for lat in [-90.0, -45.5, -0.001, 0.0, 12.25, 40.0, 66.6, 89.999, 90.0] {
        for lon in [-180.0, -73.0, -0.5, 0.0, 0.5, 73.0, 179.999, 180.0] {
            points.push(Coordinate::new(lat, lon));
        }
    }
    points
}

#[test]
fn test_distance_symmetry_over_grid() {
    let geo = GeoMath::default();
    let points = grid();

    for a in &points {
        for b in &points {
            assert_eq!(geo.distance_km(*a, *b).unwrap(), geo.distance_km(*b, *a).unwrap());
        }
    }
}

#[test]
fn test_self_distance_zero_over_grid() {
    let geo = GeoMath::default();
    for point in grid() {
        assert_eq!(geo.distance_km(point, point).unwrap(), 0.0);
    }
}

#[test]
fn test_distance_bounded_by_half_circumference() {
    let geo = GeoMath::default();
    let max = std::f64::consts::PI * geo.earth_radius_km();
    let points = grid();

    for a in &points {
        for b in &points {
            let d = geo.distance_km(*a, *b).unwrap();
            assert!(d >= 0.0 && d <= max + 1e-9, "{:?} -> {:?} = {}", a, b, d);
        }
    }
}

#[test]
fn test_antipodes() {
    let geo = GeoMath::default();
    let d = geo
        .distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0))
        .unwrap();
    assert!((d - std::f64::consts::PI * 6371.0).abs() < 1e-6);
}

#[test]
fn test_distance_manhattan_to_brooklyn() {
    // Manhattan to Brooklyn is approximately 5-15 km
    let geo = GeoMath::default();
    let d = geo
        .distance_km(Coordinate::new(40.7580, -73.9855), Coordinate::new(40.6782, -73.9442))
        .unwrap();
    assert!(d > 5.0 && d < 15.0);
}

#[test]
fn test_services_parsing_dedupes_and_trims() {
    let tags = parse_services("Wash,wash , wash,, fuel");
    let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
    // Tags are case-sensitive
    assert_eq!(tags, vec!["Wash", "fuel", "wash"]);
}

#[test]
fn test_compile_clause_composition() {
    let spec = FilterSpec {
        radius: None,
        boat_length_from: Some(10.0),
        boat_length_to: None,
        additional_services: Some("wash".to_string()),
    };
    let filter = NormalizedFilter::from_spec(&spec, 7.0);
    let predicate = FilterCompiler::default()
        .compile(Coordinate::new(40.0, -73.0), &filter)
        .unwrap();

    let clauses = predicate.clauses();
    assert_eq!(clauses.len(), 3);
    assert!(matches!(clauses[0], Clause::WithinRadius { radius_km, .. } if radius_km == 7.0));
    assert!(matches!(clauses[1], Clause::BoatLengthAtLeast(from) if from == 10.0));
    assert!(matches!(&clauses[2], Clause::ServicesSuperset(s) if s.len() == 1));
}

#[test]
fn test_memory_scan_with_plan() {
    let post = |id: i64, lat: f64| JobPost {
        id,
        auctioneer_id: 1,
        auctioneer: None,
        title: "Detailing".to_string(),
        location: Coordinate::new(lat, -73.0),
        boat_length: 28.0,
        additional_services: Default::default(),
        bid_start_date: Utc::now(),
        bid_end_date: Utc::now(),
        bids: vec![],
    };
    let store = MemoryStore::new(vec![post(1, 40.01), post(2, 41.5)], vec![], vec![]);

    let predicate = FilterCompiler::default()
        .compile(
            Coordinate::new(40.0, -73.0),
            &NormalizedFilter::from_spec(&FilterSpec::with_radius(10.0), 7.0),
        )
        .unwrap();

    let candidates = tokio_test::block_on(store.scan(&predicate.scan_plan())).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, 1);
}
