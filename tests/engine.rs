//! Integration tests for the ride matcher engine.

use ridematch::{
    polyline, GeoPoint, MatchConfig, RideMatchError, RideMatcher, RideOffer, RideRequest,
    RouteIndex,
};

fn equator_route(lat_offset: f64) -> Vec<GeoPoint> {
    (0..=10)
        .map(|i| GeoPoint::new(lat_offset, i as f64 * 0.01))
        .collect()
}

fn london_route() -> Vec<GeoPoint> {
    (0..10)
        .map(|i| GeoPoint::new(51.5074 + i as f64 * 0.001, -0.1278))
        .collect()
}

fn offer(id: &str, route: &[GeoPoint]) -> RideOffer {
    RideOffer {
        ride_id: id.to_string(),
        polyline: polyline::encode(route),
    }
}

fn sample_offers() -> Vec<RideOffer> {
    vec![
        offer("london", &london_route()),
        // ~500m north of the request
        offer("far", &equator_route(0.0045)),
        offer("near", &equator_route(0.0)),
    ]
}

fn sample_request() -> RideRequest {
    RideRequest::direct(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.08))
}

#[test]
fn test_match_polyline() {
    let matcher = RideMatcher::new();
    let encoded = polyline::encode(&equator_route(0.0));

    let result = matcher
        .match_polyline(
            &encoded,
            &GeoPoint::new(0.0, 0.0),
            &GeoPoint::new(0.0, 0.08),
            8.9,
        )
        .unwrap();

    assert_eq!(result.pickup_index, 0);
    assert_eq!(result.dropoff_index, 8);
    assert!(!result.is_partial_ride);
}

#[test]
fn test_match_polyline_bad_input_is_no_match() {
    let matcher = RideMatcher::new();
    let pickup = GeoPoint::new(0.0, 0.0);
    let dropoff = GeoPoint::new(0.0, 0.08);

    assert!(matcher.match_polyline("", &pickup, &dropoff, 8.9).is_none());
    assert!(matcher.match_polyline("!!!!", &pickup, &dropoff, 8.9).is_none());
    assert!(matcher
        .match_polyline(
            &polyline::encode(&equator_route(0.0)),
            &GeoPoint::new(f64::NAN, 0.0),
            &dropoff,
            8.9
        )
        .is_none());
    assert!(matcher
        .match_polyline(
            &polyline::encode(&equator_route(0.0)),
            &pickup,
            &pickup,
            8.9
        )
        .is_none());
}

#[test]
fn test_match_polyline_truncated_route_still_matches_prefix() {
    let matcher = RideMatcher::new();
    let encoded = polyline::encode(&equator_route(0.0));
    let truncated = &encoded[..encoded.len() - 1];

    let result = matcher
        .match_polyline(
            truncated,
            &GeoPoint::new(0.0, 0.0),
            &GeoPoint::new(0.0, 0.05),
            5.6,
        )
        .unwrap();
    assert_eq!(result.total_route_points, 10);
    assert_eq!(result.dropoff_index, 5);
}

#[test]
fn test_evaluate_decodes_once_and_extracts_segment() {
    let matcher = RideMatcher::new();
    let request = sample_request();

    let found = matcher
        .evaluate(&request, &offer("near", &equator_route(0.0)))
        .unwrap();

    assert_eq!(found.ride_id, "near");
    assert_eq!(found.segment.points.len(), 9);
    assert_eq!(found.segment.points[0], request.pickup);
    assert_eq!(found.segment.actual_dropoff, request.dropoff);
    assert!(!found.segment.is_partial_ride);
}

#[test]
fn test_evaluate_never_leaks_route_past_dropoff() {
    let matcher = RideMatcher::new();
    let route = equator_route(0.0);
    let request = RideRequest::direct(route[2], route[5]);

    let found = matcher.evaluate(&request, &offer("near", &route)).unwrap();
    assert_eq!(found.segment.points, route[2..=5].to_vec());
    assert!(!found.segment.points.contains(&route[10]));
}

#[test]
fn test_segment_for_failures_are_no_route_match() {
    let matcher = RideMatcher::new();
    let encoded = polyline::encode(&equator_route(0.0));
    let pickup = GeoPoint::new(0.0, 0.0);
    let dropoff = GeoPoint::new(0.0, 0.08);
    let result = matcher
        .match_polyline(&encoded, &pickup, &dropoff, 8.9)
        .unwrap();

    assert_eq!(
        matcher.segment_for(None, &pickup, &dropoff, Some(&result)),
        Err(RideMatchError::NoRouteMatch)
    );
    assert_eq!(
        matcher.segment_for(Some(&encoded), &pickup, &dropoff, None),
        Err(RideMatchError::NoRouteMatch)
    );
    assert_eq!(
        matcher.segment_for(Some(""), &pickup, &dropoff, Some(&result)),
        Err(RideMatchError::NoRouteMatch)
    );

    let segment = matcher
        .segment_for(Some(&encoded), &pickup, &dropoff, Some(&result))
        .unwrap();
    assert_eq!(segment.points.len(), 9);
}

#[test]
fn test_find_rides_orders_by_pickup_distance() {
    let matcher = RideMatcher::new();
    let matches = matcher.find_rides(&sample_request(), &sample_offers());

    let ids: Vec<&str> = matches.iter().map(|m| m.ride_id.as_str()).collect();
    assert_eq!(ids, vec!["near", "far"]);
    assert!(matches[0].result.pickup_distance < matches[1].result.pickup_distance);
}

#[test]
fn test_find_rides_direct_before_partial_on_tie() {
    let matcher = RideMatcher::new();
    let route = equator_route(0.0);
    let request = RideRequest::direct(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.02, 0.10));
    let offers = vec![
        // Ends at the terminus: partial ride
        offer("a-short", &route),
        // Continues to the dropoff: direct ride
        offer(
            "b-long",
            &[route.clone(), vec![GeoPoint::new(0.01, 0.10), GeoPoint::new(0.02, 0.10)]].concat(),
        ),
    ];

    let matches = matcher.find_rides(&request, &offers);
    let ids: Vec<&str> = matches.iter().map(|m| m.ride_id.as_str()).collect();
    assert_eq!(ids, vec!["b-long", "a-short"]);
    assert!(!matches[0].result.is_partial_ride);
    assert!(matches[1].result.is_partial_ride);
}

#[test]
fn test_find_rides_with_threshold_override() {
    let matcher = RideMatcher::with_config(MatchConfig {
        threshold_override_meters: Some(100.0),
        ..MatchConfig::default()
    });
    let matches = matcher.find_rides(&sample_request(), &sample_offers());

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].ride_id, "near");
}

#[test]
fn test_find_rides_degenerate_request() {
    let matcher = RideMatcher::new();
    let point = GeoPoint::new(0.0, 0.05);
    let request = RideRequest::direct(point, point);
    assert!(matcher.find_rides(&request, &sample_offers()).is_empty());
}

#[test]
fn test_find_rides_indexed_matches_full_scan() {
    let matcher = RideMatcher::new();
    let offers = sample_offers();
    let index = RouteIndex::from_offers(&offers);
    let request = sample_request();

    let full = matcher.find_rides(&request, &offers);
    let indexed = matcher.find_rides_indexed(&request, &offers, &index);
    assert_eq!(full, indexed);
}

/// Eleven points eastward from just past the date line.
fn date_line_route() -> Vec<GeoPoint> {
    (0..=10)
        .map(|i| GeoPoint::new(0.0, -179.999 + i as f64 * 0.01))
        .collect()
}

#[test]
fn test_find_rides_indexed_across_date_line() {
    let matcher = RideMatcher::new();
    let offers = vec![
        offer("date_line", &date_line_route()),
        offer("near", &equator_route(0.0)),
    ];
    let index = RouteIndex::from_offers(&offers);
    // ~220m west of route[0], on the other side of 180
    let request = RideRequest::direct(
        GeoPoint::new(0.0, 179.999),
        GeoPoint::new(0.0, -179.93),
    );

    let full = matcher.find_rides(&request, &offers);
    assert_eq!(full.len(), 1);
    assert_eq!(full[0].ride_id, "date_line");
    assert_eq!(full[0].result.pickup_index, 0);

    let indexed = matcher.find_rides_indexed(&request, &offers, &index);
    assert_eq!(full, indexed);
}

#[test]
fn test_request_direct_trip_distance() {
    let request = sample_request();
    assert!((request.trip_distance_km - 8.9).abs() < 0.01);
}

#[test]
fn test_ride_match_serializes() {
    let matcher = RideMatcher::new();
    let found = matcher
        .evaluate(&sample_request(), &offer("near", &equator_route(0.0)))
        .unwrap();

    let json = serde_json::to_value(&found).unwrap();
    assert_eq!(json["ride_id"], "near");
    assert_eq!(json["result"]["is_partial_ride"], false);
    assert!(json["segment"]["points"].is_array());
    assert!(json["segment"]["duration_minutes"].is_u64());
}
