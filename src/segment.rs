//! Route segment extraction for passenger display.
//!
//! A passenger only ever sees the slice of the driver's route between their
//! pickup and their (actual) dropoff, never the driver's full route or final
//! destination. The slice is widened with the exact pickup and dropoff
//! coordinates when the nearest route vertices are too far from them, so the
//! rendered path starts and ends where the passenger does.
//!
//! Duration is a flat-speed estimate, not a routing-provider figure.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo_utils::{closest_point, closest_point_from, haversine_distance, path_length};
use crate::{polyline, GeoPoint, MatchConfig, MatchResult};

/// The part of a driver route a matched passenger travels on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    /// Points from pickup to actual dropoff
    pub points: Vec<GeoPoint>,
    /// Summed length of `points` in meters
    pub distance_meters: f64,
    /// Estimated travel time in whole minutes
    pub duration_minutes: u32,
    /// Whether the passenger is dropped before their requested destination
    pub is_partial_ride: bool,
    /// Where the passenger actually leaves the car
    pub actual_dropoff: GeoPoint,
}

impl RouteSegment {
    /// The segment as an encoded polyline, for API responses.
    pub fn encoded(&self) -> String {
        polyline::encode(&self.points)
    }
}

/// Extract the pickup to dropoff slice of `route` for a confirmed match.
///
/// `result` must be the match produced for this same route and request. For a
/// partial ride its `best_drop_point_index` is reused as the slice end, so the
/// segment ends exactly where the match computed the fare basis. For a direct
/// match the dropoff index is searched again after the pickup.
///
/// Fails with [`RideMatchError::EmptyRoute`](crate::RideMatchError::EmptyRoute)
/// when `route` has no points.
pub fn extract_segment(
    route: &[GeoPoint],
    pickup: &GeoPoint,
    dropoff: &GeoPoint,
    result: &MatchResult,
    config: &MatchConfig,
) -> Result<RouteSegment> {
    let actual_dropoff = match (result.is_partial_ride, result.best_drop_point) {
        (true, Some(point)) => point,
        _ => *dropoff,
    };

    // The route may have been decoded again since matching, so search afresh
    let pickup_index = closest_point(route, pickup)?.index;

    let dropoff_index = if result.is_partial_ride {
        result.best_drop_point_index
    } else {
        closest_point_from(route, pickup_index, dropoff)?.index
    };
    let dropoff_index = dropoff_index.clamp(pickup_index, route.len() - 1);

    let mut points = route[pickup_index..=dropoff_index].to_vec();

    let snap = config.snap_radius_meters;
    if points
        .first()
        .is_some_and(|first| haversine_distance(first, pickup) > snap)
    {
        points.insert(0, *pickup);
    }
    if points
        .last()
        .is_some_and(|last| haversine_distance(last, &actual_dropoff) > snap)
    {
        points.push(actual_dropoff);
    }

    let distance_meters = path_length(&points);
    let duration_minutes = estimate_duration_minutes(distance_meters, config.average_speed_kmh);

    Ok(RouteSegment {
        points,
        distance_meters,
        duration_minutes,
        is_partial_ride: result.is_partial_ride,
        actual_dropoff,
    })
}

/// Minutes to cover `distance_meters` at a flat `speed_kmh`, rounded to the
/// nearest minute.
pub fn estimate_duration_minutes(distance_meters: f64, speed_kmh: f64) -> u32 {
    if speed_kmh <= 0.0 || !distance_meters.is_finite() {
        return 0;
    }
    (distance_meters / 1000.0 / speed_kmh * 60.0).round().max(0.0) as u32
}
