//! # Geographic Utilities
//!
//! Distance and search primitives shared by the matcher and the segment
//! extractor.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two points |
//! | [`path_length`] | Summed length of consecutive points |
//! | [`closest_point`] | Nearest route vertex to a target |
//! | [`closest_point_from`] | Nearest route vertex at or after an index |
//! | [`compute_bounds`] | Bounding box of a route |
//! | [`meters_to_degrees`] | Convert meters to approximate degrees at a latitude |
//!
//! All functions expect WGS84 coordinates in degrees.

use geo::{BoundingRect, Coord, LineString};
use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, Result};
use crate::{Bounds, GeoPoint};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance in meters between two points using the Haversine
/// formula on a sphere of radius 6,371 km.
///
/// The result is symmetric, never negative, and exactly zero for identical
/// points.
///
/// # Example
///
/// ```rust
/// use ridematch::{haversine_distance, GeoPoint};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
///
/// let distance = haversine_distance(&london, &paris);
/// assert!((distance - 343_500.0).abs() < 1000.0);
/// ```
#[inline]
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (lat1, lng1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lng2) = (b.lat.to_radians(), b.lng.to_radians());
    let sin_dlat = ((lat2 - lat1) * 0.5).sin();
    let sin_dlng = ((lng2 - lng1) * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Total length in meters of a sequence of points.
///
/// Empty and single-point inputs have length 0.0.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Convert meters to approximate degrees of longitude at a given latitude.
///
/// Longitude degrees shrink towards the poles, so this is the larger of the
/// two axis conversions and is safe for padding bounding boxes.
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let meters_per_degree = 111_320.0 * latitude.to_radians().cos().abs().max(0.01);
    meters / meters_per_degree
}

// =============================================================================
// Closest-Point Search
// =============================================================================

/// A route vertex found by a closest-point search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosestPoint {
    /// Index into the searched route
    pub index: usize,
    /// Distance in meters from the target to `route[index]`
    pub distance: f64,
}

/// Find the route point nearest to `target`.
///
/// Linear scan over every point; on ties the first occurrence wins.
/// Returns [`RideMatchError::EmptyRoute`](crate::RideMatchError::EmptyRoute)
/// for a route with no points.
pub fn closest_point(route: &[GeoPoint], target: &GeoPoint) -> Result<ClosestPoint> {
    closest_point_from(route, 0, target)
}

/// Find the point nearest to `target` among `route[start..]`.
///
/// The returned index is absolute, i.e. an index into `route`. A `start` at or
/// past the end of the route leaves nothing to search and is reported as an
/// empty route.
pub fn closest_point_from(
    route: &[GeoPoint],
    start: usize,
    target: &GeoPoint,
) -> Result<ClosestPoint> {
    let mut best: Option<ClosestPoint> = None;

    for (index, point) in route.iter().enumerate().skip(start) {
        let distance = haversine_distance(point, target);
        // Strict comparison keeps the first occurrence on ties
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(ClosestPoint { index, distance });
        }
    }

    best.ok_or_empty_route()
}

// =============================================================================
// Bounds
// =============================================================================

/// Convert points to a `geo` line string (x = longitude, y = latitude).
pub fn to_line_string(points: &[GeoPoint]) -> LineString<f64> {
    points
        .iter()
        .map(|p| Coord { x: p.lng, y: p.lat })
        .collect::<Vec<_>>()
        .into()
}

/// Bounding box of the points, or `None` when there are none.
pub fn compute_bounds(points: &[GeoPoint]) -> Option<Bounds> {
    let rect = to_line_string(points).bounding_rect()?;
    Some(Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}
