//! Route matching with partial-ride detection.
//!
//! A driver route serves a passenger when it passes close to the pickup and
//! then either passes close to the dropoff (direct match) or carries the
//! passenger far enough towards it (partial ride). Only the part of the route
//! at or after the pickup point is considered for the dropoff, so a route
//! never "drops" a passenger before picking them up.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, Result};
use crate::geo_utils::{closest_point, closest_point_from, haversine_distance, ClosestPoint};
use crate::threshold::required_reduction;
use crate::{GeoPoint, MatchResult};

/// The route point after pickup that leaves the least distance to the dropoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestDropPoint {
    /// Index into the route
    pub index: usize,
    /// The route point itself
    pub point: GeoPoint,
    /// Meters from `point` to the requested dropoff
    pub remaining_distance: f64,
}

/// Match a passenger request against a decoded driver route.
///
/// Returns `None` when the route cannot serve the request:
/// - the route is empty,
/// - no route point lies within `threshold` meters of the pickup (a NaN
///   threshold admits nothing),
/// - pickup and dropoff coincide (a zero-length trip),
/// - the dropoff is neither within `threshold` of the route after pickup nor
///   covered by the required share of the direct journey.
///
/// # Example
/// ```
/// use ridematch::{match_route, GeoPoint};
///
/// let route: Vec<GeoPoint> = (0..=10)
///     .map(|i| GeoPoint::new(0.0, i as f64 * 0.01))
///     .collect();
///
/// let pickup = GeoPoint::new(0.0, 0.0);
/// let dropoff = GeoPoint::new(0.0, 0.08);
/// let result = match_route(&route, &pickup, &dropoff, 800.0).unwrap();
///
/// assert_eq!(result.pickup_index, 0);
/// assert_eq!(result.dropoff_index, 8);
/// assert!(!result.is_partial_ride);
/// ```
pub fn match_route(
    route: &[GeoPoint],
    pickup: &GeoPoint,
    dropoff: &GeoPoint,
    threshold: f64,
) -> Option<MatchResult> {
    let pickup_match = match closest_point(route, pickup) {
        Ok(m) => m,
        Err(e) => {
            debug!("[Matching] No match: {}", e);
            return None;
        }
    };

    if threshold.is_nan() || pickup_match.distance > threshold {
        debug!(
            "[Matching] Pickup {:.0}m from route exceeds threshold {:.0}m",
            pickup_match.distance, threshold
        );
        return None;
    }

    let original_distance = haversine_distance(pickup, dropoff);
    if original_distance == 0.0 {
        debug!("[Matching] Pickup equals dropoff, treating as no match");
        return None;
    }

    // Both searches cover route[pickup_index..], which is never empty here
    let dropoff_match = find_dropoff_match(route, pickup_match.index, dropoff).ok()?;
    let best_drop = find_best_drop_point(route, pickup_match.index, dropoff).ok()?;

    let distance_reduction =
        ((original_distance - best_drop.remaining_distance) / original_distance * 100.0).max(0.0);
    let required = required_reduction(original_distance / 1000.0);

    let is_direct = dropoff_match.distance <= threshold;
    let is_partial = distance_reduction >= required;

    if !is_direct && !is_partial {
        debug!(
            "[Matching] Dropoff {:.0}m from route, reduction {:.1}% below required {:.0}%",
            dropoff_match.distance, distance_reduction, required
        );
        return None;
    }

    Some(MatchResult {
        pickup_distance: pickup_match.distance,
        dropoff_distance: dropoff_match.distance,
        pickup_index: pickup_match.index,
        dropoff_index: dropoff_match.index,
        total_route_points: route.len(),
        is_partial_ride: is_partial && !is_direct,
        best_drop_point: Some(best_drop.point),
        best_drop_point_index: best_drop.index,
        remaining_distance: best_drop.remaining_distance,
        distance_reduction,
        original_distance,
    })
}

/// Closest route point to the dropoff among `route[pickup_index..]`.
pub fn find_dropoff_match(
    route: &[GeoPoint],
    pickup_index: usize,
    dropoff: &GeoPoint,
) -> Result<ClosestPoint> {
    closest_point_from(route, pickup_index, dropoff)
}

/// Route point among `route[pickup_index..]` minimizing the remaining
/// distance to the dropoff.
///
/// This scans the same range as [`find_dropoff_match`] but is kept as its own
/// minimization: `best_drop_point_index` is what segment extraction reuses,
/// and it must not silently follow any change to the dropoff search.
pub fn find_best_drop_point(
    route: &[GeoPoint],
    pickup_index: usize,
    dropoff: &GeoPoint,
) -> Result<BestDropPoint> {
    let mut best: Option<BestDropPoint> = None;
    let mut min_remaining = f64::INFINITY;

    for (index, point) in route.iter().enumerate().skip(pickup_index) {
        let remaining = haversine_distance(point, dropoff);
        if best.is_none() || remaining < min_remaining {
            min_remaining = remaining;
            best = Some(BestDropPoint {
                index,
                point: *point,
                remaining_distance: remaining,
            });
        }
    }

    best.ok_or_empty_route()
}
