//! Distance-based acceptance policy.
//!
//! Short trips demand tight proximity between the route and the passenger,
//! long trips tolerate more slack. The same idea drives the partial-ride
//! rule: the longer the direct journey, the smaller the share a route has to
//! cover to be worth offering.

/// Acceptance radius in meters for a trip of `trip_distance_km`.
///
/// Piecewise linear and non-decreasing:
///
/// | Trip distance | Threshold |
/// |---------------|-----------|
/// | ≤ 5 km | 800 m |
/// | 5 – 20 km | 1000 + (d − 5) × 50 |
/// | 20 – 50 km | 1750 + (d − 20) × 30 |
/// | 50 – 100 km | 2650 + (d − 50) × 20 |
/// | > 100 km | max(3650, d × 10) |
///
/// Negative or non-finite distances are treated as 0 km.
///
/// # Example
/// ```
/// use ridematch::acceptance_threshold;
///
/// assert_eq!(acceptance_threshold(5.0), 800.0);
/// assert_eq!(acceptance_threshold(100.0), 3650.0);
/// ```
pub fn acceptance_threshold(trip_distance_km: f64) -> f64 {
    let d = sanitize_km(trip_distance_km);

    if d <= 5.0 {
        800.0
    } else if d <= 20.0 {
        1000.0 + (d - 5.0) * 50.0
    } else if d <= 50.0 {
        1750.0 + (d - 20.0) * 30.0
    } else if d <= 100.0 {
        2650.0 + (d - 50.0) * 20.0
    } else {
        (d * 10.0).max(3650.0)
    }
}

/// Minimum share (percent) of the direct journey a route must cover for a
/// partial ride: 60 below 30 km, 55 from 30 to 100 km, 30 beyond.
pub fn required_reduction(direct_distance_km: f64) -> f64 {
    let d = sanitize_km(direct_distance_km);

    if d < 30.0 {
        60.0
    } else if d <= 100.0 {
        55.0
    } else {
        30.0
    }
}

fn sanitize_km(km: f64) -> f64 {
    if km.is_finite() {
        km.max(0.0)
    } else {
        0.0
    }
}
