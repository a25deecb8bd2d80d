//! # Ride Matcher
//!
//! Route matching and partial-ride engine for ride-sharing backends.
//!
//! This library provides:
//! - Encoded polyline decoding and encoding
//! - Haversine distances and closest-point search over a route
//! - A trip-length based acceptance threshold policy
//! - Route matching with partial-ride detection
//! - Privacy-preserving route segment extraction for passenger display
//! - A request-scoped engine that evaluates many driver offers at once
//!
//! ## Features
//!
//! - **`parallel`** - Evaluate driver offers in parallel with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use ridematch::{acceptance_threshold, match_route, polyline, GeoPoint};
//!
//! let route = polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@");
//! assert_eq!(route.len(), 3);
//!
//! let pickup = GeoPoint::new(38.5, -120.2);
//! let dropoff = GeoPoint::new(43.252, -126.453);
//!
//! let threshold = acceptance_threshold(5.0);
//! let result = match_route(&route, &pickup, &dropoff, threshold).unwrap();
//! assert_eq!(result.pickup_index, 0);
//! assert!(!result.is_partial_ride);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, RideMatchError};

// Compact route string codec
pub mod polyline;

// Geographic utilities (distance, closest point, bounds)
pub mod geo_utils;
pub use geo_utils::{closest_point, closest_point_from, haversine_distance, ClosestPoint};

// Distance-based acceptance policy
pub mod threshold;
pub use threshold::{acceptance_threshold, required_reduction};

// Route matching with partial-ride detection
pub mod matching;
pub use matching::{find_best_drop_point, find_dropoff_match, match_route, BestDropPoint};

// Pickup to dropoff slice for passenger display
pub mod segment;
pub use segment::{extract_segment, RouteSegment};

// Request-facing engine over many driver offers
pub mod engine;
pub use engine::{RideMatch, RideMatcher, RideOffer, RideRequest, RouteIndex};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate in WGS84 degrees.
///
/// # Example
/// ```
/// use ridematch::GeoPoint;
/// let point = GeoPoint::new(12.9716, 77.5946);
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }
}

/// Bounding box of a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Outcome of matching a passenger request against one driver route.
///
/// Only produced when the route can serve the request; a missing match is
/// represented by `None` at every call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Distance in meters from the pickup to its closest route point
    pub pickup_distance: f64,
    /// Distance in meters from the dropoff to its closest route point after pickup
    pub dropoff_distance: f64,
    /// Route index closest to the pickup
    pub pickup_index: usize,
    /// Route index closest to the dropoff, never before `pickup_index`
    pub dropoff_index: usize,
    /// Number of points in the decoded route
    pub total_route_points: usize,
    /// True when only the reduction rule accepted the match
    pub is_partial_ride: bool,
    /// Route point after pickup that leaves the least distance to the dropoff
    pub best_drop_point: Option<GeoPoint>,
    /// Route index of `best_drop_point`
    pub best_drop_point_index: usize,
    /// Meters left between `best_drop_point` and the requested dropoff
    pub remaining_distance: f64,
    /// Share of the direct journey covered by the route (0-100)
    pub distance_reduction: f64,
    /// Straight-line pickup to dropoff distance in meters
    pub original_distance: f64,
}

/// Configuration for segment extraction and the ride matcher engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// A sliced segment endpoint further than this from the exact pickup or
    /// dropoff gets the exact coordinate added.
    /// Default: 50.0 meters
    pub snap_radius_meters: f64,

    /// Average speed used for segment duration estimates.
    /// Default: 30.0 km/h (city traffic)
    pub average_speed_kmh: f64,

    /// Fixed acceptance threshold in meters. When `None` the threshold is
    /// derived from the trip distance with [`acceptance_threshold`]. A
    /// non-finite or negative override is ignored.
    /// Default: None
    pub threshold_override_meters: Option<f64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            snap_radius_meters: 50.0,
            average_speed_kmh: 30.0,
            threshold_override_meters: None,
        }
    }
}

impl MatchConfig {
    /// Acceptance threshold in meters for a trip of the given length.
    pub fn threshold_for(&self, trip_distance_km: f64) -> f64 {
        self.threshold_override_meters
            .filter(|meters| meters.is_finite() && *meters >= 0.0)
            .unwrap_or_else(|| acceptance_threshold(trip_distance_km))
    }
}
