//! # Ride Matcher Engine
//!
//! The request-handler facing side of the crate. Request handlers own
//! persistence and transport; they hand this engine raw polylines and
//! coordinates and get back serializable match decisions.
//!
//! Matching here is best-effort: bad coordinates, empty or damaged polylines
//! and failed searches are logged and reported as "no match", never
//! propagated into the surrounding request.
//!
//! ## Architecture
//!
//! - `RideMatcher` - decode once per offer, match, then extract the segment
//! - `RouteIndex` - R-tree prefilter over many offers

pub mod route_index;

pub use route_index::{OfferBounds, RouteIndex};

use std::collections::HashSet;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, Result, RideMatchError};
use crate::geo_utils::haversine_distance;
use crate::matching::match_route;
use crate::segment::{extract_segment, RouteSegment};
use crate::{polyline, GeoPoint, MatchConfig, MatchResult};

/// A passenger's trip request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    /// Trip length in kilometers, used to derive the acceptance threshold
    pub trip_distance_km: f64,
}

impl RideRequest {
    /// Create a request whose trip length is the straight-line distance
    /// between pickup and dropoff.
    pub fn direct(pickup: GeoPoint, dropoff: GeoPoint) -> Self {
        Self {
            pickup,
            dropoff,
            trip_distance_km: haversine_distance(&pickup, &dropoff) / 1000.0,
        }
    }
}

/// A driver's published route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideOffer {
    pub ride_id: String,
    /// Encoded polyline as stored from the directions provider
    pub polyline: String,
}

/// A driver offer that can serve a request, with what the passenger sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideMatch {
    pub ride_id: String,
    pub result: MatchResult,
    pub segment: RouteSegment,
}

/// Stateless matcher over driver routes.
///
/// Holds only configuration, so a single instance can be shared across
/// threads and requests.
#[derive(Debug, Clone, Default)]
pub struct RideMatcher {
    config: MatchConfig,
}

impl RideMatcher {
    /// Create a matcher with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a matcher with custom configuration.
    pub fn with_config(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    // ========================================================================
    // Single Route
    // ========================================================================

    /// Decode `encoded` and match the request against it.
    ///
    /// The acceptance threshold comes from `trip_distance_km` unless the
    /// configuration fixes one. Any failure is logged and returns `None`.
    pub fn match_polyline(
        &self,
        encoded: &str,
        pickup: &GeoPoint,
        dropoff: &GeoPoint,
        trip_distance_km: f64,
    ) -> Option<MatchResult> {
        if let Err(e) = validate_trip(pickup, dropoff) {
            log_rejected(&e);
            return None;
        }

        let route = polyline::decode(encoded);
        let threshold = self.config.threshold_for(trip_distance_km);
        match_route(&route, pickup, dropoff, threshold)
    }

    /// Extract the passenger-visible segment for a match made earlier.
    ///
    /// `result` must come from [`match_polyline`](Self::match_polyline) (or
    /// [`match_route`]) on the same polyline. A missing polyline, a missing
    /// result and a polyline that decodes to nothing all fail with
    /// [`RideMatchError::NoRouteMatch`].
    pub fn segment_for(
        &self,
        encoded: Option<&str>,
        pickup: &GeoPoint,
        dropoff: &GeoPoint,
        result: Option<&MatchResult>,
    ) -> Result<RouteSegment> {
        let encoded = encoded.ok_or_no_route_match()?;
        let result = result.ok_or_no_route_match()?;

        let route = polyline::decode(encoded);
        extract_segment(&route, pickup, dropoff, result, &self.config).map_err(|e| {
            warn!("[RideMatcher] Segment extraction failed: {}", e);
            RideMatchError::NoRouteMatch
        })
    }

    /// Match one offer and, on success, extract its segment.
    ///
    /// The polyline is decoded once and the same route feeds both steps.
    pub fn evaluate(&self, request: &RideRequest, offer: &RideOffer) -> Option<RideMatch> {
        if let Err(e) = validate_trip(&request.pickup, &request.dropoff) {
            log_rejected(&e);
            return None;
        }
        self.evaluate_offer(request, offer)
    }

    fn evaluate_offer(&self, request: &RideRequest, offer: &RideOffer) -> Option<RideMatch> {
        let route = polyline::decode(&offer.polyline);
        let threshold = self.config.threshold_for(request.trip_distance_km);

        let result = match_route(&route, &request.pickup, &request.dropoff, threshold)?;

        match extract_segment(
            &route,
            &request.pickup,
            &request.dropoff,
            &result,
            &self.config,
        ) {
            Ok(segment) => Some(RideMatch {
                ride_id: offer.ride_id.clone(),
                result,
                segment,
            }),
            Err(e) => {
                warn!(
                    "[RideMatcher] Offer {} matched but segment failed: {}",
                    offer.ride_id, e
                );
                None
            }
        }
    }

    // ========================================================================
    // Many Offers
    // ========================================================================

    /// Evaluate every offer against the request.
    ///
    /// Results are ordered by pickup distance, then direct matches before
    /// partial rides, then ride id.
    pub fn find_rides(&self, request: &RideRequest, offers: &[RideOffer]) -> Vec<RideMatch> {
        if let Err(e) = validate_trip(&request.pickup, &request.dropoff) {
            log_rejected(&e);
            return Vec::new();
        }

        let mut matches = self.evaluate_all(request, offers.iter());
        sort_matches(&mut matches);

        info!(
            "[RideMatcher] {} of {} offers match request",
            matches.len(),
            offers.len()
        );
        matches
    }

    /// Like [`find_rides`](Self::find_rides), but only offers the index
    /// places near the pickup are decoded and matched.
    pub fn find_rides_indexed(
        &self,
        request: &RideRequest,
        offers: &[RideOffer],
        index: &RouteIndex,
    ) -> Vec<RideMatch> {
        if let Err(e) = validate_trip(&request.pickup, &request.dropoff) {
            log_rejected(&e);
            return Vec::new();
        }

        let radius = self.config.threshold_for(request.trip_distance_km);
        let candidates: HashSet<String> =
            index.candidates(&request.pickup, radius).into_iter().collect();

        debug!(
            "[RideMatcher] Index kept {} of {} offers within {:.0}m",
            candidates.len(),
            offers.len(),
            radius
        );

        let mut matches = self.evaluate_all(
            request,
            offers
                .iter()
                .filter(|offer| candidates.contains(&offer.ride_id)),
        );
        sort_matches(&mut matches);

        info!(
            "[RideMatcher] {} of {} offers match request",
            matches.len(),
            offers.len()
        );
        matches
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_all<'a>(
        &self,
        request: &RideRequest,
        offers: impl Iterator<Item = &'a RideOffer>,
    ) -> Vec<RideMatch> {
        offers
            .filter_map(|offer| self.evaluate_offer(request, offer))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn evaluate_all<'a>(
        &self,
        request: &RideRequest,
        offers: impl Iterator<Item = &'a RideOffer>,
    ) -> Vec<RideMatch> {
        use rayon::prelude::*;

        let offers: Vec<&RideOffer> = offers.collect();
        offers
            .par_iter()
            .filter_map(|offer| self.evaluate_offer(request, offer))
            .collect()
    }
}

/// Reject coordinates and trips the matcher cannot reason about.
fn validate_trip(pickup: &GeoPoint, dropoff: &GeoPoint) -> Result<()> {
    for point in [pickup, dropoff] {
        if !point.is_valid() {
            return Err(RideMatchError::InvalidCoordinate {
                lat: point.lat,
                lng: point.lng,
            });
        }
    }
    if haversine_distance(pickup, dropoff) == 0.0 {
        return Err(RideMatchError::DegenerateTrip);
    }
    Ok(())
}

fn log_rejected(error: &RideMatchError) {
    match error {
        RideMatchError::DegenerateTrip => debug!("[RideMatcher] Request rejected: {}", error),
        _ => warn!("[RideMatcher] Request rejected: {}", error),
    }
}

fn sort_matches(matches: &mut [RideMatch]) {
    matches.sort_by(|a, b| {
        a.result
            .pickup_distance
            .total_cmp(&b.result.pickup_distance)
            .then(a.result.is_partial_ride.cmp(&b.result.is_partial_ride))
            .then_with(|| a.ride_id.cmp(&b.ride_id))
    });
}
