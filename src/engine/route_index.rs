//! Spatial prefilter over driver offers.
//!
//! Uses an R-tree of route bounding boxes to skip offers that cannot pass
//! near a pickup before their polylines are matched point by point.

use rstar::{RTree, RTreeObject, AABB};

use crate::geo_utils::{compute_bounds, meters_to_degrees};
use crate::{polyline, GeoPoint};

use super::RideOffer;

/// Degree conversions are approximate; search boxes are over-padded by this
/// factor so no route within the radius is filtered out.
const PADDING_FACTOR: f64 = 1.05;

/// Offer bounds wrapper for R-tree spatial indexing.
#[derive(Debug, Clone)]
pub struct OfferBounds {
    pub ride_id: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl RTreeObject for OfferBounds {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}

/// R-tree of offer route bounds.
#[derive(Debug)]
pub struct RouteIndex {
    tree: RTree<OfferBounds>,
}

impl Default for RouteIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build an index from offers. Offers whose polyline decodes to no points
    /// are left out, since they can never match.
    pub fn from_offers(offers: &[RideOffer]) -> Self {
        let bounds: Vec<OfferBounds> = offers
            .iter()
            .filter_map(|offer| {
                let route = polyline::decode(&offer.polyline);
                compute_bounds(&route).map(|b| OfferBounds {
                    ride_id: offer.ride_id.clone(),
                    min_lat: b.min_lat,
                    max_lat: b.max_lat,
                    min_lng: b.min_lng,
                    max_lng: b.max_lng,
                })
            })
            .collect();

        Self {
            tree: RTree::bulk_load(bounds),
        }
    }

    /// Add a single offer. Returns false if its polyline has no points.
    pub fn insert(&mut self, offer: &RideOffer) -> bool {
        let route = polyline::decode(&offer.polyline);
        match compute_bounds(&route) {
            Some(b) => {
                self.tree.insert(OfferBounds {
                    ride_id: offer.ride_id.clone(),
                    min_lat: b.min_lat,
                    max_lat: b.max_lat,
                    min_lng: b.min_lng,
                    max_lng: b.max_lng,
                });
                true
            }
            None => false,
        }
    }

    /// Ride ids whose route bounds come within `radius_meters` of `point`.
    ///
    /// Search boxes that cross the antimeridian are repeated 360 degrees
    /// over, so routes just across the date line are still found.
    pub fn candidates(&self, point: &GeoPoint, radius_meters: f64) -> Vec<String> {
        let pad = meters_to_degrees(radius_meters.max(0.0), point.lat) * PADDING_FACTOR;
        let min_lng = point.lng - pad;
        let max_lng = point.lng + pad;

        let mut shifts = vec![0.0];
        if min_lng < -180.0 {
            shifts.push(360.0);
        }
        if max_lng > 180.0 {
            shifts.push(-360.0);
        }

        let mut ids: Vec<String> = shifts
            .into_iter()
            .flat_map(|shift| {
                let search_bounds = AABB::from_corners(
                    [min_lng + shift, point.lat - pad],
                    [max_lng + shift, point.lat + pad],
                );
                self.tree
                    .locate_in_envelope_intersecting(&search_bounds)
                    .map(|b| b.ride_id.clone())
                    .collect::<Vec<_>>()
            })
            .collect();

        // A route spanning both edges can be hit by more than one box
        ids.sort();
        ids.dedup();
        ids
    }

    /// Get the number of indexed offers.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
