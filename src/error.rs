//! Unified error handling for the matching core.
//!
//! A missing match is a normal outcome and is reported as `None`, not as an
//! error. The variants here cover inputs that cannot be searched at all and
//! the user-facing "no route match found" condition raised at the engine
//! boundary.

use thiserror::Error;

/// Errors produced by the route matching core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RideMatchError {
    /// A closest-point search was run on a route with zero points.
    #[error("route has no points to search")]
    EmptyRoute,

    /// A coordinate handed to the engine is not a usable WGS84 position.
    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },

    /// Pickup and dropoff are the same point, so the trip has no length.
    #[error("pickup and dropoff are identical")]
    DegenerateTrip,

    /// No usable route match exists for the request.
    #[error("no route match found")]
    NoRouteMatch,
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, RideMatchError>;

/// Conversions from `Option` into crate errors.
pub trait OptionExt<T> {
    /// Turn `None` into [`RideMatchError::NoRouteMatch`].
    fn ok_or_no_route_match(self) -> Result<T>;

    /// Turn `None` into [`RideMatchError::EmptyRoute`].
    fn ok_or_empty_route(self) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_no_route_match(self) -> Result<T> {
        self.ok_or(RideMatchError::NoRouteMatch)
    }

    fn ok_or_empty_route(self) -> Result<T> {
        self.ok_or(RideMatchError::EmptyRoute)
    }
}
