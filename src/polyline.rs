//! Encoded polyline codec.
//!
//! Routes arrive from the directions provider as compact strings: a starting
//! point followed by relative increments, each axis scaled by 1e5 and written
//! as base-64 digits offset by 63. See [Google's polyline
//! algorithm](https://developers.google.com/maps/documentation/utilities/polylinealgorithm).
//!
//! Decoding is deliberately permissive. A string that ends in the middle of a
//! value, or that contains a byte outside the polyline alphabet, yields every
//! point decoded before the damage instead of an error.

use std::str::Bytes;

use crate::GeoPoint;

const SCALE: f64 = 1e5;

/// Largest bit shift a single value may reach; longer runs are malformed.
const MAX_SHIFT: u32 = 30;

/// Decode an encoded polyline into its points, in input order.
///
/// # Example
/// ```
/// use ridematch::polyline::decode;
///
/// let route = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@");
/// assert_eq!(route.len(), 3);
/// assert_eq!(route[0].lat, 38.5);
/// assert_eq!(route[0].lng, -120.2);
/// ```
pub fn decode(encoded: &str) -> Vec<GeoPoint> {
    let mut bytes = encoded.bytes();
    let mut points = Vec::new();
    let mut lat = 0i64;
    let mut lng = 0i64;

    while let Some(d_lat) = read_value(&mut bytes) {
        let Some(d_lng) = read_value(&mut bytes) else {
            break;
        };
        lat += d_lat;
        lng += d_lng;
        points.push(GeoPoint::new(lat as f64 / SCALE, lng as f64 / SCALE));
    }

    points
}

/// Encode points into a polyline string, rounding each axis to 1e-5 degrees.
///
/// # Example
/// ```
/// use ridematch::{polyline, GeoPoint};
///
/// let points = vec![
///     GeoPoint::new(38.5, -120.2),
///     GeoPoint::new(40.7, -120.95),
///     GeoPoint::new(43.252, -126.453),
/// ];
/// assert_eq!(polyline::encode(&points), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
/// ```
pub fn encode(points: &[GeoPoint]) -> String {
    let mut output = String::with_capacity(points.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for point in points {
        let lat = (point.lat * SCALE).round() as i64;
        let lng = (point.lng * SCALE).round() as i64;
        write_value(lat - prev_lat, &mut output);
        write_value(lng - prev_lng, &mut output);
        prev_lat = lat;
        prev_lng = lng;
    }

    output
}

/// Reads a zig-zag encoded signed value.
fn read_value(bytes: &mut Bytes) -> Option<i64> {
    let raw = read_raw_value(bytes)?;
    let value = (raw >> 1) as i64;
    Some(if raw & 1 == 1 { !value } else { value })
}

/// Reads an unsigned value made of 5-bit groups, lowest group first.
///
/// Returns `None` when the input runs out before the final group.
fn read_raw_value(bytes: &mut Bytes) -> Option<u64> {
    let mut result = 0u64;
    let mut shift = 0;
    loop {
        let digit = read_digit(bytes)?;
        result |= u64::from(digit & 0x1F) << shift;
        if digit & 0x20 == 0 {
            return Some(result);
        }
        shift += 5;
        if shift > MAX_SHIFT {
            return None;
        }
    }
}

/// Reads a base-64 digit, rejecting bytes outside `'?'..='~'`.
fn read_digit(bytes: &mut Bytes) -> Option<u8> {
    let digit = bytes.next()?.checked_sub(63)?;
    (digit < 64).then_some(digit)
}

fn write_value(value: i64, output: &mut String) {
    let mut raw = if value < 0 {
        !((value as u64) << 1)
    } else {
        (value as u64) << 1
    };

    while raw >= 0x20 {
        output.push(char::from((0x20 | (raw & 0x1F)) as u8 + 63));
        raw >>= 5;
    }
    output.push(char::from(raw as u8 + 63));
}
