#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Rail network overlay against attributed unit polygons.
//!
//! Splits rail lines at unit boundaries, copies each unit's attribution
//! onto the resulting sub-segments, and measures sub-segment length
//! geodesically. The source layers are lon/lat degrees, so planar lengths
//! would be meaningless; every length here is an ellipsoidal arc length in
//! meters converted with the fixed mile/foot constants.

pub mod corridor;
pub mod split;

use geo::{Geodesic, Length, LineString, MultiLineString};

pub use corridor::{CorridorCount, assign_corridor_counts};
pub use split::propagate_to_segments;

/// Geodesic length of a linestring in meters.
#[must_use]
pub fn geodesic_length_meters(line: &LineString<f64>) -> f64 {
    Geodesic.length(line)
}

/// Geodesic length of a multilinestring in meters, summed over members.
#[must_use]
pub fn geodesic_length_meters_multi(lines: &MultiLineString<f64>) -> f64 {
    lines.0.iter().map(geodesic_length_meters).sum()
}
