#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Output artifacts: attributed GeoJSON/CSV layers and SVG charts.
//!
//! Identifier lists are serialized as comma-joined strings, matching the
//! column format of the published datasets; readers split them back apart,
//! so counts and id sets round-trip (the list order is not significant).

pub mod charts;
pub mod segments;
pub mod units;

use thiserror::Error;

/// Errors raised while writing or reading output artifacts.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File could not be written or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// GeoJSON (de)serialization failed.
    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An expected property is missing from a feature being read back.
    #[error("Feature is missing property {property:?}")]
    MissingProperty {
        /// The absent property name.
        property: String,
    },
}

/// Joins an id list into the comma-separated column format.
#[must_use]
pub fn join_ids(ids: &[String]) -> String {
    ids.join(",")
}

/// Splits a comma-separated id column back into a list. Empty columns
/// yield an empty list, not a list containing one empty string.
#[must_use]
pub fn split_ids(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
