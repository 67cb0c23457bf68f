#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! File ingestion for the attribution pipeline.
//!
//! Loads hazard catalog CSV exports into typed [`rail_hazard_models`]
//! records and GeoJSON layers into unit polygons and rail lines. Row-level
//! problems (missing coordinates, zero-coordinate sentinels, unparseable
//! fields) exclude the row and are tallied in a [`events::LoadReport`];
//! file-level problems (missing file, wrong CRS, malformed GeoJSON) are
//! fatal and propagate as [`IngestError`].

pub mod accidents;
pub mod events;
pub mod layers;
pub mod normalize;

use thiserror::Error;

/// Errors that can occur while loading input files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed at the file level.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// GeoJSON parsing failed.
    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    /// Dataset definition problem.
    #[error("Dataset error: {0}")]
    Dataset(#[from] rail_hazard_dataset::DatasetError),

    /// A column the dataset definition names is absent from the CSV header.
    #[error("CSV is missing column {column:?}")]
    MissingColumn {
        /// The missing column name.
        column: String,
    },

    /// A unit feature lacks the configured identifier property.
    #[error("Unit feature is missing id property {field:?}")]
    MissingIdProperty {
        /// The configured id property name.
        field: String,
    },

    /// The layer is tagged with a CRS the pipeline cannot consume.
    #[error("Layer CRS {crs} is not geographic; reprojection is unsupported")]
    NonGeographicCrs {
        /// The offending CRS tag.
        crs: rail_hazard_models::Crs,
    },
}
