#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Config-driven hazard dataset definitions.
//!
//! [`definition::DatasetDefinition`] captures everything unique about one
//! hazard catalog (CSV column mappings, date layout, optional narrative
//! keyword filter) in a serializable config struct. A single generic
//! ingestion and attribution pipeline handles all catalogs; adding a new
//! hazard type is a new TOML file in `datasets/`, not new code.

pub mod definition;
pub mod keywords;
pub mod parsing;
pub mod progress;
pub mod registry;

use thiserror::Error;

/// Errors raised while working with dataset definitions.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// TOML config failed to parse.
    #[error("Invalid dataset definition: {0}")]
    InvalidDefinition(#[from] toml::de::Error),

    /// Keyword filter failed to compile into a regex.
    #[error("Invalid keyword filter: {0}")]
    InvalidKeywords(#[from] regex::Error),

    /// No dataset with the requested id exists in the registry.
    #[error("Unknown dataset id: {id}")]
    UnknownDataset {
        /// The id that was requested.
        id: String,
    },
}
