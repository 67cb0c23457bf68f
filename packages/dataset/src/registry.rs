//! Dataset registry — loads all hazard dataset definitions from embedded
//! TOML configs.
//!
//! Each `.toml` file in `packages/dataset/datasets/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a new hazard catalog
//! is a new TOML file and one entry in the list below.

use crate::DatasetError;
use crate::definition::{DatasetDefinition, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    // ── NCEI storm events ────────────────────────────────────────────
    ("flash_flood", include_str!("../datasets/flash_flood.toml")),
    (
        "riverine_flood",
        include_str!("../datasets/riverine_flood.toml"),
    ),
    ("heat", include_str!("../datasets/heat.toml")),
    (
        "excessive_heat",
        include_str!("../datasets/excessive_heat.toml"),
    ),
    // ── USGS ─────────────────────────────────────────────────────────
    ("landslide", include_str!("../datasets/landslide.toml")),
    // ── FRA accident records ─────────────────────────────────────────
    (
        "track_buckling",
        include_str!("../datasets/track_buckling.toml"),
    ),
];

/// Total number of configured datasets (used in tests).
#[cfg(test)]
const EXPECTED_DATASET_COUNT: usize = 6;

/// Returns all configured dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a single dataset definition by registry id.
///
/// # Errors
///
/// Returns [`DatasetError::UnknownDataset`] if no definition has the id.
pub fn dataset_by_id(id: &str) -> Result<DatasetDefinition, DatasetError> {
    all_datasets()
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| DatasetError::UnknownDataset { id: id.to_string() })
}
