//! Dataset definition structs deserialized from embedded TOML configs.

use rail_hazard_models::HazardKind;
use serde::Deserialize;

use crate::DatasetError;

/// A complete, config-driven hazard dataset definition.
///
/// Loaded from TOML files at compile time and used as the sole description
/// of a hazard catalog's CSV layout.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"flash_flood"`).
    pub id: String,
    /// Human-readable name (e.g., `"NCEI Flash Flood"`).
    pub name: String,
    /// Hazard category records from this dataset are tagged with.
    pub kind: HazardKind,
    /// Upstream catalog the CSV export came from.
    pub provider: String,
    /// Field name mappings for the event CSV.
    pub fields: FieldMapping,
    /// Optional whole-word narrative keyword filter. Rows whose narrative
    /// matches none of the keywords are excluded at load time.
    #[serde(default)]
    pub filter: Option<KeywordFilter>,
    /// How the companion spatial-unit layer is keyed.
    pub unit_layer: UnitLayerConfig,
}

/// CSV column names for the per-dataset event fields.
///
/// Dates come in two layouts: NCEI exports use compact `YYYYMM` columns plus
/// a separate day column; other catalogs carry one ISO `YYYY-MM-DD` column.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapping {
    /// Point-level identifier column.
    pub event_id: String,
    /// Episode identifier column, for catalogs where one logical event
    /// produces multiple point records.
    #[serde(default)]
    pub episode_id: Option<String>,
    /// Latitude column.
    pub latitude: String,
    /// Longitude column.
    pub longitude: String,
    /// Compact `YYYYMM` begin column (NCEI layout).
    #[serde(default)]
    pub begin_yearmo: Option<String>,
    /// Begin day-of-month column (NCEI layout).
    #[serde(default)]
    pub begin_day: Option<String>,
    /// Compact `YYYYMM` end column (NCEI layout).
    #[serde(default)]
    pub end_yearmo: Option<String>,
    /// End day-of-month column (NCEI layout).
    #[serde(default)]
    pub end_day: Option<String>,
    /// Single ISO `YYYY-MM-DD` date column (non-NCEI layout).
    #[serde(default)]
    pub date: Option<String>,
    /// Free-text narrative column.
    #[serde(default)]
    pub narrative: Option<String>,
}

/// Whole-word, case-insensitive narrative keyword filter.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordFilter {
    /// Keywords matched as whole words against the narrative column.
    pub narrative_keywords: Vec<String>,
}

/// How to read the companion spatial-unit polygon layer.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitLayerConfig {
    /// Property holding the unique region identifier (`huc12`, `ZONE`, ...).
    pub id_field: String,
    /// Property holding a human-readable unit name, when present.
    #[serde(default)]
    pub name_field: Option<String>,
}

/// Parses a TOML dataset definition.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, DatasetError> {
    Ok(toml::from_str(toml_str)?)
}
