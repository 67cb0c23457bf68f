//! Attributed unit layer output.
//!
//! Writes the unit polygons back out as GeoJSON with the attribution
//! columns attached (`count`, `event_ids`, `episode_ids`), and reads such
//! a file back into an attribution map for downstream stages run as
//! separate invocations.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson};
use rail_hazard_models::{SpatialUnit, UnitAttribution};

use crate::{OutputError, join_ids, split_ids};

/// Writes units with their attributions as a GeoJSON FeatureCollection.
///
/// Every unit is written, including zero-count units, so the output is a
/// complete copy of the reference layer plus attribution columns.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn write_attributed_units(
    path: &Path,
    units: &[SpatialUnit],
    attributions: &BTreeMap<String, UnitAttribution>,
) -> Result<(), OutputError> {
    let zero = UnitAttribution::default();
    let features: Vec<Feature> = units
        .iter()
        .map(|unit| {
            let attribution = attributions.get(&unit.unit_id).unwrap_or(&zero);
            let mut properties = serde_json::Map::new();
            properties.insert("unit_id".to_string(), unit.unit_id.clone().into());
            if let Some(name) = &unit.name {
                properties.insert("name".to_string(), name.clone().into());
            }
            properties.insert("count".to_string(), attribution.count.into());
            properties.insert(
                "event_ids".to_string(),
                join_ids(&attribution.event_ids).into(),
            );
            properties.insert(
                "episode_ids".to_string(),
                join_ids(&attribution.episode_ids).into(),
            );

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &unit.boundary,
                ))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    fs::write(path, GeoJson::from(collection).to_string())?;
    log::info!("Wrote {} attributed units to {}", units.len(), path.display());
    Ok(())
}

/// Reads an attributed unit layer back into an attribution map.
///
/// # Errors
///
/// Returns an error if the file is unreadable, not a FeatureCollection,
/// or a feature lacks the attribution properties.
pub fn read_attributed_units(
    path: &Path,
) -> Result<BTreeMap<String, UnitAttribution>, OutputError> {
    let raw = fs::read_to_string(path)?;
    let geojson: GeoJson = raw.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;

    let mut attributions = BTreeMap::new();
    for feature in collection.features {
        let unit_id = string_property(&feature, "unit_id")?;
        let count = feature
            .property("count")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| OutputError::MissingProperty {
                property: "count".to_string(),
            })?;
        let event_ids = split_ids(&string_property(&feature, "event_ids")?);
        let episode_ids = split_ids(&string_property(&feature, "episode_ids")?);

        attributions.insert(
            unit_id,
            UnitAttribution {
                count,
                event_ids,
                episode_ids,
            },
        );
    }
    Ok(attributions)
}

fn string_property(feature: &Feature, name: &str) -> Result<String, OutputError> {
    feature
        .property(name)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| OutputError::MissingProperty {
            property: name.to_string(),
        })
}
