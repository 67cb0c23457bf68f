//! GeoJSON layer loading.
//!
//! Unit polygon layers (HUC watersheds, NWS forecast zones) and rail line
//! layers are read from GeoJSON FeatureCollections. A layer tagged with a
//! projected CRS is rejected outright — the pipeline has no reprojection
//! and silently treating projected coordinates as degrees would corrupt
//! every downstream length.

use std::fs;
use std::path::Path;

use geojson::{FeatureCollection, GeoJson};
use rail_hazard_dataset::definition::UnitLayerConfig;
use rail_hazard_models::{Crs, RailLine, SpatialUnit};

use crate::IngestError;
use crate::normalize::{clean_multilinestring, clean_multipolygon};

/// Reads a GeoJSON file and extracts its CRS tag.
///
/// Modern GeoJSON is implicitly WGS84; older exports carry a legacy `crs`
/// foreign member which is honored when present.
///
/// # Errors
///
/// Returns an error if the file is unreadable, the JSON is not a
/// FeatureCollection, or the CRS is not geographic.
pub fn read_feature_collection(path: &Path) -> Result<(FeatureCollection, Crs), IngestError> {
    let raw = fs::read_to_string(path)?;
    let geojson: GeoJson = raw.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;

    let crs = collection
        .foreign_members
        .as_ref()
        .and_then(|fm| fm.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(|name| name.as_str())
        .map_or_else(Crs::wgs84, normalize_crs_name);

    if !crs.is_geographic() {
        return Err(IngestError::NonGeographicCrs { crs });
    }
    Ok((collection, crs))
}

/// Maps legacy CRS URNs onto the EPSG tags the pipeline understands.
fn normalize_crs_name(name: &str) -> Crs {
    let upper = name.to_ascii_uppercase();
    if upper.contains("CRS84") || upper.contains("4326") {
        Crs::wgs84()
    } else if upper.contains("4269") {
        Crs::nad83()
    } else {
        Crs(name.to_string())
    }
}

/// Loads a spatial-unit polygon layer.
///
/// Non-polygon features are skipped with a warning; a polygon feature
/// without the configured id property is fatal, since every downstream
/// aggregate is keyed by it.
///
/// # Errors
///
/// Returns an error on unreadable files, non-geographic CRS tags, or a
/// missing id property.
pub fn load_unit_layer(
    path: &Path,
    config: &UnitLayerConfig,
) -> Result<Vec<SpatialUnit>, IngestError> {
    let (collection, crs) = read_feature_collection(path)?;
    let mut units = Vec::new();
    let mut skipped = 0usize;

    for feature in collection.features {
        let Some(geometry) = feature.geometry.clone() else {
            skipped += 1;
            continue;
        };
        let geo_geom: geo::Geometry<f64> = match geometry.try_into() {
            Ok(g) => g,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        let multi_polygon = match geo_geom {
            geo::Geometry::MultiPolygon(mp) => mp,
            geo::Geometry::Polygon(p) => geo::MultiPolygon(vec![p]),
            _ => {
                skipped += 1;
                continue;
            }
        };
        let Some(boundary) = clean_multipolygon(multi_polygon) else {
            skipped += 1;
            continue;
        };

        let unit_id = property_string(&feature, &config.id_field).ok_or_else(|| {
            IngestError::MissingIdProperty {
                field: config.id_field.clone(),
            }
        })?;
        let name = config
            .name_field
            .as_deref()
            .and_then(|f| property_string(&feature, f));

        units.push(SpatialUnit {
            unit_id,
            name,
            boundary,
        });
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {skipped} degenerate or non-polygon features in {}",
            path.display()
        );
    }
    log::info!("Loaded {} units from {} ({crs})", units.len(), path.display());
    Ok(units)
}

/// Loads a rail network line layer.
///
/// # Errors
///
/// Returns an error on unreadable files or non-geographic CRS tags.
pub fn load_rail_layer(
    path: &Path,
    id_field: Option<&str>,
) -> Result<Vec<RailLine>, IngestError> {
    let (collection, crs) = read_feature_collection(path)?;
    let mut lines = Vec::new();
    let mut skipped = 0usize;

    for feature in collection.features {
        let Some(geometry) = feature.geometry.clone() else {
            skipped += 1;
            continue;
        };
        let geo_geom: geo::Geometry<f64> = match geometry.try_into() {
            Ok(g) => g,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        let multi_line = match geo_geom {
            geo::Geometry::MultiLineString(mls) => mls,
            geo::Geometry::LineString(ls) => geo::MultiLineString(vec![ls]),
            _ => {
                skipped += 1;
                continue;
            }
        };
        let Some(path_geom) = clean_multilinestring(multi_line) else {
            skipped += 1;
            continue;
        };

        lines.push(RailLine {
            line_id: id_field.and_then(|f| property_string(&feature, f)),
            path: path_geom,
        });
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {skipped} degenerate or non-line features in {}",
            path.display()
        );
    }
    log::info!(
        "Loaded {} rail lines from {} ({crs})",
        lines.len(),
        path.display()
    );
    Ok(lines)
}

/// Reads a feature property as a string, accepting numeric ids (HUC codes
/// are sometimes exported as numbers).
fn property_string(feature: &geojson::Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
