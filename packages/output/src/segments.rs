//! Attributed rail segment output.
//!
//! Segments are written twice, like the original datasets: a GeoJSON file
//! carrying geometry for mapping, and a CSV carrying the attribute columns
//! for the statistics notebooks. Corridor counts and verification matches
//! get CSV-only writers.

use std::fs;
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson};
use rail_hazard_models::AttributedSegment;
use rail_hazard_overlay::CorridorCount;
use rail_hazard_verify::VerifiedMatch;

use crate::{OutputError, join_ids, split_ids};

/// One row of the segment CSV, geometry omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub line_id: Option<String>,
    pub unit_id: String,
    pub count: u64,
    pub event_ids: Vec<String>,
    pub episode_ids: Vec<String>,
    pub length_meters: f64,
    pub length_feet: f64,
    pub length_miles: f64,
}

/// Writes attributed segments as GeoJSON.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn write_segments_geojson(
    path: &Path,
    segments: &[AttributedSegment],
) -> Result<(), OutputError> {
    let features: Vec<Feature> = segments
        .iter()
        .map(|segment| {
            let mut properties = serde_json::Map::new();
            if let Some(line_id) = &segment.line_id {
                properties.insert("line_id".to_string(), line_id.clone().into());
            }
            properties.insert("unit_id".to_string(), segment.unit_id.clone().into());
            properties.insert("count".to_string(), segment.count.into());
            properties.insert(
                "event_ids".to_string(),
                join_ids(&segment.event_ids).into(),
            );
            properties.insert(
                "episode_ids".to_string(),
                join_ids(&segment.episode_ids).into(),
            );
            properties.insert("length_meters".to_string(), segment.length.meters.into());
            properties.insert("length_feet".to_string(), segment.length.feet.into());
            properties.insert("length_miles".to_string(), segment.length.miles.into());

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&segment.path))),
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
    log::info!("Wrote {} segments to {}", segments.len(), path.display());
    Ok(())
}

/// Writes the segment attribute table as CSV.
///
/// # Errors
///
/// Returns an error if the file write fails.
pub fn write_segments_csv(path: &Path, segments: &[AttributedSegment]) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "line_id",
        "unit_id",
        "count",
        "event_ids",
        "episode_ids",
        "length_meters",
        "length_feet",
        "length_miles",
    ])?;
    for segment in segments {
        writer.write_record([
            segment.line_id.as_deref().unwrap_or(""),
            &segment.unit_id,
            &segment.count.to_string(),
            &join_ids(&segment.event_ids),
            &join_ids(&segment.episode_ids),
            &segment.length.meters.to_string(),
            &segment.length.feet.to_string(),
            &segment.length.miles.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a segment CSV back into attribute rows.
///
/// # Errors
///
/// Returns an error if the file is unreadable or a row is malformed.
pub fn read_segments_csv(path: &Path) -> Result<Vec<SegmentRow>, OutputError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();
        rows.push(SegmentRow {
            line_id: {
                let v = field(0);
                (!v.is_empty()).then(|| v.to_string())
            },
            unit_id: field(1).to_string(),
            count: field(2).parse().unwrap_or(0),
            event_ids: split_ids(field(3)),
            episode_ids: split_ids(field(4)),
            length_meters: field(5).parse().unwrap_or(0.0),
            length_feet: field(6).parse().unwrap_or(0.0),
            length_miles: field(7).parse().unwrap_or(0.0),
        });
    }
    Ok(rows)
}

/// Writes corridor counts as CSV.
///
/// # Errors
///
/// Returns an error if the file write fails.
pub fn write_corridor_csv(path: &Path, counts: &[CorridorCount]) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "line_index",
        "line_id",
        "line_length_meters",
        "line_length_miles",
        "radius_meters",
        "count",
        "event_ids",
    ])?;
    for row in counts {
        writer.write_record([
            &row.line_index.to_string(),
            row.line_id.as_deref().unwrap_or(""),
            &row.line_length.meters.to_string(),
            &row.line_length.miles.to_string(),
            &row.radius_meters.to_string(),
            &row.count.to_string(),
            &join_ids(&row.event_ids),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes verification matches as CSV.
///
/// # Errors
///
/// Returns an error if the file write fails.
pub fn write_matches_csv(path: &Path, matches: &[VerifiedMatch]) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["accident_id", "event_id", "episode_id", "unit_id"])?;
    for m in matches {
        writer.write_record([
            &m.accident_id,
            &m.event_id,
            m.episode_id.as_deref().unwrap_or(""),
            &m.unit_id,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiLineString, line_string};
    use rail_hazard_models::SegmentLength;

    fn segment(unit: &str, count: u64, ids: &[&str]) -> AttributedSegment {
        AttributedSegment {
            line_id: Some("L1".to_string()),
            unit_id: unit.to_string(),
            count,
            event_ids: ids.iter().map(|s| (*s).to_string()).collect(),
            episode_ids: Vec::new(),
            path: MultiLineString(vec![line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]]),
            length: SegmentLength::from_meters(1000.0),
        }
    }

    #[test]
    fn segment_csv_round_trips_counts_and_ids() {
        let segments = vec![
            segment("A", 2, &["1001", "1002"]),
            segment("B", 0, &[]),
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segments.csv");
        write_segments_csv(&path, &segments).unwrap();

        let rows = read_segments_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].event_ids, vec!["1001", "1002"]);
        assert_eq!(rows[1].count, 0);
        assert!(rows[1].event_ids.is_empty());
        assert!((rows[0].length_miles - 1000.0 * rail_hazard_models::METERS_TO_MILES).abs() < 1e-12);
    }

    #[test]
    fn segments_geojson_is_a_feature_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segments.geojson");
        write_segments_geojson(&path, &[segment("A", 1, &["9"])]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let geojson: GeoJson = raw.parse().unwrap();
        let collection = FeatureCollection::try_from(geojson).unwrap();
        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(
            feature.property("unit_id").and_then(|v| v.as_str()),
            Some("A")
        );
        assert_eq!(feature.property("count").and_then(serde_json::Value::as_u64), Some(1));
    }

    #[test]
    fn corridor_csv_writes_zero_rows() {
        let counts = vec![CorridorCount {
            line_index: 0,
            line_id: None,
            line_length: SegmentLength::from_meters(500.0),
            radius_meters: 15.0,
            count: 0,
            event_ids: Vec::new(),
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corridor.csv");
        write_corridor_csv(&path, &counts).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.lines().count() == 2);
    }
}
