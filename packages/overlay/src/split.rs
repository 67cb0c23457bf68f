//! Splitting the rail network at unit boundaries.
//!
//! For every (rail line, attributed unit) pair whose bounding boxes touch,
//! the line is clipped to the unit polygon; each non-empty clip becomes an
//! [`AttributedSegment`] carrying the unit's count and id lists. Lengths
//! are additive across a split: the sub-segments of a line cut by a
//! boundary sum to the original geodesic length.

use std::collections::BTreeMap;
use std::sync::Arc;

use geo::{BooleanOps, BoundingRect, Intersects};
use rail_hazard_dataset::progress::ProgressCallback;
use rail_hazard_models::{AttributedSegment, RailLine, SegmentLength, SpatialUnit, UnitAttribution};

use crate::geodesic_length_meters_multi;

/// Overlays the rail network onto attributed unit polygons.
///
/// Units absent from `attributions` (possible when the attribution map was
/// loaded from a filtered file) contribute segments with a zero count, so
/// the exposure totals still cover the whole network inside the layer.
#[must_use]
pub fn propagate_to_segments(
    rail: &[RailLine],
    units: &[SpatialUnit],
    attributions: &BTreeMap<String, UnitAttribution>,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Vec<AttributedSegment> {
    if let Some(p) = progress {
        p.set_total(units.len() as u64);
    }

    let zero = UnitAttribution::default();
    let mut segments = Vec::new();

    for unit in units {
        if let Some(p) = progress {
            p.inc(1);
        }
        let Some(unit_rect) = unit.boundary.bounding_rect() else {
            continue;
        };
        let attribution = attributions.get(&unit.unit_id).unwrap_or(&zero);

        for line in rail {
            // Cheap envelope rejection before the expensive clip.
            let overlaps = line
                .path
                .bounding_rect()
                .is_some_and(|r| r.intersects(&unit_rect));
            if !overlaps {
                continue;
            }

            let clipped = unit.boundary.clip(&line.path, false);
            if clipped.0.is_empty() {
                continue;
            }
            let meters = geodesic_length_meters_multi(&clipped);
            if meters == 0.0 {
                continue;
            }

            segments.push(AttributedSegment {
                line_id: line.line_id.clone(),
                unit_id: unit.unit_id.clone(),
                count: attribution.count,
                event_ids: attribution.event_ids.clone(),
                episode_ids: attribution.episode_ids.clone(),
                path: clipped,
                length: SegmentLength::from_meters(meters),
            });
        }
    }

    if let Some(p) = progress {
        p.finish(format!("Split network into {} segments", segments.len()));
    }
    log::info!(
        "Overlay produced {} attributed segments from {} lines x {} units",
        segments.len(),
        rail.len(),
        units.len()
    );
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesic_length_meters;
    use geo::{MultiLineString, MultiPolygon, line_string, polygon};

    fn unit(id: &str, min_x: f64, width: f64) -> SpatialUnit {
        SpatialUnit {
            unit_id: id.to_string(),
            name: None,
            boundary: MultiPolygon(vec![polygon![
                (x: min_x, y: -1.0),
                (x: min_x + width, y: -1.0),
                (x: min_x + width, y: 1.0),
                (x: min_x, y: 1.0),
                (x: min_x, y: -1.0),
            ]]),
        }
    }

    fn attribution(count: u64, ids: &[&str]) -> UnitAttribution {
        UnitAttribution {
            count,
            event_ids: ids.iter().map(|s| (*s).to_string()).collect(),
            episode_ids: Vec::new(),
        }
    }

    #[test]
    fn split_lengths_are_additive() {
        // A straight east-west line crossing two adjacent unit squares.
        let whole = line_string![(x: 0.1, y: 0.0), (x: 1.9, y: 0.0)];
        let whole_meters = geodesic_length_meters(&whole);

        let rail = vec![RailLine {
            line_id: Some("L1".to_string()),
            path: MultiLineString(vec![whole]),
        }];
        let units = vec![unit("A", 0.0, 1.0), unit("B", 1.0, 1.0)];
        let attributions: BTreeMap<String, UnitAttribution> = [
            ("A".to_string(), attribution(3, &["e1"])),
            ("B".to_string(), attribution(0, &[])),
        ]
        .into_iter()
        .collect();

        let segments = propagate_to_segments(&rail, &units, &attributions, None);
        assert_eq!(segments.len(), 2);

        let sum: f64 = segments.iter().map(|s| s.length.meters).sum();
        assert!(
            ((sum - whole_meters) / whole_meters).abs() < 1e-6,
            "sum {sum} != whole {whole_meters}"
        );
    }

    #[test]
    fn attribution_is_copied_onto_segments() {
        let rail = vec![RailLine {
            line_id: None,
            path: MultiLineString(vec![line_string![(x: 0.2, y: 0.0), (x: 0.8, y: 0.0)]]),
        }];
        let units = vec![unit("A", 0.0, 1.0)];
        let attributions: BTreeMap<String, UnitAttribution> =
            [("A".to_string(), attribution(5, &["e1", "e2"]))]
                .into_iter()
                .collect();

        let segments = propagate_to_segments(&rail, &units, &attributions, None);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].count, 5);
        assert_eq!(segments[0].event_ids, vec!["e1", "e2"]);
        assert_eq!(segments[0].unit_id, "A");
        assert!(segments[0].length.miles > 0.0);
        assert!((segments[0].length.feet / segments[0].length.miles - 5280.0).abs() < 1.0);
    }

    #[test]
    fn unattributed_units_produce_zero_count_segments() {
        let rail = vec![RailLine {
            line_id: None,
            path: MultiLineString(vec![line_string![(x: 0.2, y: 0.0), (x: 0.8, y: 0.0)]]),
        }];
        let units = vec![unit("A", 0.0, 1.0)];
        let segments = propagate_to_segments(&rail, &units, &BTreeMap::new(), None);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].count, 0);
        assert!(segments[0].event_ids.is_empty());
    }

    #[test]
    fn disjoint_line_and_unit_produce_nothing() {
        let rail = vec![RailLine {
            line_id: None,
            path: MultiLineString(vec![line_string![(x: 10.0, y: 10.0), (x: 11.0, y: 10.0)]]),
        }];
        let units = vec![unit("A", 0.0, 1.0)];
        let segments = propagate_to_segments(&rail, &units, &BTreeMap::new(), None);
        assert!(segments.is_empty());
    }
}
