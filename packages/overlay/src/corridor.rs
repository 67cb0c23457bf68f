//! Corridor assignment for point hazards along rail lines.
//!
//! Landslide points are attributed to every rail line they fall within a
//! corridor distance of (15, 50, and 100 m in the published analysis).
//! Corridor membership is the closest-point haversine distance test, the
//! predicate a flat-capped buffer polygon approximates.

use std::collections::BTreeSet;
use std::sync::Arc;

use geo::{Closest, ClosestPoint, Distance, Haversine, Point};
use rail_hazard_dataset::progress::ProgressCallback;
use rail_hazard_models::{HazardEvent, RailLine, SegmentLength};

use crate::geodesic_length_meters_multi;

/// Per-(line, radius) corridor attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorCount {
    /// Index of the line in the input layer (stable even when the layer
    /// has no id attribute).
    pub line_index: usize,
    /// Line feature id, when the layer carries one.
    pub line_id: Option<String>,
    /// Geodesic length of the whole line.
    pub line_length: SegmentLength,
    /// Corridor radius in meters.
    pub radius_meters: f64,
    /// Distinct events inside the corridor.
    pub count: u64,
    /// Their event ids, in input order.
    pub event_ids: Vec<String>,
}

/// Minimum haversine distance in meters from a point to a rail line.
#[must_use]
pub fn distance_to_line_meters(point: Point<f64>, line: &RailLine) -> f64 {
    line.path
        .0
        .iter()
        .map(|ls| match ls.closest_point(&point) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => Haversine.distance(point, p),
            Closest::Indeterminate => f64::INFINITY,
        })
        .fold(f64::INFINITY, f64::min)
}

/// Counts events within each corridor radius of each rail line.
///
/// An event within several lines' corridors counts toward each of them,
/// matching the buffer-polygon join it replaces. Duplicate event ids on
/// the same line count once. Every (line, radius) pair is present in the
/// output, zero-filled when nothing is nearby.
#[must_use]
pub fn assign_corridor_counts(
    rail: &[RailLine],
    events: &[HazardEvent],
    radii_meters: &[f64],
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Vec<CorridorCount> {
    if let Some(p) = progress {
        p.set_total(rail.len() as u64);
    }

    let mut results = Vec::with_capacity(rail.len() * radii_meters.len());
    let max_radius = radii_meters.iter().copied().fold(0.0, f64::max);

    for (line_index, line) in rail.iter().enumerate() {
        if let Some(p) = progress {
            p.inc(1);
        }
        let line_length = SegmentLength::from_meters(geodesic_length_meters_multi(&line.path));

        // One distance computation per event, shared across radii.
        let mut within: Vec<(f64, &HazardEvent)> = Vec::new();
        for event in events {
            let d = distance_to_line_meters(event.location, line);
            if d <= max_radius {
                within.push((d, event));
            }
        }

        for &radius in radii_meters {
            let mut seen = BTreeSet::new();
            let mut event_ids = Vec::new();
            for (d, event) in &within {
                if *d <= radius && seen.insert(event.event_id.as_str()) {
                    event_ids.push(event.event_id.clone());
                }
            }
            results.push(CorridorCount {
                line_index,
                line_id: line.line_id.clone(),
                line_length,
                radius_meters: radius,
                count: event_ids.len() as u64,
                event_ids,
            });
        }
    }

    if let Some(p) = progress {
        p.finish(format!(
            "Corridor assignment over {} lines complete",
            rail.len()
        ));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiLineString, line_string};
    use rail_hazard_models::HazardKind;

    fn line(id: &str) -> RailLine {
        // Straight north-south line along -90.0 longitude.
        RailLine {
            line_id: Some(id.to_string()),
            path: MultiLineString(vec![line_string![
                (x: -90.0, y: 40.0),
                (x: -90.0, y: 41.0),
            ]]),
        }
    }

    fn slide(id: &str, lon: f64, lat: f64) -> HazardEvent {
        HazardEvent {
            event_id: id.to_string(),
            episode_id: None,
            kind: HazardKind::Landslide,
            location: Point::new(lon, lat),
            begin: None,
            end: None,
            narrative: None,
        }
    }

    #[test]
    fn distance_to_adjacent_point_is_sensible() {
        // ~0.0005 degrees of longitude at 40.5N is roughly 42 m.
        let d = distance_to_line_meters(Point::new(-89.9995, 40.5), &line("L1"));
        assert!((30.0..60.0).contains(&d), "got {d}");
    }

    #[test]
    fn nested_radii_are_monotonic() {
        let rail = vec![line("L1")];
        let events = vec![
            slide("s1", -90.0001, 40.5), // ~8 m away
            slide("s2", -89.9995, 40.5), // ~42 m away
            slide("s3", -89.999, 40.5),  // ~85 m away
            slide("s4", -89.99, 40.5),   // ~845 m away
        ];
        let counts = assign_corridor_counts(&rail, &events, &[15.0, 50.0, 100.0], None);
        assert_eq!(counts.len(), 3);
        let by_radius: Vec<u64> = counts.iter().map(|c| c.count).collect();
        assert_eq!(by_radius, vec![1, 2, 3]);
        // One degree of latitude is roughly 111 km.
        assert!((110_000.0..112_500.0).contains(&counts[0].line_length.meters));
    }

    #[test]
    fn zero_filled_when_nothing_nearby() {
        let rail = vec![line("L1")];
        let events = vec![slide("s1", -80.0, 35.0)];
        let counts = assign_corridor_counts(&rail, &events, &[15.0], None);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, 0);
        assert!(counts[0].event_ids.is_empty());
    }

    #[test]
    fn duplicate_event_ids_count_once() {
        let rail = vec![line("L1")];
        let events = vec![slide("s1", -90.0001, 40.5), slide("s1", -90.0001, 40.6)];
        let counts = assign_corridor_counts(&rail, &events, &[50.0], None);
        assert_eq!(counts[0].count, 1);
    }

    #[test]
    fn event_near_two_lines_counts_for_both() {
        let mut second = line("L2");
        // Shift the second line 20 m east of the first.
        second.path = MultiLineString(vec![line_string![
            (x: -89.99975, y: 40.0),
            (x: -89.99975, y: 41.0),
        ]]);
        let rail = vec![line("L1"), second];
        let events = vec![slide("s1", -89.99987, 40.5)]; // between the two
        let counts = assign_corridor_counts(&rail, &events, &[50.0], None);
        assert_eq!(counts.iter().map(|c| c.count).sum::<u64>(), 2);
    }
}
