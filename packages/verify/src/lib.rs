#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident verification against hazard catalogs.
//!
//! Checks whether known railroad accidents (washouts, buckling derailments)
//! line up with a cataloged hazard: an accident is verified when some
//! hazard event's begin/end window contains the accident date AND both fall
//! inside the same spatial unit. Month-resolution hazard dates widen to the
//! whole month, so verification errs toward finding a candidate rather
//! than missing one.

use std::collections::BTreeMap;

use rail_hazard_models::{AccidentRecord, DateWindow, HazardEvent};
use rail_hazard_spatial::UnitIndex;
use serde::Serialize;

/// One verified (accident, hazard event) pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedMatch {
    pub accident_id: String,
    pub event_id: String,
    /// Episode of the matching event, when the catalog has episodes.
    pub episode_id: Option<String>,
    /// Unit containing both the accident and the event.
    pub unit_id: String,
}

/// Outcome of a verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// All (accident, event) pairs that verified. An accident with several
    /// candidate events appears once per event.
    pub matches: Vec<VerifiedMatch>,
    /// Accidents with at least one match.
    pub verified_accidents: usize,
    /// Accidents inside a unit but with no date-compatible event there.
    pub unverified_accidents: usize,
    /// Accidents falling outside every unit polygon.
    pub outside_units: usize,
}

/// Runs the verification pass.
///
/// Events without a parseable begin date can never verify anything and are
/// skipped up front.
#[must_use]
pub fn verify_accidents(
    accidents: &[AccidentRecord],
    events: &[HazardEvent],
    index: &UnitIndex,
) -> VerificationReport {
    // Bucket dated events by their containing unit once, instead of
    // re-locating them per accident.
    let mut events_by_unit: BTreeMap<String, Vec<(&HazardEvent, DateWindow)>> = BTreeMap::new();
    let mut undated = 0usize;
    for event in events {
        let Some(window) = DateWindow::from_events(event.begin, event.end) else {
            undated += 1;
            continue;
        };
        let Some(unit_id) = index.locate(event.location.x(), event.location.y()) else {
            continue;
        };
        events_by_unit
            .entry(unit_id.to_string())
            .or_default()
            .push((event, window));
    }
    if undated > 0 {
        log::warn!("{undated} events have no usable date and cannot verify accidents");
    }

    let mut report = VerificationReport::default();

    for accident in accidents {
        let Some(unit_id) = index.locate(accident.location.x(), accident.location.y()) else {
            report.outside_units += 1;
            continue;
        };

        let candidates = events_by_unit.get(unit_id);
        let mut matched = false;
        if let Some(candidates) = candidates {
            for (event, window) in candidates {
                if window.contains(accident.date) {
                    matched = true;
                    report.matches.push(VerifiedMatch {
                        accident_id: accident.accident_id.clone(),
                        event_id: event.event_id.clone(),
                        episode_id: event.episode_id.clone(),
                        unit_id: unit_id.to_string(),
                    });
                }
            }
        }

        if matched {
            report.verified_accidents += 1;
        } else {
            report.unverified_accidents += 1;
        }
    }

    log::info!(
        "Verification: {} accidents verified, {} unverified, {} outside all units \
         ({} event pairings)",
        report.verified_accidents,
        report.unverified_accidents,
        report.outside_units,
        report.matches.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use geo::{MultiPolygon, Point, polygon};
    use rail_hazard_models::{EventDate, HazardKind, SpatialUnit};

    fn unit(id: &str, min_x: f64) -> SpatialUnit {
        SpatialUnit {
            unit_id: id.to_string(),
            name: None,
            boundary: MultiPolygon(vec![polygon![
                (x: min_x, y: 0.0),
                (x: min_x + 1.0, y: 0.0),
                (x: min_x + 1.0, y: 1.0),
                (x: min_x, y: 1.0),
                (x: min_x, y: 0.0),
            ]]),
        }
    }

    fn event(id: &str, lon: f64, begin: &str, end: Option<&str>) -> HazardEvent {
        HazardEvent {
            event_id: id.to_string(),
            episode_id: None,
            kind: HazardKind::FlashFlood,
            location: Point::new(lon, 0.5),
            begin: EventDate::parse_compact(begin),
            end: end.and_then(EventDate::parse_compact),
            narrative: None,
        }
    }

    fn accident(id: &str, lon: f64, date: (i32, u32, u32)) -> AccidentRecord {
        AccidentRecord {
            accident_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            location: Point::new(lon, 0.5),
            cause_code: None,
            narrative: None,
        }
    }

    #[test]
    fn verifies_same_unit_and_date() {
        let index = UnitIndex::build(&[unit("A", 0.0), unit("B", 2.0)]);
        let events = vec![event("e1", 0.5, "20210610", Some("20210612"))];
        let accidents = vec![accident("x1", 0.4, (2021, 6, 11))];

        let report = verify_accidents(&accidents, &events, &index);
        assert_eq!(report.verified_accidents, 1);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].unit_id, "A");
    }

    #[test]
    fn rejects_date_outside_window() {
        let index = UnitIndex::build(&[unit("A", 0.0)]);
        let events = vec![event("e1", 0.5, "20210610", Some("20210612"))];
        let accidents = vec![accident("x1", 0.4, (2021, 6, 20))];

        let report = verify_accidents(&accidents, &events, &index);
        assert_eq!(report.verified_accidents, 0);
        assert_eq!(report.unverified_accidents, 1);
    }

    #[test]
    fn rejects_different_unit_even_with_matching_date() {
        let index = UnitIndex::build(&[unit("A", 0.0), unit("B", 2.0)]);
        let events = vec![event("e1", 2.5, "20210610", Some("20210612"))];
        let accidents = vec![accident("x1", 0.4, (2021, 6, 11))];

        let report = verify_accidents(&accidents, &events, &index);
        assert_eq!(report.verified_accidents, 0);
        assert_eq!(report.unverified_accidents, 1);
    }

    #[test]
    fn month_resolution_window_covers_whole_month() {
        let index = UnitIndex::build(&[unit("A", 0.0)]);
        let events = vec![event("e1", 0.5, "202106", None)];
        let accidents = vec![accident("x1", 0.4, (2021, 6, 29))];

        let report = verify_accidents(&accidents, &events, &index);
        assert_eq!(report.verified_accidents, 1);
    }

    #[test]
    fn accident_outside_all_units_is_tallied() {
        let index = UnitIndex::build(&[unit("A", 0.0)]);
        let accidents = vec![accident("x1", 50.0, (2021, 6, 11))];
        let report = verify_accidents(&accidents, &[], &index);
        assert_eq!(report.outside_units, 1);
    }

    #[test]
    fn multiple_candidate_events_all_recorded() {
        let index = UnitIndex::build(&[unit("A", 0.0)]);
        let events = vec![
            event("e1", 0.5, "20210610", Some("20210612")),
            event("e2", 0.6, "20210611", Some("20210613")),
        ];
        let accidents = vec![accident("x1", 0.4, (2021, 6, 11))];

        let report = verify_accidents(&accidents, &events, &index);
        assert_eq!(report.verified_accidents, 1);
        assert_eq!(report.matches.len(), 2);
    }
}
