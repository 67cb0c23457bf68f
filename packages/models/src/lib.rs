#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Typed records shared across the rail hazard attribution pipeline.
//!
//! Every dataset row that survives ingestion is represented by one of the
//! record types here; downstream crates never touch raw columns by string
//! name. Length conversions use the fixed constants the published figures
//! were produced with.

pub mod date;

use geo::{MultiLineString, MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use date::{DateWindow, EventDate};

/// Meters-to-miles conversion used for every reported length.
pub const METERS_TO_MILES: f64 = 0.000_621_371;

/// Meters-to-feet conversion used for every reported length.
pub const METERS_TO_FEET: f64 = 3.280_84;

/// Hazard catalog category.
///
/// Each variant corresponds to one dataset definition in the registry; the
/// attribution pipeline itself is identical across all of them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HazardKind {
    /// NCEI flash flood events.
    FlashFlood,
    /// NCEI riverine ("Flood") events.
    RiverineFlood,
    /// NCEI heat events.
    Heat,
    /// NCEI excessive heat events.
    ExcessiveHeat,
    /// USGS landslide inventory points.
    Landslide,
    /// FRA track-buckling (sun kink) accident records.
    TrackBuckling,
}

/// Coordinate reference system tag carried by every loaded layer.
///
/// The pipeline does not reproject; it only checks that the layers it joins
/// are all geographic (lon/lat degrees). NAD83 and WGS84 differ by less than
/// the positional accuracy of the source feeds and are treated as
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs(pub String);

impl Crs {
    /// NAD83 geographic, the CRS of the WBD and rail network layers.
    #[must_use]
    pub fn nad83() -> Self {
        Self("EPSG:4269".to_string())
    }

    /// WGS84 geographic, the CRS assumed for NCEI coordinate columns.
    #[must_use]
    pub fn wgs84() -> Self {
        Self("EPSG:4326".to_string())
    }

    /// Whether this tag names a geographic (degree-unit) CRS the pipeline
    /// can consume without reprojection.
    #[must_use]
    pub fn is_geographic(&self) -> bool {
        matches!(
            self.0.to_ascii_uppercase().as_str(),
            "EPSG:4326" | "EPSG:4269" | "OGC:CRS84" | "CRS84" | "EPSG:4267"
        )
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single hazard event point that survived ingestion filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardEvent {
    /// Point-level identifier (NCEI `EVENT_ID`, USGS `OBJECTID`, ...).
    pub event_id: String,
    /// Episode identifier grouping multiple points into one logical event.
    /// `None` for catalogs without an episode concept (landslides).
    pub episode_id: Option<String>,
    /// Catalog this event came from.
    pub kind: HazardKind,
    /// Event location, lon/lat degrees.
    pub location: Point<f64>,
    /// Begin date, possibly month-resolution.
    pub begin: Option<EventDate>,
    /// End date; missing end dates fall back to `begin` downstream.
    pub end: Option<EventDate>,
    /// Free-text narrative, kept for keyword classification.
    pub narrative: Option<String>,
}

impl HazardEvent {
    /// The identifier deduplication groups by: the episode id when the
    /// catalog has one, otherwise the event id itself.
    #[must_use]
    pub fn dedup_key(&self) -> &str {
        self.episode_id.as_deref().unwrap_or(&self.event_id)
    }
}

/// A polygon unit that hazard events are attributed to (HUC watershed, NWS
/// forecast zone, state, climate division).
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialUnit {
    /// Unique region identifier (`HUC12`, `ZONE`, ...).
    pub unit_id: String,
    /// Human-readable name when the layer carries one.
    pub name: Option<String>,
    /// Unit geometry, lon/lat degrees.
    pub boundary: MultiPolygon<f64>,
}

/// One line feature of the rail network layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RailLine {
    /// Feature identifier when the layer carries one.
    pub line_id: Option<String>,
    /// Line geometry, lon/lat degrees.
    pub path: MultiLineString<f64>,
}

/// Per-unit attribution result: how many distinct hazard events intersect
/// the unit and which ones they are.
///
/// Every unit in the reference layer gets an entry, so a unit nothing
/// intersects carries an explicit zero, never an absent key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAttribution {
    /// Count of distinct events after (unit, episode) deduplication.
    pub count: u64,
    /// Point-level event ids of the deduplicated records, in input order.
    pub event_ids: Vec<String>,
    /// Episode ids of the deduplicated records, in input order. Empty for
    /// catalogs without episodes.
    pub episode_ids: Vec<String>,
}

/// Geodesic length of a rail segment in the three units the outputs report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentLength {
    pub meters: f64,
    pub feet: f64,
    pub miles: f64,
}

impl SegmentLength {
    /// Derives feet and miles from a geodesic length in meters.
    #[must_use]
    pub fn from_meters(meters: f64) -> Self {
        Self {
            meters,
            feet: meters * METERS_TO_FEET,
            miles: meters * METERS_TO_MILES,
        }
    }
}

/// A rail sub-segment produced by splitting the network at unit boundaries,
/// carrying the attribution of the unit it fell inside.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedSegment {
    /// Identifier of the source rail line feature, when present.
    pub line_id: Option<String>,
    /// Unit this sub-segment lies within.
    pub unit_id: String,
    /// Distinct-event count copied from the unit.
    pub count: u64,
    /// Event id list copied from the unit.
    pub event_ids: Vec<String>,
    /// Episode id list copied from the unit.
    pub episode_ids: Vec<String>,
    /// Clipped geometry, lon/lat degrees.
    pub path: MultiLineString<f64>,
    /// Geodesic length of the clipped geometry.
    pub length: SegmentLength,
}

/// A railroad accident record used by the verification pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AccidentRecord {
    /// Report identifier.
    pub accident_id: String,
    /// Date the accident occurred.
    pub date: chrono::NaiveDate,
    /// Accident location, lon/lat degrees.
    pub location: Point<f64>,
    /// Cause code (`T002`, `T109`, ...), when present.
    pub cause_code: Option<String>,
    /// Free-text narrative, when present.
    pub narrative: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hazard_kind_round_trips_through_strings() {
        use std::str::FromStr as _;

        for kind in [
            HazardKind::FlashFlood,
            HazardKind::RiverineFlood,
            HazardKind::Heat,
            HazardKind::ExcessiveHeat,
            HazardKind::Landslide,
            HazardKind::TrackBuckling,
        ] {
            let s = kind.to_string();
            assert_eq!(HazardKind::from_str(&s).unwrap(), kind);
        }
    }

    #[test]
    fn crs_geographic_detection() {
        assert!(Crs::nad83().is_geographic());
        assert!(Crs::wgs84().is_geographic());
        assert!(Crs("epsg:4326".into()).is_geographic());
        assert!(!Crs("EPSG:5070".into()).is_geographic());
        assert!(!Crs("EPSG:2163".into()).is_geographic());
    }

    #[test]
    fn segment_length_conversions() {
        let len = SegmentLength::from_meters(1609.344);
        assert!((len.miles - 1.0).abs() < 1e-3);
        assert!((len.feet - 5280.0).abs() < 1.0);
    }

    #[test]
    fn dedup_key_prefers_episode() {
        let mut event = HazardEvent {
            event_id: "e1".into(),
            episode_id: Some("ep9".into()),
            kind: HazardKind::FlashFlood,
            location: Point::new(-89.0, 40.0),
            begin: None,
            end: None,
            narrative: None,
        };
        assert_eq!(event.dedup_key(), "ep9");
        event.episode_id = None;
        assert_eq!(event.dedup_key(), "e1");
    }
}
