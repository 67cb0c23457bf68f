#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index for hazard-to-unit attribution.
//!
//! Builds an R-tree over spatial-unit polygons (HUC watersheds, NWS
//! forecast zones) and attributes hazard event points to their containing
//! unit with a point-in-polygon test. Attribution deduplicates
//! (unit, episode) pairs before counting, because one storm episode can
//! generate several point records inside the same unit.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use geo::{Contains, MultiPolygon, Point};
use rail_hazard_dataset::progress::ProgressCallback;
use rail_hazard_models::{HazardEvent, SpatialUnit, UnitAttribution};
use rstar::{AABB, RTree, RTreeObject};

/// A unit polygon stored in the R-tree with its identifier.
struct UnitEntry {
    unit_id: String,
    envelope: AABB<[f64; 2]>,
    boundary: MultiPolygon<f64>,
}

impl RTreeObject for UnitEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over one unit layer.
///
/// Constructed once per run and queried for every event point.
pub struct UnitIndex {
    tree: RTree<UnitEntry>,
    /// All unit ids in layer order, so attribution can zero-fill units
    /// that no event falls inside.
    unit_ids: Vec<String>,
}

impl UnitIndex {
    /// Builds the R-tree from a loaded unit layer.
    #[must_use]
    pub fn build(units: &[SpatialUnit]) -> Self {
        let entries: Vec<UnitEntry> = units
            .iter()
            .map(|unit| UnitEntry {
                unit_id: unit.unit_id.clone(),
                envelope: compute_envelope(&unit.boundary),
                boundary: unit.boundary.clone(),
            })
            .collect();
        let unit_ids = units.iter().map(|u| u.unit_id.clone()).collect();

        let index = Self {
            tree: RTree::bulk_load(entries),
            unit_ids,
        };
        log::info!("Built spatial index over {} units", index.tree.size());
        index
    }

    /// Number of units in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Looks up the unit containing a point.
    ///
    /// A point exactly on a shared boundary may test as contained by more
    /// than one candidate; whichever candidate the envelope query yields
    /// first wins. The source layers tile without overlap, so this only
    /// affects exact-boundary points and is a documented ambiguity.
    #[must_use]
    pub fn locate(&self, lon: f64, lat: f64) -> Option<&str> {
        let point = Point::new(lon, lat);
        let query_env = AABB::from_point([lon, lat]);

        for entry in self.tree.locate_in_envelope_intersecting(&query_env) {
            if entry.boundary.contains(&point) {
                return Some(&entry.unit_id);
            }
        }
        None
    }

    /// Attributes events to their containing units.
    ///
    /// Returns an entry for EVERY unit in the layer: units with no
    /// intersecting events carry a zero count and empty id lists. Events
    /// falling outside all units are dropped and counted in the log
    /// summary. Duplicate (unit, episode) pairs contribute once.
    #[must_use]
    pub fn attribute(
        &self,
        events: &[HazardEvent],
        progress: Option<&Arc<dyn ProgressCallback>>,
    ) -> BTreeMap<String, UnitAttribution> {
        if let Some(p) = progress {
            p.set_total(events.len() as u64);
        }

        let mut attributions: BTreeMap<String, UnitAttribution> = self
            .unit_ids
            .iter()
            .map(|id| (id.clone(), UnitAttribution::default()))
            .collect();

        let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
        let mut outside = 0usize;
        let mut duplicates = 0usize;

        for event in events {
            if let Some(p) = progress {
                p.inc(1);
            }
            let Some(unit_id) = self.locate(event.location.x(), event.location.y()) else {
                outside += 1;
                continue;
            };

            let key = (unit_id.to_string(), event.dedup_key().to_string());
            if !seen.insert(key) {
                duplicates += 1;
                continue;
            }

            // The entry exists by construction; `locate` only returns ids
            // drawn from `unit_ids`.
            if let Some(attribution) = attributions.get_mut(unit_id) {
                attribution.count += 1;
                attribution.event_ids.push(event.event_id.clone());
                if let Some(episode_id) = &event.episode_id {
                    attribution.episode_ids.push(episode_id.clone());
                }
            }
        }

        let attributed = events.len() - outside - duplicates;
        log::info!(
            "Attributed {attributed} of {} events ({outside} outside all units, \
             {duplicates} duplicate episode records)",
            events.len()
        );
        if let Some(p) = progress {
            p.finish(format!("Attributed {attributed} events"));
        }

        attributions
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
