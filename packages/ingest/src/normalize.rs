//! Defensive geometry normalization.
//!
//! The WBD and forecast-zone exports occasionally carry degenerate rings
//! (collapsed slivers, under-specified rings) that break containment and
//! overlay predicates. Normalization drops those rings and rewinds the
//! survivors to canonical orientation before any join runs.

use geo::orient::{Direction, Orient};
use geo::{Area, MultiLineString, MultiPolygon, Polygon};

/// Minimum absolute ring area (square degrees) below which a polygon is
/// treated as a collapsed sliver.
const MIN_RING_AREA: f64 = 1e-12;

/// Drops degenerate members of a multipolygon and normalizes winding.
///
/// Returns `None` when nothing usable remains.
#[must_use]
pub fn clean_multipolygon(mp: MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    let kept: Vec<Polygon<f64>> = mp
        .0
        .into_iter()
        .filter(|p| p.exterior().0.len() >= 4 && p.unsigned_area() > MIN_RING_AREA)
        .collect();

    if kept.is_empty() {
        return None;
    }
    Some(MultiPolygon(kept).orient(Direction::Default))
}

/// Drops empty and single-point members of a multilinestring.
///
/// Returns `None` when nothing usable remains.
#[must_use]
pub fn clean_multilinestring(mls: MultiLineString<f64>) -> Option<MultiLineString<f64>> {
    let kept: Vec<_> = mls.0.into_iter().filter(|ls| ls.0.len() >= 2).collect();
    if kept.is_empty() {
        return None;
    }
    Some(MultiLineString(kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon};

    #[test]
    fn keeps_valid_polygons() {
        let mp = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]]);
        let cleaned = clean_multipolygon(mp).unwrap();
        assert_eq!(cleaned.0.len(), 1);
    }

    #[test]
    fn drops_collapsed_slivers() {
        // Zero-area "polygon": all points collinear.
        let sliver = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 0.0),
        ];
        assert!(clean_multipolygon(MultiPolygon(vec![sliver])).is_none());
    }

    #[test]
    fn drops_degenerate_members_but_keeps_rest() {
        let good = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let bad = polygon![(x: 5.0, y: 5.0), (x: 5.0, y: 5.0), (x: 5.0, y: 5.0), (x: 5.0, y: 5.0)];
        let cleaned = clean_multipolygon(MultiPolygon(vec![good, bad])).unwrap();
        assert_eq!(cleaned.0.len(), 1);
    }

    #[test]
    fn drops_single_point_linestrings() {
        let mls = MultiLineString(vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)],
            line_string![(x: 2.0, y: 2.0)],
        ]);
        let cleaned = clean_multilinestring(mls).unwrap();
        assert_eq!(cleaned.0.len(), 1);
    }
}
