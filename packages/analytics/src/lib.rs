#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Length-weighted exposure statistics over attributed rail segments.
//!
//! The published figures answer "what fraction of track miles sees heavy
//! exposure", not "what is the average zone's exposure" — so the mean that
//! splits the map legend is weighted by segment length, never a plain
//! arithmetic mean of counts.

use rail_hazard_models::AttributedSegment;
use serde::Serialize;

/// `(event count, length in miles)` pairs are the only inputs the
/// statistics need.
pub type CountLength = (u64, f64);

/// Extracts `(count, miles)` pairs from attributed segments.
#[must_use]
pub fn segment_pairs(segments: &[AttributedSegment]) -> Vec<CountLength> {
    segments
        .iter()
        .map(|s| (s.count, s.length.miles))
        .collect()
}

/// Total length per right-open frequency bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinTotal {
    /// Chart label, `"lower - upper"` (or `"lower+"` for the last,
    /// unbounded bin).
    pub label: String,
    /// Inclusive lower frequency edge.
    pub lower: u64,
    /// Exclusive upper frequency edge; `None` for the unbounded tail.
    pub upper: Option<u64>,
    /// Summed segment length in miles.
    pub total_length: f64,
}

/// Sums segment length per half-open frequency bin `[edge_i, edge_i+1)`.
///
/// Every bin appears in the output, zero-filled when empty, so charts
/// render all categories. Counts below the first edge or at/above the last
/// edge are ignored (callers append an unbounded tail by passing
/// `unbounded_tail = true`).
#[must_use]
pub fn bucketize(pairs: &[CountLength], edges: &[u64], unbounded_tail: bool) -> Vec<BinTotal> {
    let mut bins: Vec<BinTotal> = edges
        .windows(2)
        .map(|w| BinTotal {
            label: bin_label(w[0], Some(w[1])),
            lower: w[0],
            upper: Some(w[1]),
            total_length: 0.0,
        })
        .collect();
    if unbounded_tail {
        if let Some(&last) = edges.last() {
            bins.push(BinTotal {
                label: bin_label(last, None),
                lower: last,
                upper: None,
                total_length: 0.0,
            });
        }
    }

    for &(count, length) in pairs {
        for bin in &mut bins {
            let in_bin = count >= bin.lower && bin.upper.is_none_or(|u| count < u);
            if in_bin {
                bin.total_length += length;
                break;
            }
        }
    }
    bins
}

fn bin_label(lower: u64, upper: Option<u64>) -> String {
    match upper {
        Some(u) if u == lower + 1 => lower.to_string(),
        Some(u) => format!("{lower} - {}", u - 1),
        None => format!("{lower}+"),
    }
}

/// Length-weighted mean frequency: sum(length x count) / sum(length).
///
/// Returns 0.0 for an empty or zero-length input so downstream legends
/// still render.
#[must_use]
pub fn weighted_mean_frequency(pairs: &[CountLength]) -> f64 {
    let total_length: f64 = pairs.iter().map(|&(_, l)| l).sum();
    if total_length == 0.0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let weighted: f64 = pairs.iter().map(|&(c, l)| l * c as f64).sum();
    weighted / total_length
}

/// Three-way exposure legend class for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureClass {
    /// No intersecting events.
    NoEvent,
    /// At least one event, at or below the length-weighted mean.
    BelowMean,
    /// Above the length-weighted mean.
    AboveMean,
}

/// Mileage share of one exposure class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureShare {
    pub class: ExposureClass,
    pub total_length: f64,
    /// Share of the total mileage, 0-100.
    pub percent: f64,
}

/// Exposure breakdown used by the three-way map legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureSummary {
    pub weighted_mean: f64,
    pub shares: Vec<ExposureShare>,
}

/// Classifies a count against the weighted mean.
#[must_use]
pub fn classify(count: u64, weighted_mean: f64) -> ExposureClass {
    #[allow(clippy::cast_precision_loss)]
    let count = count as f64;
    if count == 0.0 {
        ExposureClass::NoEvent
    } else if count <= weighted_mean {
        ExposureClass::BelowMean
    } else {
        ExposureClass::AboveMean
    }
}

/// Splits total mileage across the three exposure classes.
///
/// Every class is present in the output, zero-filled when empty.
#[must_use]
pub fn exposure_breakdown(pairs: &[CountLength]) -> ExposureSummary {
    let weighted_mean = weighted_mean_frequency(pairs);
    let total: f64 = pairs.iter().map(|&(_, l)| l).sum();

    let mut lengths = [0.0f64; 3];
    for &(count, length) in pairs {
        let idx = match classify(count, weighted_mean) {
            ExposureClass::NoEvent => 0,
            ExposureClass::BelowMean => 1,
            ExposureClass::AboveMean => 2,
        };
        lengths[idx] += length;
    }

    let classes = [
        ExposureClass::NoEvent,
        ExposureClass::BelowMean,
        ExposureClass::AboveMean,
    ];
    let shares = classes
        .iter()
        .zip(lengths)
        .map(|(&class, total_length)| ExposureShare {
            class,
            total_length,
            percent: if total == 0.0 {
                0.0
            } else {
                total_length / total * 100.0
            },
        })
        .collect();

    ExposureSummary {
        weighted_mean,
        shares,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_mean_is_length_weighted() {
        // Two units, lengths {10, 30} miles, counts {2, 6}:
        // (10*2 + 30*6) / 40 = 5.0, not the unweighted 4.0.
        let pairs = vec![(2, 10.0), (6, 30.0)];
        let mean = weighted_mean_frequency(&pairs);
        assert!((mean - 5.0).abs() < 1e-12);
    }

    #[test]
    fn weighted_mean_of_empty_input_is_zero() {
        assert_eq!(weighted_mean_frequency(&[]), 0.0);
        assert_eq!(weighted_mean_frequency(&[(3, 0.0)]), 0.0);
    }

    #[test]
    fn bucketize_is_right_open() {
        let pairs = vec![(0, 5.0), (9, 7.0), (10, 11.0), (25, 2.0)];
        let bins = bucketize(&pairs, &[0, 1, 10, 20], true);
        assert_eq!(bins.len(), 4);
        assert!((bins[0].total_length - 5.0).abs() < 1e-12); // [0,1)
        assert!((bins[1].total_length - 7.0).abs() < 1e-12); // [1,10)
        assert!((bins[2].total_length - 11.0).abs() < 1e-12); // [10,20)
        assert!((bins[3].total_length - 2.0).abs() < 1e-12); // 20+
    }

    #[test]
    fn empty_bins_are_present_with_zero() {
        let bins = bucketize(&[], &[0, 1, 10], false);
        assert_eq!(bins.len(), 2);
        assert!(bins.iter().all(|b| b.total_length == 0.0));
    }

    #[test]
    fn single_count_bins_use_bare_labels() {
        let bins = bucketize(&[], &[1, 2, 3, 11], true);
        assert_eq!(bins[0].label, "1");
        assert_eq!(bins[1].label, "2");
        assert_eq!(bins[2].label, "3 - 10");
        assert_eq!(bins[3].label, "11+");
    }

    #[test]
    fn exposure_classes_split_at_weighted_mean() {
        let pairs = vec![(0, 10.0), (2, 10.0), (6, 30.0), (9, 0.0)];
        // weighted mean over all four: (0+20+180+0)/50 = 4.0
        let summary = exposure_breakdown(&pairs);
        assert!((summary.weighted_mean - 4.0).abs() < 1e-12);
        assert_eq!(summary.shares.len(), 3);
        assert!((summary.shares[0].total_length - 10.0).abs() < 1e-12);
        assert!((summary.shares[1].total_length - 10.0).abs() < 1e-12);
        assert!((summary.shares[2].total_length - 30.0).abs() < 1e-12);
        let pct: f64 = summary.shares.iter().map(|s| s.percent).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn classify_boundary_cases() {
        assert_eq!(classify(0, 4.0), ExposureClass::NoEvent);
        assert_eq!(classify(4, 4.0), ExposureClass::BelowMean);
        assert_eq!(classify(5, 4.0), ExposureClass::AboveMean);
    }
}
