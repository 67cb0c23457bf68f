//! SVG chart rendering for the exposure figures.
//!
//! Hand-rolled SVG, no chart crate: a bar chart of total mileage per
//! frequency bin with value and percentage labels above each bar, and a
//! pie chart of mileage by exposure category. Output files are plain
//! `.svg` text.

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use rail_hazard_analytics::{BinTotal, ExposureClass, ExposureSummary};

use crate::OutputError;

const PIE_COLORS: &[&str] = &["#add8e6", "#f08080", "#90ee90", "#ffd700", "#dda0dd"];

/// Escapes text for interpolation into SVG element content.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Renders a mileage-per-frequency-bin bar chart and writes it to `path`.
///
/// # Errors
///
/// Returns an error if the file write fails.
pub fn write_bar_chart(
    path: &Path,
    bins: &[BinTotal],
    title: &str,
    x_label: &str,
) -> Result<(), OutputError> {
    fs::write(path, render_bar_chart(bins, title, x_label))?;
    log::info!("Wrote bar chart to {}", path.display());
    Ok(())
}

/// Renders a mileage-share pie chart and writes it to `path`.
///
/// # Errors
///
/// Returns an error if the file write fails.
pub fn write_pie_chart(
    path: &Path,
    slices: &[(String, f64)],
    title: &str,
) -> Result<(), OutputError> {
    fs::write(path, render_pie_chart(slices, title))?;
    log::info!("Wrote pie chart to {}", path.display());
    Ok(())
}

/// Builds the bar chart SVG document.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn render_bar_chart(bins: &[BinTotal], title: &str, x_label: &str) -> String {
    let title = escape_xml(title);
    let x_label = escape_xml(x_label);
    let width = 960.0;
    let height = 640.0;
    let margin = 70.0;
    let chart_width = width - 2.0 * margin;
    let chart_height = height - 2.0 * margin;

    let total: f64 = bins.iter().map(|b| b.total_length).sum();
    let max = bins
        .iter()
        .map(|b| b.total_length)
        .fold(0.0f64, f64::max)
        .max(1.0);
    // Headroom above the tallest bar for its label.
    let scale = chart_height / (max * 1.075);

    let bar_slot = if bins.is_empty() {
        chart_width
    } else {
        chart_width / bins.len() as f64
    };

    let mut body = String::new();
    for (i, bin) in bins.iter().enumerate() {
        let bar_width = bar_slot * 0.8;
        let x = margin + i as f64 * bar_slot + bar_slot * 0.1;
        let bar_height = bin.total_length * scale;
        let y = margin + chart_height - bar_height;

        body.push_str(&format!(
            r##"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{bar_height:.1}" fill="#1f4e9c" stroke="black" stroke-width="1"/>"##,
        ));

        let percent = if total == 0.0 {
            0.0
        } else {
            bin.total_length / total * 100.0
        };
        let label_x = x + bar_width / 2.0;
        body.push_str(&format!(
            r##"<text x="{label_x:.1}" y="{:.1}" text-anchor="middle" font-size="12" fill="#111"><tspan x="{label_x:.1}">{:.0}</tspan><tspan x="{label_x:.1}" dy="14">({percent:.1}%)</tspan></text>"##,
            y - 34.0,
            bin.total_length,
        ));
        body.push_str(&format!(
            r##"<text x="{label_x:.1}" y="{:.1}" text-anchor="middle" font-size="12" fill="#444">{}</text>"##,
            height - margin + 22.0,
            escape_xml(&bin.label),
        ));
    }

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" style="background:white">
  <text x="{:.1}" y="28" text-anchor="middle" font-size="16" font-weight="600" fill="#111">{title}</text>
  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13" fill="#444">{x_label}</text>
  <text x="20" y="{:.1}" text-anchor="middle" font-size="13" fill="#444" transform="rotate(-90, 20, {:.1})">Sum of Length in Miles</text>
  <line x1="{margin}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#888" stroke-width="1.5"/>
  <line x1="{margin}" y1="{margin}" x2="{margin}" y2="{:.1}" stroke="#888" stroke-width="1.5"/>
  {body}
</svg>
"##,
        width / 2.0,
        width / 2.0,
        height - 14.0,
        height / 2.0,
        height / 2.0,
        height - margin,
        width - margin,
        height - margin,
        height - margin,
    )
}

/// Collapses three-way exposure shares into the two-category
/// "zero vs. at least one" split drawn by the published mileage pie.
#[must_use]
pub fn binary_exposure_slices(summary: &ExposureSummary) -> Vec<(String, f64)> {
    let mut none = 0.0;
    let mut some = 0.0;
    for share in &summary.shares {
        if share.class == ExposureClass::NoEvent {
            none += share.total_length;
        } else {
            some += share.total_length;
        }
    }
    vec![
        ("No Event".to_string(), none),
        ("At Least One Event".to_string(), some),
    ]
}

/// Builds the pie chart SVG document.
#[must_use]
pub fn render_pie_chart(slices: &[(String, f64)], title: &str) -> String {
    let title = escape_xml(title);
    let size = 560.0;
    let cx = size / 2.0;
    let cy = size / 2.0 + 10.0;
    let radius = size / 2.0 - 90.0;

    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    let mut body = String::new();

    if total > 0.0 {
        // Start at 12 o'clock and sweep clockwise.
        let mut angle = -PI / 2.0;
        for (i, (label, value)) in slices.iter().enumerate() {
            if *value <= 0.0 {
                continue;
            }
            let sweep = value / total * 2.0 * PI;
            let end = angle + sweep;
            let (x1, y1) = (cx + radius * angle.cos(), cy + radius * angle.sin());
            let (x2, y2) = (cx + radius * end.cos(), cy + radius * end.sin());
            let large = i32::from(sweep > PI);
            let color = PIE_COLORS[i % PIE_COLORS.len()];

            if (sweep - 2.0 * PI).abs() < 1e-9 {
                body.push_str(&format!(
                    r##"<circle cx="{cx:.1}" cy="{cy:.1}" r="{radius:.1}" fill="{color}" stroke="white" stroke-width="2"/>"##,
                ));
            } else {
                body.push_str(&format!(
                    r##"<path d="M {cx:.1} {cy:.1} L {x1:.1} {y1:.1} A {radius:.1} {radius:.1} 0 {large} 1 {x2:.1} {y2:.1} Z" fill="{color}" stroke="white" stroke-width="2"/>"##,
                ));
            }

            let mid = angle + sweep / 2.0;
            let (lx, ly) = (
                cx + (radius + 40.0) * mid.cos(),
                cy + (radius + 40.0) * mid.sin(),
            );
            body.push_str(&format!(
                r##"<text x="{lx:.1}" y="{ly:.1}" text-anchor="middle" font-size="13" fill="#111">{} ({:.1}%)</text>"##,
                escape_xml(label),
                value / total * 100.0,
            ));
            angle = end;
        }
    }

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" style="background:white">
  <text x="{:.1}" y="26" text-anchor="middle" font-size="16" font-weight="600" fill="#111">{title}</text>
  {body}
</svg>
"##,
        size / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(label: &str, length: f64) -> BinTotal {
        BinTotal {
            label: label.to_string(),
            lower: 0,
            upper: None,
            total_length: length,
        }
    }

    #[test]
    fn bar_chart_contains_every_bin_label() {
        let bins = vec![bin("0", 120.0), bin("1 - 10", 60.0), bin("11+", 0.0)];
        let svg = render_bar_chart(&bins, "Railway Length by Flood Frequency", "Flood Frequency");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("1 - 10"));
        assert!(svg.contains("11+"));
        assert!(svg.contains("Railway Length by Flood Frequency"));
    }

    #[test]
    fn bar_chart_percentages_sum_from_totals() {
        let bins = vec![bin("a", 75.0), bin("b", 25.0)];
        let svg = render_bar_chart(&bins, "t", "x");
        assert!(svg.contains("(75.0%)"));
        assert!(svg.contains("(25.0%)"));
    }

    #[test]
    fn pie_chart_renders_slices_and_skips_zeros() {
        let slices = vec![
            ("No Flood".to_string(), 90.0),
            ("At Least One Flood".to_string(), 10.0),
            ("Empty".to_string(), 0.0),
        ];
        let svg = render_pie_chart(&slices, "Mileage by Flood Exposure");
        assert!(svg.contains("No Flood (90.0%)"));
        assert!(svg.contains("At Least One Flood (10.0%)"));
        assert!(!svg.contains("Empty"));
    }

    #[test]
    fn binary_slices_merge_below_and_above_mean() {
        // Counts {0, 2, 6} over lengths {10, 10, 30}: 10 mi with nothing,
        // 40 mi with at least one event.
        let summary = rail_hazard_analytics::exposure_breakdown(&[
            (0, 10.0),
            (2, 10.0),
            (6, 30.0),
        ]);
        let slices = binary_exposure_slices(&summary);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0], ("No Event".to_string(), 10.0));
        assert_eq!(slices[1], ("At Least One Event".to_string(), 40.0));

        let svg = render_pie_chart(&slices, "Mileage by Event Occurrence");
        assert!(svg.contains("No Event (20.0%)"));
        assert!(svg.contains("At Least One Event (80.0%)"));
    }

    #[test]
    fn labels_are_escaped_for_svg() {
        let bins = vec![bin("<5 & up", 10.0)];
        let svg = render_bar_chart(&bins, "Heat & Buckling <2020>", "x");
        assert!(svg.contains("Heat &amp; Buckling &lt;2020&gt;"));
        assert!(svg.contains("&lt;5 &amp; up"));
        assert!(!svg.contains("<5 &"));

        let pie = render_pie_chart(&[("A&B".to_string(), 1.0)], "t");
        assert!(pie.contains("A&amp;B"));
    }

    #[test]
    fn single_slice_renders_full_circle() {
        let slices = vec![("All".to_string(), 42.0)];
        let svg = render_pie_chart(&slices, "t");
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn empty_inputs_still_produce_documents() {
        assert!(render_bar_chart(&[], "t", "x").starts_with("<svg"));
        assert!(render_pie_chart(&[], "t").starts_with("<svg"));
    }

    #[test]
    fn chart_files_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let bar = dir.path().join("bar.svg");
        let pie = dir.path().join("pie.svg");
        write_bar_chart(&bar, &[bin("0", 1.0)], "t", "x").unwrap();
        write_pie_chart(&pie, &[("a".to_string(), 1.0)], "t").unwrap();
        assert!(bar.exists() && pie.exists());
    }
}
