//! FRA accident record loading for the verification pass.
//!
//! Accident exports carry either explicit `Latitude`/`Longitude` columns or
//! a WKT `Location` column (`POINT (lon lat)`), and either a single ISO
//! `Date` column or separate `Year`/`Accident Month`/`Day` columns. The
//! loader accepts both layouts.

use std::path::Path;

use chrono::NaiveDate;
use geo::Point;
use rail_hazard_dataset::parsing::parse_lat_lon;
use rail_hazard_models::AccidentRecord;

use crate::IngestError;

/// Column names for an accident CSV export.
#[derive(Debug, Clone)]
pub struct AccidentLayout {
    pub id: String,
    pub latitude: String,
    pub longitude: String,
    /// WKT point column used when the lat/lon columns are absent.
    pub location_wkt: String,
    pub date: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub cause_code: String,
    pub narrative: String,
}

impl Default for AccidentLayout {
    fn default() -> Self {
        Self {
            id: "ACCIDENT_NO".to_string(),
            latitude: "Latitude".to_string(),
            longitude: "Longitude".to_string(),
            location_wkt: "Location".to_string(),
            date: "Date".to_string(),
            year: "Year".to_string(),
            month: "Accident Month".to_string(),
            day: "Day".to_string(),
            cause_code: "Cause".to_string(),
            narrative: "Narrative".to_string(),
        }
    }
}

/// Exclusion tally for an accident load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccidentLoadReport {
    pub kept: usize,
    pub missing_coordinates: usize,
    pub missing_date: usize,
    pub missing_id: usize,
}

/// Loads accident records, excluding rows without a usable location and
/// date (both are required to verify anything).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed at the CSV level.
pub fn load_accidents(
    path: &Path,
    layout: &AccidentLayout,
) -> Result<(Vec<AccidentRecord>, AccidentLoadReport), IngestError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);

    let id_idx = col(&layout.id);
    let lat_idx = col(&layout.latitude);
    let lon_idx = col(&layout.longitude);
    let wkt_idx = col(&layout.location_wkt);
    let date_idx = col(&layout.date);
    let year_idx = col(&layout.year);
    let month_idx = col(&layout.month);
    let day_idx = col(&layout.day);
    let cause_idx = col(&layout.cause_code);
    let narrative_idx = col(&layout.narrative);

    let mut records = Vec::new();
    let mut report = AccidentLoadReport::default();

    for record in reader.records() {
        let record = record?;
        let field = |idx: Option<usize>| -> Option<&str> {
            let value = record.get(idx?)?.trim();
            (!value.is_empty()).then_some(value)
        };

        let Some(accident_id) = field(id_idx) else {
            report.missing_id += 1;
            continue;
        };

        let coords = parse_lat_lon(field(lat_idx), field(lon_idx))
            .map(|(lat, lon)| (lon, lat))
            .or_else(|| field(wkt_idx).and_then(parse_wkt_point));
        let Some((lon, lat)) = coords else {
            report.missing_coordinates += 1;
            continue;
        };

        let date = field(date_idx)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .or_else(|| {
                let year = field(year_idx)?.parse().ok()?;
                let month = field(month_idx)?.parse().ok()?;
                let day = field(day_idx)?.parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
            });
        let Some(date) = date else {
            report.missing_date += 1;
            continue;
        };

        records.push(AccidentRecord {
            accident_id: accident_id.to_string(),
            date,
            location: Point::new(lon, lat),
            cause_code: field(cause_idx).map(str::to_string),
            narrative: field(narrative_idx).map(str::to_string),
        });
        report.kept += 1;
    }

    log::info!(
        "Loaded {} accident records from {} ({} missing coords, {} missing dates)",
        report.kept,
        path.display(),
        report.missing_coordinates,
        report.missing_date,
    );
    Ok((records, report))
}

/// Parses a WKT point of the form `POINT (lon lat)`.
fn parse_wkt_point(wkt: &str) -> Option<(f64, f64)> {
    let inner = wkt
        .trim()
        .strip_prefix("POINT")?
        .trim()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    let lon = parts.next()?.parse::<f64>().ok()?;
    let lat = parts.next()?.parse::<f64>().ok()?;
    if lon == 0.0 || lat == 0.0 {
        return None;
    }
    Some((lon, lat))
}
