//! Shared parsing utilities for hazard catalog CSV exports.
//!
//! Coordinate and date parsing used by the generic ingestion path. The
//! source feeds use `(0, 0)` as a "no location" sentinel, so exact zeros
//! are rejected alongside missing and unparseable values.

use chrono::NaiveDate;
use rail_hazard_models::EventDate;

/// Parses a lat/lon pair from raw CSV fields. Returns `None` if either
/// field is missing, unparseable, or exactly zero.
#[must_use]
pub fn parse_lat_lon(lat: Option<&str>, lon: Option<&str>) -> Option<(f64, f64)> {
    let latitude = lat?.trim().parse::<f64>().ok()?;
    let longitude = lon?.trim().parse::<f64>().ok()?;
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    Some((latitude, longitude))
}

/// Parses an NCEI-layout date: a compact `YYYYMM` column plus an optional
/// separate day-of-month column.
#[must_use]
pub fn parse_yearmo_date(yearmo: Option<&str>, day: Option<&str>) -> Option<EventDate> {
    let base = EventDate::parse_compact(yearmo?)?;
    let Some(day_str) = day else {
        return Some(base);
    };
    let day_str = day_str.trim();
    if day_str.is_empty() {
        return Some(base);
    }
    // A malformed day column degrades to month resolution rather than
    // discarding the row.
    day_str.parse::<u32>().ok().map_or(Some(base), |d| {
        EventDate::new(base.year, base.month, Some(d)).or(Some(base))
    })
}

/// Parses a single ISO `YYYY-MM-DD` date column.
#[must_use]
pub fn parse_iso_date(s: &str) -> Option<EventDate> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?;
    use chrono::Datelike as _;
    EventDate::new(date.year(), date.month(), Some(date.day()))
}
