//! Hazard event CSV loading.
//!
//! One generic loader handles every catalog; the dataset definition supplies
//! the column names. Excluded rows never abort the load — they are counted
//! by reason in the [`LoadReport`] so the data loss stays auditable.

use std::collections::BTreeMap;
use std::path::Path;

use geo::Point;
use rail_hazard_dataset::definition::{DatasetDefinition, FieldMapping};
use rail_hazard_dataset::keywords::KeywordMatcher;
use rail_hazard_dataset::parsing::{parse_iso_date, parse_lat_lon, parse_yearmo_date};
use rail_hazard_models::{EventDate, HazardEvent};

use crate::IngestError;

/// Per-reason tally of rows excluded during a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows that became events.
    pub kept: usize,
    /// Rows with an empty or missing coordinate field.
    pub missing_coordinates: usize,
    /// Rows carrying the `(0, 0)` "no location" sentinel.
    pub zero_coordinates: usize,
    /// Rows whose coordinate fields did not parse as floats.
    pub unparseable_coordinates: usize,
    /// Rows with an empty identifier.
    pub missing_id: usize,
    /// Rows excluded by the dataset's narrative keyword filter.
    pub filtered_by_keywords: usize,
    /// Kept rows whose date fields did not parse (the event is kept with
    /// no date; only verification needs dates).
    pub undated: usize,
}

impl LoadReport {
    /// Total rows read from the file.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.kept
            + self.missing_coordinates
            + self.zero_coordinates
            + self.unparseable_coordinates
            + self.missing_id
            + self.filtered_by_keywords
    }
}

/// Header-name to column-index lookup for a CSV file.
struct HeaderMap {
    index: BTreeMap<String, usize>,
}

impl HeaderMap {
    fn new(headers: &csv::StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { index }
    }

    /// Returns the trimmed field value, or `None` when the column is absent
    /// or the field is empty.
    fn get<'r>(&self, record: &'r csv::StringRecord, column: &str) -> Option<&'r str> {
        let value = record.get(*self.index.get(column)?)?.trim();
        (!value.is_empty()).then_some(value)
    }

    fn require(&self, column: &str) -> Result<(), IngestError> {
        if self.index.contains_key(column) {
            Ok(())
        } else {
            Err(IngestError::MissingColumn {
                column: column.to_string(),
            })
        }
    }
}

/// Loads hazard events from a catalog CSV export.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing from the header, or the keyword filter fails to compile.
/// Row-level problems exclude the row and are tallied instead.
pub fn load_events(
    path: &Path,
    dataset: &DatasetDefinition,
) -> Result<(Vec<HazardEvent>, LoadReport), IngestError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = HeaderMap::new(reader.headers()?);

    headers.require(&dataset.fields.event_id)?;
    headers.require(&dataset.fields.latitude)?;
    headers.require(&dataset.fields.longitude)?;

    let matcher = dataset
        .filter
        .as_ref()
        .map(|f| KeywordMatcher::new(&f.narrative_keywords))
        .transpose()?;

    let mut events = Vec::new();
    let mut report = LoadReport::default();

    for record in reader.records() {
        let record = record?;

        let Some(event_id) = headers.get(&record, &dataset.fields.event_id) else {
            report.missing_id += 1;
            continue;
        };

        let narrative = dataset
            .fields
            .narrative
            .as_deref()
            .and_then(|col| headers.get(&record, col))
            .map(str::to_string);

        if let Some(matcher) = &matcher {
            let matched = narrative.as_deref().is_some_and(|n| matcher.matches(n));
            if !matched {
                report.filtered_by_keywords += 1;
                continue;
            }
        }

        let lat_raw = headers.get(&record, &dataset.fields.latitude);
        let lon_raw = headers.get(&record, &dataset.fields.longitude);
        if lat_raw.is_none() || lon_raw.is_none() {
            report.missing_coordinates += 1;
            continue;
        }
        let Some((lat, lon)) = parse_lat_lon(lat_raw, lon_raw) else {
            // Distinguish the zero sentinel from junk text for the report.
            let parsed = lat_raw
                .and_then(|v| v.parse::<f64>().ok())
                .zip(lon_raw.and_then(|v| v.parse::<f64>().ok()));
            if parsed.is_some() {
                report.zero_coordinates += 1;
            } else {
                report.unparseable_coordinates += 1;
            }
            continue;
        };

        let (begin, end) = parse_dates(&headers, &record, &dataset.fields);
        if begin.is_none() {
            report.undated += 1;
        }

        events.push(HazardEvent {
            event_id: event_id.to_string(),
            episode_id: dataset
                .fields
                .episode_id
                .as_deref()
                .and_then(|col| headers.get(&record, col))
                .map(str::to_string),
            kind: dataset.kind,
            location: Point::new(lon, lat),
            begin,
            end,
            narrative,
        });
        report.kept += 1;
    }

    if let Some(matcher) = &matcher {
        let narratives = events.iter().filter_map(|e| e.narrative.as_deref());
        for (keyword, count) in matcher.keyword_counts(narratives) {
            log::info!("Keyword {keyword:?} matched {count} kept narratives");
        }
    }

    log::info!(
        "Loaded {} of {} rows from {} ({} missing coords, {} zero coords, \
         {} unparseable coords, {} missing ids, {} filtered by keywords)",
        report.kept,
        report.total(),
        path.display(),
        report.missing_coordinates,
        report.zero_coordinates,
        report.unparseable_coordinates,
        report.missing_id,
        report.filtered_by_keywords,
    );

    Ok((events, report))
}

fn parse_dates(
    headers: &HeaderMap,
    record: &csv::StringRecord,
    fields: &FieldMapping,
) -> (Option<EventDate>, Option<EventDate>) {
    // Single ISO date column layout.
    if let Some(col) = &fields.date {
        let date = headers.get(record, col).and_then(parse_iso_date);
        return (date, date);
    }

    // NCEI compact yearmo + day layout.
    let begin = parse_yearmo_date(
        fields
            .begin_yearmo
            .as_deref()
            .and_then(|c| headers.get(record, c)),
        fields
            .begin_day
            .as_deref()
            .and_then(|c| headers.get(record, c)),
    );
    let end = parse_yearmo_date(
        fields
            .end_yearmo
            .as_deref()
            .and_then(|c| headers.get(record, c)),
        fields.end_day.as_deref().and_then(|c| headers.get(record, c)),
    );
    (begin, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rail_hazard_dataset::registry::dataset_by_id;
    use std::io::Write as _;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const FLOOD_CSV: &str = "\
EVENT_ID,EPISODE_ID,BEGIN_LAT,BEGIN_LON,BEGIN_YEARMO,BEGIN_DAY,END_YEARMO,END_DAY,EVENT_NARRATIVE
1001,50,40.1,-89.5,202104,15,202104,16,Creek out of banks
1002,50,40.2,-89.6,202104,15,202104,16,Second report same episode
1003,,0.0,0.0,202105,1,202105,1,No location given
1004,51,,-89.9,202105,2,202105,2,Missing latitude
1005,52,abc,-89.9,202105,2,202105,2,Bad latitude
";

    #[test]
    fn loads_and_tallies_exclusions() {
        let dataset = dataset_by_id("flash_flood").unwrap();
        let file = write_csv(FLOOD_CSV);
        let (events, report) = load_events(file.path(), &dataset).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(report.kept, 2);
        assert_eq!(report.zero_coordinates, 1);
        assert_eq!(report.missing_coordinates, 1);
        assert_eq!(report.unparseable_coordinates, 1);
        assert_eq!(report.total(), 5);

        let first = &events[0];
        assert_eq!(first.event_id, "1001");
        assert_eq!(first.episode_id.as_deref(), Some("50"));
        assert!((first.location.x() - -89.5).abs() < f64::EPSILON);
        let begin = first.begin.unwrap();
        assert_eq!((begin.year, begin.month, begin.day), (2021, 4, Some(15)));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let dataset = dataset_by_id("flash_flood").unwrap();
        let file = write_csv("EVENT_ID,BEGIN_LAT\n1,40.0\n");
        assert!(matches!(
            load_events(file.path(), &dataset),
            Err(IngestError::MissingColumn { .. })
        ));
    }

    #[test]
    fn missing_file_is_fatal() {
        let dataset = dataset_by_id("flash_flood").unwrap();
        let result = load_events(Path::new("/nonexistent/flood.csv"), &dataset);
        assert!(result.is_err());
    }

    #[test]
    fn keyword_filter_excludes_unmatched_narratives() {
        let dataset = dataset_by_id("track_buckling").unwrap();
        let csv = "\
ACCIDENT_NO,Latitude,Longitude,Date,Narrative
A1,40.0,-89.0,2019-07-21,Rail buckled in extreme heat
A2,40.1,-89.1,2019-07-22,Broken joint bar at crossing
A3,40.2,-89.2,2019-07-23,Suspected sun kink near MP 8
";
        let file = write_csv(csv);
        let (events, report) = load_events(file.path(), &dataset).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(report.filtered_by_keywords, 1);
        assert_eq!(events[0].event_id, "A1");
        assert_eq!(events[1].event_id, "A3");
    }

    #[test]
    fn iso_date_layout_populates_both_ends() {
        let dataset = dataset_by_id("landslide").unwrap();
        let csv = "OBJECTID,LAT,LON,Date,Notes\n7,45.5,-122.6,2014-03-22,debris flow\n";
        let file = write_csv(csv);
        let (events, _) = load_events(file.path(), &dataset).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].begin, events[0].end);
        assert_eq!(events[0].begin.unwrap().day, Some(22));
    }
}
