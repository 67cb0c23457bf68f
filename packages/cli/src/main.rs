#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line pipeline for rail hazard attribution.
//!
//! Each subcommand is one stage of the pipeline, reading and writing files
//! so stages can be re-run independently: `attribute` joins hazard events
//! to spatial units, `overlay` splits the rail network by attributed unit,
//! `corridor` counts events near track, `verify` cross-checks accident
//! records against events, and `chart` renders the exposure figures.
//!
//! Uses `indicatif-log-bridge` (via [`rail_hazard_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rail_hazard_cli_utils::{IndicatifProgress, MultiProgress};
use rail_hazard_dataset::registry;
use rail_hazard_ingest::accidents::AccidentLayout;
use rail_hazard_ingest::{accidents, events, layers};
use rail_hazard_spatial::UnitIndex;

#[derive(Parser)]
#[command(name = "rail-hazard", about = "Rail network hazard attribution pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the configured hazard datasets.
    Datasets,

    /// Attribute hazard events to spatial units and write the attributed
    /// unit layer.
    Attribute {
        /// Dataset id (see `datasets`).
        #[arg(long)]
        dataset: String,
        /// Hazard event CSV export.
        #[arg(long)]
        events: PathBuf,
        /// Spatial-unit polygon layer (GeoJSON).
        #[arg(long)]
        units: PathBuf,
        /// Attributed unit layer to write (GeoJSON).
        #[arg(long)]
        output: PathBuf,
    },

    /// Split the rail network by attributed unit and write segment layers.
    Overlay {
        /// Dataset id, for the unit layer's id field.
        #[arg(long)]
        dataset: String,
        /// Rail network line layer (GeoJSON).
        #[arg(long)]
        rail: PathBuf,
        /// Property holding the rail line id, when the layer has one.
        #[arg(long)]
        rail_id_field: Option<String>,
        /// Spatial-unit polygon layer (GeoJSON).
        #[arg(long)]
        units: PathBuf,
        /// Attributed unit layer from `attribute` (GeoJSON).
        #[arg(long)]
        attributed: PathBuf,
        /// Segment layer to write (GeoJSON).
        #[arg(long)]
        output_geojson: PathBuf,
        /// Segment attribute table to write (CSV).
        #[arg(long)]
        output_csv: PathBuf,
    },

    /// Count events within fixed corridors of each rail line.
    Corridor {
        /// Dataset id (see `datasets`).
        #[arg(long)]
        dataset: String,
        /// Hazard event CSV export.
        #[arg(long)]
        events: PathBuf,
        /// Rail network line layer (GeoJSON).
        #[arg(long)]
        rail: PathBuf,
        /// Property holding the rail line id, when the layer has one.
        #[arg(long)]
        rail_id_field: Option<String>,
        /// Corridor radii in meters.
        #[arg(long, value_delimiter = ',', default_values_t = [15.0, 50.0, 100.0])]
        radii: Vec<f64>,
        /// Corridor count table to write (CSV).
        #[arg(long)]
        output: PathBuf,
    },

    /// Cross-check accident records against dated hazard events.
    Verify {
        /// Dataset id (see `datasets`).
        #[arg(long)]
        dataset: String,
        /// Hazard event CSV export.
        #[arg(long)]
        events: PathBuf,
        /// Accident record CSV export.
        #[arg(long)]
        accidents: PathBuf,
        /// Spatial-unit polygon layer (GeoJSON).
        #[arg(long)]
        units: PathBuf,
        /// Match table to write (CSV).
        #[arg(long)]
        output: PathBuf,
    },

    /// Render the exposure figures from a segment attribute table.
    Chart {
        /// Segment attribute table from `overlay` (CSV).
        #[arg(long)]
        segments: PathBuf,
        /// Frequency bin edges (right-open; the last bin is unbounded).
        #[arg(long, value_delimiter = ',', default_values_t = [0u64, 1, 3, 6, 11])]
        edges: Vec<u64>,
        /// Chart title.
        #[arg(long, default_value = "Railway Length by Event Frequency")]
        title: String,
        /// X-axis label for the bar chart.
        #[arg(long, default_value = "Event Frequency")]
        x_label: String,
        /// Bar chart to write (SVG).
        #[arg(long)]
        output_bar: PathBuf,
        /// Three-class exposure pie chart to write (SVG).
        #[arg(long)]
        output_pie: PathBuf,
        /// Optional two-slice "zero vs. at least one" pie chart (SVG).
        #[arg(long)]
        output_pie_binary: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = rail_hazard_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Command::Datasets => list_datasets(),
        Command::Attribute {
            dataset,
            events,
            units,
            output,
        } => attribute(&multi, &dataset, &events, &units, &output)?,
        Command::Overlay {
            dataset,
            rail,
            rail_id_field,
            units,
            attributed,
            output_geojson,
            output_csv,
        } => overlay(
            &multi,
            &dataset,
            &rail,
            rail_id_field.as_deref(),
            &units,
            &attributed,
            &output_geojson,
            &output_csv,
        )?,
        Command::Corridor {
            dataset,
            events,
            rail,
            rail_id_field,
            radii,
            output,
        } => corridor(
            &multi,
            &dataset,
            &events,
            &rail,
            rail_id_field.as_deref(),
            &radii,
            &output,
        )?,
        Command::Verify {
            dataset,
            events,
            accidents,
            units,
            output,
        } => verify(&dataset, &events, &accidents, &units, &output)?,
        Command::Chart {
            segments,
            edges,
            title,
            x_label,
            output_bar,
            output_pie,
            output_pie_binary,
        } => chart(
            &segments,
            &edges,
            &title,
            &x_label,
            &output_bar,
            &output_pie,
            output_pie_binary.as_deref(),
        )?,
    }

    Ok(())
}

fn list_datasets() {
    for dataset in registry::all_datasets() {
        println!(
            "{:<16} {:<28} kind={:<16} provider={}",
            dataset.id, dataset.name, dataset.kind, dataset.provider
        );
    }
}

fn log_load_report(report: &events::LoadReport) {
    log::info!(
        "Loaded {} of {} event rows ({} missing coords, {} zero coords, \
         {} unparseable coords, {} missing id, {} filtered by keywords, \
         {} undated)",
        report.kept,
        report.total(),
        report.missing_coordinates,
        report.zero_coordinates,
        report.unparseable_coordinates,
        report.missing_id,
        report.filtered_by_keywords,
        report.undated,
    );
}

fn attribute(
    multi: &MultiProgress,
    dataset_id: &str,
    events_path: &std::path::Path,
    units_path: &std::path::Path,
    output: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = registry::dataset_by_id(dataset_id)?;
    log::info!("Attributing {} events to units", dataset.name);

    let (hazard_events, report) = events::load_events(events_path, &dataset)?;
    log_load_report(&report);

    let units = layers::load_unit_layer(units_path, &dataset.unit_layer)?;
    let index = UnitIndex::build(&units);

    let bar = IndicatifProgress::records_bar(multi, "Attributing events");
    let attributions = index.attribute(&hazard_events, Some(&bar));

    rail_hazard_output::units::write_attributed_units(output, &units, &attributions)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn overlay(
    multi: &MultiProgress,
    dataset_id: &str,
    rail_path: &std::path::Path,
    rail_id_field: Option<&str>,
    units_path: &std::path::Path,
    attributed_path: &std::path::Path,
    output_geojson: &std::path::Path,
    output_csv: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = registry::dataset_by_id(dataset_id)?;

    let rail = layers::load_rail_layer(rail_path, rail_id_field)?;
    let units = layers::load_unit_layer(units_path, &dataset.unit_layer)?;
    let attributions = rail_hazard_output::units::read_attributed_units(attributed_path)?;

    let bar = IndicatifProgress::records_bar(multi, "Splitting rail network");
    let segments =
        rail_hazard_overlay::propagate_to_segments(&rail, &units, &attributions, Some(&bar));

    let pairs = rail_hazard_analytics::segment_pairs(&segments);
    let summary = rail_hazard_analytics::exposure_breakdown(&pairs);
    log::info!(
        "Length-weighted mean event frequency: {:.3}",
        summary.weighted_mean
    );
    for share in &summary.shares {
        log::info!(
            "  {:?}: {:.1} mi ({:.1}%)",
            share.class,
            share.total_length,
            share.percent
        );
    }

    rail_hazard_output::segments::write_segments_geojson(output_geojson, &segments)?;
    rail_hazard_output::segments::write_segments_csv(output_csv, &segments)?;
    Ok(())
}

fn corridor(
    multi: &MultiProgress,
    dataset_id: &str,
    events_path: &std::path::Path,
    rail_path: &std::path::Path,
    rail_id_field: Option<&str>,
    radii: &[f64],
    output: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = registry::dataset_by_id(dataset_id)?;

    let (hazard_events, report) = events::load_events(events_path, &dataset)?;
    log_load_report(&report);
    let rail = layers::load_rail_layer(rail_path, rail_id_field)?;

    let bar = IndicatifProgress::records_bar(multi, "Measuring corridors");
    let counts =
        rail_hazard_overlay::assign_corridor_counts(&rail, &hazard_events, radii, Some(&bar));

    rail_hazard_output::segments::write_corridor_csv(output, &counts)?;
    Ok(())
}

fn verify(
    dataset_id: &str,
    events_path: &std::path::Path,
    accidents_path: &std::path::Path,
    units_path: &std::path::Path,
    output: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = registry::dataset_by_id(dataset_id)?;

    let (hazard_events, report) = events::load_events(events_path, &dataset)?;
    log_load_report(&report);
    let (accident_records, accident_report) =
        accidents::load_accidents(accidents_path, &AccidentLayout::default())?;
    log::info!(
        "Loaded {} accident records ({} missing coordinates, {} missing date, {} missing id)",
        accident_report.kept,
        accident_report.missing_coordinates,
        accident_report.missing_date,
        accident_report.missing_id,
    );

    let units = layers::load_unit_layer(units_path, &dataset.unit_layer)?;
    let index = UnitIndex::build(&units);

    let verification = rail_hazard_verify::verify_accidents(&accident_records, &hazard_events, &index);
    log::info!(
        "Verified {} of {} accidents ({} outside all units)",
        verification.verified_accidents,
        verification.verified_accidents + verification.unverified_accidents,
        verification.outside_units,
    );

    rail_hazard_output::segments::write_matches_csv(output, &verification.matches)?;
    Ok(())
}

fn chart(
    segments_path: &std::path::Path,
    edges: &[u64],
    title: &str,
    x_label: &str,
    output_bar: &std::path::Path,
    output_pie: &std::path::Path,
    output_pie_binary: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = rail_hazard_output::segments::read_segments_csv(segments_path)?;
    let pairs: Vec<(u64, f64)> = rows.iter().map(|r| (r.count, r.length_miles)).collect();

    let bins = rail_hazard_analytics::bucketize(&pairs, edges, true);
    rail_hazard_output::charts::write_bar_chart(output_bar, &bins, title, x_label)?;

    let summary = rail_hazard_analytics::exposure_breakdown(&pairs);
    log::info!(
        "Length-weighted mean event frequency: {:.3}",
        summary.weighted_mean
    );
    let slices: Vec<(String, f64)> = summary
        .shares
        .iter()
        .map(|share| {
            let label = match share.class {
                rail_hazard_analytics::ExposureClass::NoEvent => "No Event",
                rail_hazard_analytics::ExposureClass::BelowMean => "At or Below Mean",
                rail_hazard_analytics::ExposureClass::AboveMean => "Above Mean",
            };
            (label.to_string(), share.total_length)
        })
        .collect();
    rail_hazard_output::charts::write_pie_chart(output_pie, &slices, "Mileage by Exposure Class")?;

    if let Some(path) = output_pie_binary {
        let binary = rail_hazard_output::charts::binary_exposure_slices(&summary);
        rail_hazard_output::charts::write_pie_chart(path, &binary, "Mileage by Event Occurrence")?;
    }
    Ok(())
}
