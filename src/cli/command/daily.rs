//! Download and decode `.dly` files into a parquet table.

use std::path::PathBuf;

use anyhow::Result;
use ghcnd::{
    deserialise::{deserialise_files, FileReadings},
    index::unique_station_ids,
    parquet,
    reading::{retain_calendar_days, ObservationRecord},
    ArchiveItem, Config, DailyFileParser, FilterCriteria, ParseMode,
};
use tracing::{info, warn};

use super::load_inventory;
use crate::cli::{create_progress_bar, DecodeArgs};

pub async fn daily(config: &Config, criteria: &FilterCriteria, options: &DecodeArgs) -> Result<String> {
    let index = load_inventory(config).await?;
    let station_ids = unique_station_ids(index.station_ids(criteria));
    if station_ids.is_empty() {
        return Ok("No stations match the filters".to_string());
    }
    info!("{} stations selected", station_ids.len());

    let paths = download_stations(config, &station_ids).await?;
    let parser = make_parser(criteria.element.as_deref());

    decode_and_save(config, paths, &parser, options).await
}

pub async fn station(
    config: &Config,
    station_id: &str,
    element: Option<&str>,
    options: &DecodeArgs,
) -> Result<String> {
    let paths = download_stations(config, &[station_id]).await?;
    let parser = make_parser(element);

    decode_and_save(config, paths, &parser, options).await
}

fn make_parser(element: Option<&str>) -> DailyFileParser {
    element.map_or_else(DailyFileParser::new, |e| DailyFileParser::for_element(e))
}

// One station at a time; a failed fetch stops before anything is parsed
async fn download_stations(config: &Config, station_ids: &[&str]) -> Result<Vec<PathBuf>> {
    let fetcher = config.fetcher();
    let destination = config.station_dir();
    let pb = create_progress_bar(station_ids.len() as u64, "Downloading stations".to_string());
    let mut paths = Vec::with_capacity(station_ids.len());

    for id in station_ids {
        let item = ArchiveItem::Station(id.to_string());
        paths.push(fetcher.fetch(&item, &destination).await?);
        pb.inc(1);
    }
    pb.finish_with_message("Stations downloaded");

    Ok(paths)
}

async fn decode_and_save(
    config: &Config,
    paths: Vec<PathBuf>,
    parser: &DailyFileParser,
    options: &DecodeArgs,
) -> Result<String> {
    let mode = if options.lenient {
        ParseMode::Lenient
    } else {
        ParseMode::Strict
    };

    let pb = create_progress_bar(paths.len() as u64, "Decoding files".to_string());
    let files = deserialise_files(paths, parser, mode, &pb).await?;
    pb.finish_with_message("Files decoded");

    let mut records = collect_records(files);
    if options.calendar {
        records = retain_calendar_days(records);
    }

    let file_path = options
        .output
        .clone()
        .unwrap_or_else(|| config.make_parquet_file_name("daily"));
    let pb = create_progress_bar(records.len() as u64, "Writing parquet file".to_string());
    parquet::save_daily(&records, &file_path, &pb)?;

    Ok(format!(
        "{} observations saved to `{}`",
        records.len(),
        file_path.display()
    ))
}

fn collect_records(files: Vec<FileReadings>) -> Vec<ObservationRecord> {
    let mut records = Vec::new();

    for file in files {
        for skipped in &file.skipped {
            warn!(
                "{}: skipped line {}: {}",
                file.path.display(),
                skipped.line,
                skipped.error
            );
        }
        records.extend(file.records);
    }

    records
}

// -- Tests -------------------------------------------------------------------
