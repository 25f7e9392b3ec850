//! Look up station metadata.
//!
//! See the GHCN-Daily readme, section IV, for the format of
//! `ghcnd-stations.txt`.

use anyhow::{Context, Result};
use ghcnd::{
    reading::{StationCatalog, StationMetadataParser},
    ArchiveItem, Config, LineDecoder, ParseMode,
};

use crate::cli::create_spinner;

pub async fn stations(config: &Config, ids: &[String]) -> Result<String> {
    let bar = create_spinner("Downloading station list...".to_string());
    let path = config
        .fetcher()
        .fetch_with_progress(&ArchiveItem::Stations, &config.data_dir, &bar)
        .await?;
    bar.finish_with_message("Station list downloaded");

    let outcome = StationMetadataParser
        .parse_file(&path, ParseMode::Strict)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let catalog = StationCatalog::new(outcome.records);

    let found = catalog.get_meta(ids);
    for s in &found {
        println!(
            "{} {:>9.4} {:>10.4} {:>7} {:2} {:30} {:3} {:3} {:5}",
            s.station_id,
            s.latitude,
            s.longitude,
            s.elevation.map_or("-".to_string(), |e| format!("{:.1}", e)),
            s.state.as_deref().unwrap_or(""),
            s.name,
            s.gsn_flag.as_deref().unwrap_or(""),
            s.hcn_crn_flag.as_deref().unwrap_or(""),
            s.wmo_id.as_deref().unwrap_or(""),
        );
    }

    Ok(format!("{} of {} stations found", found.len(), ids.len()))
}
