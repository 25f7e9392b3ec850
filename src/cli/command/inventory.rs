//! Filter the inventory and report the matching stations.

use std::path::PathBuf;

use anyhow::Result;
use ghcnd::{parquet, Config, FilterCriteria};
use tracing::info;

use super::load_inventory;

pub async fn inventory(
    config: &Config,
    criteria: &FilterCriteria,
    output: Option<PathBuf>,
) -> Result<String> {
    let index = load_inventory(config).await?;
    let rows = index.filter(criteria);
    info!("{} of {} inventory rows match", rows.len(), index.len());

    match output {
        Some(file_path) => {
            parquet::save_inventory(rows.iter().copied(), &file_path)?;
            Ok(format!("File saved to `{}`", file_path.display()))
        }
        None => {
            for row in &rows {
                println!(
                    "{} {:>9.4} {:>10.4} {} {}-{}",
                    row.station_id,
                    row.latitude,
                    row.longitude,
                    row.element,
                    row.first_year,
                    row.last_year
                );
            }
            Ok(format!("{} matching rows", rows.len()))
        }
    }
}
