//! Runtime configuration shared by the commands.

use std::path::PathBuf;

use chrono::{Datelike, Local};

use crate::download::{ArchiveFetcher, DEFAULT_BASE_URL};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root of the GHCN-Daily archive.
    pub base_url: String,
    /// Where downloaded archive files are kept between runs.
    pub data_dir: PathBuf,
    /// Re-download files that are already in `data_dir`.
    pub overwrite: bool,
    /// Where output tables are written when no path is given.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: default_data_dir(),
            overwrite: false,
            output_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl Config {
    pub fn fetcher(&self) -> ArchiveFetcher {
        ArchiveFetcher::new(self.base_url.as_str()).with_overwrite(self.overwrite)
    }

    /// Directory holding the per-station `.dly` files.
    pub fn station_dir(&self) -> PathBuf {
        self.data_dir.join("all")
    }

    /// Dated output file name, e.g. `ghcnd-daily-2024-07-01.parquet`.
    pub fn make_parquet_file_name(&self, table: &str) -> PathBuf {
        let today = Local::now();
        let file_name = format!(
            "ghcnd-{}-{}-{:02}-{:02}.parquet",
            table,
            today.year(),
            today.month(),
            today.day()
        );

        self.output_dir.join(file_name)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("ghcnd")
}
