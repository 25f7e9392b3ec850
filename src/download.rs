//! Downloads archive files to a local directory.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://www.ncei.noaa.gov/pub/data/ghcn/daily";

/// A file the archive publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveItem {
    Inventory,
    Stations,
    Station(String),
}

impl ArchiveItem {
    /// `"inventory"` and `"stations"` name the index files, anything else is
    /// taken as a station id.
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier {
            "inventory" => ArchiveItem::Inventory,
            "stations" => ArchiveItem::Stations,
            id => ArchiveItem::Station(id.to_string()),
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            ArchiveItem::Inventory => "ghcnd-inventory.txt".to_string(),
            ArchiveItem::Stations => "ghcnd-stations.txt".to_string(),
            ArchiveItem::Station(id) => format!("{}.dly", id),
        }
    }

    fn url_path(&self) -> String {
        match self {
            ArchiveItem::Station(_) => format!("all/{}", self.file_name()),
            _ => self.file_name(),
        }
    }

    fn validate(&self) -> Result<(), FetchError> {
        match self {
            ArchiveItem::Station(id)
                if id.len() != 11 || !id.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                Err(FetchError::InvalidStationId(id.clone()))
            }
            _ => Ok(()),
        }
    }
}

/// Fetches archive files over HTTP(S). Files already present in the
/// destination are reused unless `overwrite` is set.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    client: reqwest::Client,
    base_url: String,
    overwrite: bool,
}

impl Default for ArchiveFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ArchiveFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        ArchiveFetcher {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            overwrite: false,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn url(&self, item: &ArchiveItem) -> String {
        format!("{}/{}", self.base_url, item.url_path())
    }

    pub async fn fetch(&self, item: &ArchiveItem, destination: &Path) -> Result<PathBuf, FetchError> {
        self.fetch_with_progress(item, destination, &ProgressBar::hidden())
            .await
    }

    /// Downloads with progress bar based on content length
    pub async fn fetch_with_progress(
        &self,
        item: &ArchiveItem,
        destination: &Path,
        progress_bar: &ProgressBar,
    ) -> Result<PathBuf, FetchError> {
        item.validate()?;
        let file_path = destination.join(item.file_name());

        if file_path.exists() && !self.overwrite {
            debug!("Using cached {}", file_path.display());
            return Ok(file_path);
        }

        fs::create_dir_all(destination).map_err(|source| FetchError::Write {
            path: destination.to_path_buf(),
            source,
        })?;

        let url = self.url(item);
        info!("Downloading {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status(),
            });
        }

        let total_size = response.content_length().unwrap_or(0);
        if total_size > 0 {
            progress_bar.set_length(total_size);
            if let Ok(style) = ProgressStyle::with_template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {eta}",
            ) {
                progress_bar.set_style(style.progress_chars("=> "));
            }
        }

        // Written under a temporary name so a failed transfer leaves nothing
        // behind under the final one
        let partial_path = file_path.with_extension("part");
        let write_err = |source| FetchError::Write {
            path: partial_path.clone(),
            source,
        };

        let mut file = File::create(&partial_path).map_err(write_err)?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                Err(source) => {
                    drop(file);
                    let _ = fs::remove_file(&partial_path);
                    return Err(FetchError::Request { url, source });
                }
            };
            file.write_all(&chunk).map_err(write_err)?;
            downloaded += chunk.len() as u64;
            progress_bar.set_position(downloaded);
        }

        file.flush().map_err(write_err)?;
        drop(file);
        fs::rename(&partial_path, &file_path).map_err(|source| FetchError::Write {
            path: file_path.clone(),
            source,
        })?;

        Ok(file_path)
    }
}

// -- Tests -------------------------------------------------------------------
