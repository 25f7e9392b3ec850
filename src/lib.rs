//! Reader for the GHCN-Daily archive.
//!
//! Decodes the fixed-width per-station `.dly` files into long-form
//! observation tables, and the archive inventory into station records that
//! can be filtered before download.

pub mod config;
pub mod deserialise;
pub mod download;
pub mod error;
pub mod index;
pub mod parquet;
pub mod reading;

pub use config::Config;
pub use download::{ArchiveFetcher, ArchiveItem};
pub use error::{Error, FetchError, ParseError, RecordError, Result};
pub use index::{BoundingBox, FilterCriteria, InventoryIndex};
pub use reading::{
    DailyFileParser, InventoryParser, LineDecoder, ObservationRecord, ParseMode, ParseOutcome,
    StationRecord,
};
