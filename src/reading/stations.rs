//! Station metadata from `ghcnd-stations.txt`.
//!
//! See the GHCN-Daily readme, section IV, for the format.

use std::collections::{HashMap, HashSet};

use super::{
    layout::{FieldKind, FieldSpec, FixedWidthLayout},
    LineDecoder,
};
use crate::error::RecordError;

const STATIONS: FixedWidthLayout = FixedWidthLayout::new(&[
    FieldSpec::new("station_id", 11, FieldKind::Text),
    FieldSpec::new("latitude", 9, FieldKind::Decimal { places: 4 }),
    FieldSpec::new("longitude", 10, FieldKind::Decimal { places: 4 }),
    FieldSpec::new("elevation", 7, FieldKind::Decimal { places: 1 }),
    FieldSpec::new("state", 3, FieldKind::OptionalText),
    FieldSpec::new("name", 31, FieldKind::Text),
    FieldSpec::new("gsn_flag", 4, FieldKind::OptionalText),
    FieldSpec::new("hcn_crn_flag", 4, FieldKind::OptionalText),
    FieldSpec::new("wmo_id", 6, FieldKind::OptionalText),
]);

/// Characters up to and including the name column.
const MANDATORY_WIDTH: usize = 71;

const MISSING_ELEVATION: f64 = -999.9;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationMetadata {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub state: Option<String>,
    pub name: String,
    pub gsn_flag: Option<String>,
    pub hcn_crn_flag: Option<String>,
    pub wmo_id: Option<String>,
}

impl StationMetadata {
    pub fn from_line(line: &str) -> Result<Self, RecordError> {
        if line.len() < MANDATORY_WIDTH {
            return Err(RecordError::TruncatedRecord {
                required: MANDATORY_WIDTH,
                actual: line.len(),
            });
        }

        // Trailing flag columns are often left off
        let padded = format!("{:<width$}", line, width = STATIONS.width());
        let record = STATIONS.decode(&padded)?;
        let owned = |name: &'static str| -> Result<Option<String>, RecordError> {
            Ok(record.optional_text(name)?.map(str::to_string))
        };

        Ok(StationMetadata {
            station_id: record.text("station_id")?.to_string(),
            latitude: record.decimal("latitude")?,
            longitude: record.decimal("longitude")?,
            elevation: Some(record.decimal("elevation")?).filter(|&v| v != MISSING_ELEVATION),
            state: owned("state")?,
            name: record.text("name")?.to_string(),
            gsn_flag: owned("gsn_flag")?,
            hcn_crn_flag: owned("hcn_crn_flag")?,
            wmo_id: owned("wmo_id")?,
        })
    }

    pub fn country_code(&self) -> &str {
        self.station_id.get(..2).unwrap_or(&self.station_id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StationMetadataParser;

impl LineDecoder for StationMetadataParser {
    type Record = StationMetadata;

    fn decode_line(&self, line: &str, out: &mut Vec<StationMetadata>) -> Result<(), RecordError> {
        out.push(StationMetadata::from_line(line)?);
        Ok(())
    }
}

/// Station metadata with lookup by id.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<StationMetadata>,
    lookup: HashMap<String, usize>,
}

impl StationCatalog {
    pub fn new(stations: Vec<StationMetadata>) -> Self {
        let lookup = stations
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.station_id.clone(), idx))
            .collect();

        StationCatalog { stations, lookup }
    }

    pub fn get(&self, station_id: &str) -> Option<&StationMetadata> {
        self.lookup.get(station_id).map(|&idx| &self.stations[idx])
    }

    /// Rows whose id is in `station_ids`, in catalog order.
    pub fn get_meta<S: AsRef<str>>(&self, station_ids: &[S]) -> Vec<&StationMetadata> {
        let wanted: HashSet<&str> = station_ids.iter().map(|s| s.as_ref()).collect();

        self.stations
            .iter()
            .filter(|s| wanted.contains(s.station_id.as_str()))
            .collect()
    }

    pub fn stations(&self) -> &[StationMetadata] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

// -- Tests -------------------------------------------------------------------
