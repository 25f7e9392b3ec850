//! Decoding of the archive-wide inventory, `ghcnd-inventory.txt`.
//!
//! See the GHCN-Daily readme, section IV, for the format. The blank column
//! in front of each field is folded into that field's width.

use super::{
    layout::{FieldKind, FieldSpec, FieldValue, FixedWidthLayout},
    LineDecoder,
};
use crate::error::RecordError;

const INVENTORY: FixedWidthLayout = FixedWidthLayout::new(&[
    FieldSpec::new("station_id", 11, FieldKind::Text),
    FieldSpec::new("latitude", 9, FieldKind::Decimal { places: 4 }),
    FieldSpec::new("longitude", 10, FieldKind::Decimal { places: 4 }),
    FieldSpec::new("element", 5, FieldKind::Text),
    FieldSpec::new("first_year", 5, FieldKind::Integer),
    FieldSpec::new("last_year", 5, FieldKind::Integer),
]);

/// One station/element row of the inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub element: String,
    pub first_year: i32,
    pub last_year: i32,
}

impl StationRecord {
    pub fn from_line(line: &str) -> Result<Self, RecordError> {
        let record = INVENTORY.decode(line)?;

        let station_id = record.text("station_id")?;
        if station_id.is_empty() {
            return Err(RecordError::invalid("station_id", station_id, "blank station id"));
        }

        let first_year = record.integer("first_year")?;
        let last_year = record.integer("last_year")?;
        if first_year > last_year {
            return Err(RecordError::invalid(
                "last_year",
                &last_year.to_string(),
                format!("precedes first year {}", first_year),
            ));
        }

        Ok(StationRecord {
            station_id: station_id.to_string(),
            latitude: record.decimal("latitude")?,
            longitude: record.decimal("longitude")?,
            element: record.text("element")?.to_string(),
            first_year,
            last_year,
        })
    }

    pub fn to_line(&self) -> Result<String, RecordError> {
        INVENTORY.encode(&[
            FieldValue::Text(self.station_id.clone()),
            FieldValue::Decimal(self.latitude),
            FieldValue::Decimal(self.longitude),
            // Element text follows its leading blank column
            FieldValue::Text(format!(" {}", self.element)),
            FieldValue::Integer(self.first_year),
            FieldValue::Integer(self.last_year),
        ])
    }

    /// The two-character country/region prefix of the station id.
    pub fn country_code(&self) -> &str {
        self.station_id.get(..2).unwrap_or(&self.station_id)
    }

    /// Whether the coverage years intersect `[min_year, max_year]`.
    pub fn covers(&self, min_year: Option<i32>, max_year: Option<i32>) -> bool {
        min_year.map_or(true, |min| self.last_year >= min)
            && max_year.map_or(true, |max| self.first_year <= max)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryParser;

impl LineDecoder for InventoryParser {
    type Record = StationRecord;

    fn decode_line(&self, line: &str, out: &mut Vec<StationRecord>) -> Result<(), RecordError> {
        out.push(StationRecord::from_line(line)?);
        Ok(())
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use crate::error::ParseError;

    use super::*;

    const LINE: &str = "AGE00135039  36.7167    3.2500 TMAX 1940 1999";

    #[test]
    fn should_process_line() {
        let s = StationRecord::from_line(LINE).unwrap();

        assert_eq!(
            s,
            StationRecord {
                station_id: "AGE00135039".to_string(),
                latitude: 36.7167,
                longitude: 3.25,
                element: "TMAX".to_string(),
                first_year: 1940,
                last_year: 1999,
            }
        );
        assert_eq!(s.country_code(), "AG");
    }

    #[test]
    fn should_parse_negative_coordinates() {
        let s = StationRecord::from_line("USC00437054  44.4200  -72.0194 PRCP 1893 2024").unwrap();

        assert_eq!(s.latitude, 44.42);
        assert_eq!(s.longitude, -72.0194);
        assert_eq!(s.element, "PRCP");
    }

    #[test]
    fn should_round_trip_line() {
        let s = StationRecord::from_line(LINE).unwrap();
        assert_eq!(s.to_line().unwrap(), LINE);
    }

    #[test]
    fn should_fail_on_truncated_line() {
        let err = InventoryParser.parse_str(&LINE[..40]).unwrap_err();

        match err {
            ParseError::MalformedLine { line, error, .. } => {
                assert_eq!(line, 1);
                assert_eq!(
                    error,
                    RecordError::TruncatedRecord {
                        required: 45,
                        actual: 40
                    }
                );
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn should_fail_on_non_numeric_fields() {
        let bad_lat = "AGE00135039  36.71x7    3.2500 TMAX 1940 1999";
        let bad_year = "AGE00135039  36.7167    3.2500 TMAX 19a0 1999";

        assert!(matches!(
            StationRecord::from_line(bad_lat),
            Err(RecordError::InvalidField { field: "latitude", .. })
        ));
        assert!(matches!(
            StationRecord::from_line(bad_year),
            Err(RecordError::InvalidField { field: "first_year", .. })
        ));
    }

    #[test]
    fn should_reject_non_finite_coordinates() {
        let nan_lat = "AGE00135039      NaN    3.2500 TMAX 1940 1999";
        let inf_lon = "AGE00135039  36.7167       inf TMAX 1940 1999";

        assert!(matches!(
            StationRecord::from_line(nan_lat),
            Err(RecordError::InvalidField { field: "latitude", .. })
        ));
        assert!(matches!(
            StationRecord::from_line(inf_lon),
            Err(RecordError::InvalidField { field: "longitude", .. })
        ));
    }

    #[test]
    fn should_reject_reversed_year_range() {
        let reversed = "AGE00135039  36.7167    3.2500 TMAX 1999 1940";

        assert!(matches!(
            StationRecord::from_line(reversed),
            Err(RecordError::InvalidField { field: "last_year", .. })
        ));
    }

    #[test]
    fn should_test_year_coverage() {
        let s = StationRecord::from_line(LINE).unwrap();

        assert!(s.covers(Some(1950), None));
        assert!(s.covers(None, Some(1940)));
        assert!(s.covers(Some(1999), Some(2010)));
        assert!(!s.covers(Some(2000), None));
        assert!(!s.covers(None, Some(1939)));
    }
}
