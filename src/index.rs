//! Queryable view over the inventory.
//!
//! An [`InventoryIndex`] is built by the caller from parsed records and
//! passed around explicitly. Filtering never reorders or deduplicates: a
//! station appears once per element it reports.

use std::{collections::BTreeSet, io::BufRead, path::Path};

use tracing::info;

use crate::{
    error::ParseError,
    reading::{InventoryParser, LineDecoder, ParseMode, ParseOutcome, SkippedLine, StationRecord},
};

/// Inclusive latitude/longitude rectangle in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        BoundingBox {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.lat_min
            && latitude <= self.lat_max
            && longitude >= self.lon_min
            && longitude <= self.lon_max
    }
}

/// Filter options. Every field left as `None` matches everything; the rest
/// are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Two-character prefix of the station id, compared case-insensitively.
    pub country: Option<String>,
    pub element: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub bounding_box: Option<BoundingBox>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn min_year(mut self, year: i32) -> Self {
        self.min_year = Some(year);
        self
    }

    pub fn max_year(mut self, year: i32) -> Self {
        self.max_year = Some(year);
        self
    }

    pub fn bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.bounding_box = Some(bbox);
        self
    }

    pub fn matches(&self, record: &StationRecord) -> bool {
        self.country
            .as_deref()
            .map_or(true, |c| record.country_code().eq_ignore_ascii_case(c))
            && self.element.as_deref().map_or(true, |e| record.element == e)
            && record.covers(self.min_year, self.max_year)
            && self
                .bounding_box
                .map_or(true, |b| b.contains(record.latitude, record.longitude))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InventoryIndex {
    records: Vec<StationRecord>,
}

impl InventoryIndex {
    pub fn new(records: Vec<StationRecord>) -> Self {
        InventoryIndex { records }
    }

    /// Builds an index from inventory text. Malformed lines fail the build.
    pub fn from_text(text: &str) -> Result<Self, ParseError> {
        Ok(Self::new(InventoryParser.parse_str(text)?))
    }

    /// Streams the inventory. In lenient mode the skipped lines are returned
    /// next to the index.
    pub fn from_reader<R: BufRead>(
        reader: R,
        mode: ParseMode,
    ) -> Result<(Self, Vec<SkippedLine>), ParseError> {
        let outcome = InventoryParser.parse_reader(reader, mode)?;
        Ok(Self::split(outcome))
    }

    pub fn from_file(path: &Path, mode: ParseMode) -> Result<(Self, Vec<SkippedLine>), ParseError> {
        let outcome = InventoryParser.parse_file(path, mode)?;
        Ok(Self::split(outcome))
    }

    fn split(outcome: ParseOutcome<StationRecord>) -> (Self, Vec<SkippedLine>) {
        info!(
            "Loaded {} inventory rows, skipped {}",
            outcome.records.len(),
            outcome.skipped.len()
        );

        (Self::new(outcome.records), outcome.skipped)
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows matching all supplied criteria, in inventory order. An empty
    /// result, including one for an element absent from the inventory, is a
    /// valid answer.
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&StationRecord> {
        self.records.iter().filter(|r| criteria.matches(r)).collect()
    }

    /// Station ids of [`filter`](Self::filter), one per matching row.
    pub fn station_ids(&self, criteria: &FilterCriteria) -> Vec<&str> {
        self.filter(criteria)
            .into_iter()
            .map(|r| r.station_id.as_str())
            .collect()
    }

    /// Distinct element codes present in the inventory.
    pub fn elements(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.element.as_str()).collect()
    }
}

/// First occurrence of each id, keeping order. Useful for selecting the
/// files to download after filtering.
pub fn unique_station_ids<'a, I>(ids: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    const INVENTORY: &str = "\
AGE00135039  36.7167    3.2500 TMAX 1940 1999
AGE00135039  36.7167    3.2500 PRCP 1935 2024
KZ000035188  51.1330   71.3670 TMAX 1881 2024
KZ000035188  51.1330   71.3670 PRCP 1881 2024
KZ000036870  43.2330   76.9330 SNWD 1936 1990
USC00437054  44.4200  -72.0194 PRCP 1893 2024";

    fn index() -> InventoryIndex {
        InventoryIndex::from_text(INVENTORY).unwrap()
    }

    #[test]
    fn should_match_everything_without_criteria() {
        let index = index();
        assert_eq!(index.filter(&FilterCriteria::new()).len(), index.len());
    }

    #[test]
    fn should_filter_by_country() {
        let index = index();
        let rows = index.filter(&FilterCriteria::new().country("KZ"));

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| &r.station_id[..2] == "KZ"));

        let lower = index.filter(&FilterCriteria::new().country("kz"));
        assert_eq!(lower, rows);
    }

    #[test]
    fn should_filter_by_element_and_year() {
        let index = index();

        let ids = index.station_ids(&FilterCriteria::new().element("TMAX").min_year(1950));
        assert_eq!(ids, vec!["AGE00135039", "KZ000035188"]);

        let ids = index.station_ids(&FilterCriteria::new().element("TMAX").min_year(2000));
        assert_eq!(ids, vec!["KZ000035188"]);

        let ids = index.station_ids(&FilterCriteria::new().max_year(1880));
        assert!(ids.is_empty());
    }

    #[test]
    fn should_exclude_station_for_other_element() {
        let index = index();
        let rows = index.filter(&FilterCriteria::new().element("PRCP"));

        assert!(rows
            .iter()
            .all(|r| !(r.station_id == "AGE00135039" && r.element == "TMAX")));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn should_return_empty_for_unknown_element() {
        let index = index();

        assert!(index.filter(&FilterCriteria::new().element("WESF")).is_empty());
        assert!(!index.elements().contains("WESF"));
    }

    #[test]
    fn should_filter_by_bounding_box() {
        let index = index();
        let bbox = BoundingBox::new(40.0, 55.0, 60.0, 80.0);

        let ids = index.station_ids(&FilterCriteria::new().bounding_box(bbox));
        assert_eq!(ids, vec!["KZ000035188", "KZ000035188", "KZ000036870"]);
    }

    #[test]
    fn should_combine_criteria() {
        let index = index();
        let criteria = FilterCriteria::new()
            .country("KZ")
            .element("SNWD")
            .min_year(1950)
            .max_year(1960)
            .bounding_box(BoundingBox::new(40.0, 45.0, 70.0, 80.0));

        assert_eq!(index.station_ids(&criteria), vec!["KZ000036870"]);
    }

    #[test]
    fn should_keep_multiplicity_and_order() {
        let index = index();
        let ids = index.station_ids(&FilterCriteria::new().country("AG"));

        assert_eq!(ids, vec!["AGE00135039", "AGE00135039"]);
        assert_eq!(unique_station_ids(ids), vec!["AGE00135039"]);
    }

    #[test]
    fn should_load_leniently_from_reader() {
        let text = format!("{}\nbroken line", INVENTORY);
        let (index, skipped) =
            InventoryIndex::from_reader(Cursor::new(text), ParseMode::Lenient).unwrap();

        assert_eq!(index.len(), 6);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line, 7);
    }

    #[test]
    fn should_fail_strict_load_on_malformed_row() {
        let text = format!("{}\n\nKZ000035188      NaN   71.3670 PRCP 1881 2024", INVENTORY);
        let err = InventoryIndex::from_reader(Cursor::new(text), ParseMode::Strict).unwrap_err();

        assert_eq!(err.line(), Some(8));
    }
}
