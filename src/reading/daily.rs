//! Decoding of per-station `.dly` files.
//!
//! Each line holds one station/year/month/element and always carries 31
//! value groups, whatever the length of the month. Slots past the end of the
//! month are decoded like any other; dropping them is left to
//! [`retain_calendar_days`].

use chrono::NaiveDate;

use super::{
    layout::{FieldKind, FieldSpec, FieldValue, FixedWidthLayout, Record},
    LineDecoder,
};
use crate::error::RecordError;

/// Raw value the archive uses for "no observation".
pub const MISSING_VALUE: i32 = -9999;

pub const DAYS_PER_LINE: usize = 31;

const HEADER: FixedWidthLayout = FixedWidthLayout::new(&[
    FieldSpec::new("station_id", 11, FieldKind::Text),
    FieldSpec::new("year", 4, FieldKind::Integer),
    FieldSpec::new("month", 2, FieldKind::PaddedInteger),
    FieldSpec::new("element", 4, FieldKind::Text),
]);

const DAY_GROUP: FixedWidthLayout = FixedWidthLayout::new(&[
    FieldSpec::new("value", 5, FieldKind::Integer),
    FieldSpec::new("mflag", 1, FieldKind::Flag),
    FieldSpec::new("qflag", 1, FieldKind::Flag),
    FieldSpec::new("sflag", 1, FieldKind::Flag),
]);

/// Characters in a complete line.
pub const LINE_WIDTH: usize = HEADER.width() + DAYS_PER_LINE * DAY_GROUP.width();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationRecord {
    pub station_id: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub element: String,
    /// `None` when the archive holds the missing sentinel.
    pub value: Option<i32>,
    pub mflag: Option<char>,
    pub qflag: Option<char>,
    pub sflag: Option<char>,
}

impl ObservationRecord {
    /// The calendar date, or `None` for slots such as February 30th.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

/// One decoded day group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayValue {
    pub value: Option<i32>,
    pub mflag: Option<char>,
    pub qflag: Option<char>,
    pub sflag: Option<char>,
}

impl DayValue {
    fn from_record(record: &Record) -> Result<Self, RecordError> {
        let raw = record.integer("value")?;

        Ok(DayValue {
            value: Some(raw).filter(|&v| v != MISSING_VALUE),
            mflag: record.flag("mflag")?,
            qflag: record.flag("qflag")?,
            sflag: record.flag("sflag")?,
        })
    }

    fn field_values(&self) -> [FieldValue; 4] {
        [
            FieldValue::Integer(self.value.unwrap_or(MISSING_VALUE)),
            FieldValue::Flag(self.mflag),
            FieldValue::Flag(self.qflag),
            FieldValue::Flag(self.sflag),
        ]
    }
}

/// One line of a `.dly` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthLine {
    pub station_id: String,
    pub year: i32,
    pub month: u32,
    pub element: String,
    pub days: Vec<DayValue>,
}

impl MonthLine {
    pub fn from_line(line: &str) -> Result<Self, RecordError> {
        let mut month_line = Self::header_from_line(line)?;
        month_line.decode_days(line)?;

        Ok(month_line)
    }

    // Checks the full line length, then decodes only the header.
    fn header_from_line(line: &str) -> Result<Self, RecordError> {
        if line.len() < LINE_WIDTH {
            return Err(RecordError::TruncatedRecord {
                required: LINE_WIDTH,
                actual: line.len(),
            });
        }

        let header = HEADER.decode(line)?;
        let month = header.integer("month")?;
        let month = u32::try_from(month)
            .map_err(|e| RecordError::invalid("month", &month.to_string(), e))?;

        Ok(MonthLine {
            station_id: header.text("station_id")?.to_string(),
            year: header.integer("year")?,
            month,
            element: header.text("element")?.to_string(),
            days: Vec::new(),
        })
    }

    fn decode_days(&mut self, line: &str) -> Result<(), RecordError> {
        let start = HEADER.width();
        let chunk_length = DAY_GROUP.width();

        let days = (0..DAYS_PER_LINE)
            .map(|i| {
                let group = line
                    .get(start + i * chunk_length..)
                    .ok_or_else(|| RecordError::invalid("value", line, "non-ASCII text in line"))?;
                DayValue::from_record(&DAY_GROUP.decode(group)?)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.days = days;

        Ok(())
    }

    /// Re-encodes the line in the archive layout.
    pub fn to_line(&self) -> Result<String, RecordError> {
        let header = [
            FieldValue::Text(self.station_id.clone()),
            FieldValue::Integer(self.year),
            FieldValue::Integer(self.month as i32),
            FieldValue::Text(self.element.clone()),
        ];
        let mut line = String::with_capacity(LINE_WIDTH);
        line.push_str(&HEADER.encode(&header)?);
        for day in &self.days {
            line.push_str(&DAY_GROUP.encode(&day.field_values())?);
        }

        Ok(line)
    }

    pub fn observations(&self) -> impl Iterator<Item = ObservationRecord> + '_ {
        self.days
            .iter()
            .enumerate()
            .map(move |(idx, day)| ObservationRecord {
                station_id: self.station_id.clone(),
                year: self.year,
                month: self.month,
                day: (idx + 1) as u32,
                element: self.element.clone(),
                value: day.value,
                mflag: day.mflag,
                qflag: day.qflag,
                sflag: day.sflag,
            })
    }
}

/// Decodes `.dly` lines into one [`ObservationRecord`] per day group.
///
/// With an element set, lines for other elements are dropped after the
/// header is read and their day groups are never decoded. For well-formed
/// input the result equals decoding everything and filtering afterwards.
/// A malformed value group on a filtered-out line is therefore not reported;
/// only a short line or a bad header fails regardless of the element.
#[derive(Debug, Clone, Default)]
pub struct DailyFileParser {
    element: Option<String>,
}

impl DailyFileParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_element(element: impl Into<String>) -> Self {
        DailyFileParser {
            element: Some(element.into()),
        }
    }

    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    /// Decodes one line, or returns `None` when its element is filtered out.
    pub fn month_line(&self, line: &str) -> Result<Option<MonthLine>, RecordError> {
        let mut month_line = MonthLine::header_from_line(line)?;

        if let Some(element) = &self.element {
            if &month_line.element != element {
                return Ok(None);
            }
        }

        month_line.decode_days(line)?;
        Ok(Some(month_line))
    }
}

impl LineDecoder for DailyFileParser {
    type Record = ObservationRecord;

    fn decode_line(&self, line: &str, out: &mut Vec<ObservationRecord>) -> Result<(), RecordError> {
        if let Some(month_line) = self.month_line(line)? {
            out.extend(month_line.observations());
        }

        Ok(())
    }
}

/// Drops observations whose day does not exist in their month.
pub fn retain_calendar_days(mut records: Vec<ObservationRecord>) -> Vec<ObservationRecord> {
    records.retain(|r| r.date().is_some());
    records
}

pub fn drop_missing(mut records: Vec<ObservationRecord>) -> Vec<ObservationRecord> {
    records.retain(|r| !r.is_missing());
    records
}

// -- Tests ----------------------------------------------------------------------------
