//! Line-oriented decoding of archive files.

pub mod daily;
pub mod inventory;
pub mod layout;
pub mod stations;

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::error::{Error, FetchError, ParseError, RecordError};

pub use daily::{
    drop_missing, retain_calendar_days, DailyFileParser, DayValue, MonthLine, ObservationRecord,
    MISSING_VALUE,
};
pub use inventory::{InventoryParser, StationRecord};
pub use layout::{FieldKind, FieldSpec, FieldValue, FixedWidthLayout, Record};
pub use stations::{StationCatalog, StationMetadata, StationMetadataParser};

/// Whether a malformed line aborts the parse or is skipped and reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    #[default]
    Strict,
    Lenient,
}

/// A line that was skipped in [`ParseMode::Lenient`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub line: usize,
    pub content: String,
    pub error: RecordError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome<R> {
    pub records: Vec<R>,
    pub skipped: Vec<SkippedLine>,
}

// Define a trait for decoding a line into zero or more records
pub trait LineDecoder {
    type Record;

    /// Decodes one line, appending its records to `out`. Nothing is appended
    /// when an error is returned.
    fn decode_line(&self, line: &str, out: &mut Vec<Self::Record>) -> Result<(), RecordError>;

    /// Decodes every line, failing on the first malformed one.
    fn parse_lines<I, S>(&self, lines: I) -> Result<Vec<Self::Record>, ParseError>
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let outcome = drive(self, lines.into_iter().map(Ok), ParseMode::Strict)?;
        Ok(outcome.records)
    }

    /// Decodes every line, collecting malformed ones instead of failing.
    fn parse_lines_lenient<I, S>(&self, lines: I) -> ParseOutcome<Self::Record>
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            if let Err(error) = self.decode_line(line, &mut records) {
                skipped.push(skip(index + 1, line, error));
            }
        }

        ParseOutcome { records, skipped }
    }

    fn parse_str(&self, text: &str) -> Result<Vec<Self::Record>, ParseError>
    where
        Self: Sized,
    {
        self.parse_lines(text.lines())
    }

    /// Streams lines from `reader`.
    fn parse_reader<R>(&self, reader: R, mode: ParseMode) -> Result<ParseOutcome<Self::Record>, ParseError>
    where
        Self: Sized,
        R: BufRead,
    {
        drive(self, reader.lines(), mode)
    }

    fn parse_file(&self, path: &Path, mode: ParseMode) -> Result<ParseOutcome<Self::Record>, ParseError>
    where
        Self: Sized,
    {
        debug!("Parsing {}", path.display());
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file), mode)
    }
}

fn drive<D, I, S>(decoder: &D, lines: I, mode: ParseMode) -> Result<ParseOutcome<D::Record>, ParseError>
where
    D: LineDecoder,
    I: Iterator<Item = io::Result<S>>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (index, line) in lines.enumerate() {
        let line = line?;
        let line = line.as_ref();

        if line.trim().is_empty() {
            debug!("Ignoring blank line {}", index + 1);
            continue;
        }

        if let Err(error) = decoder.decode_line(line, &mut records) {
            match mode {
                ParseMode::Strict => {
                    return Err(ParseError::MalformedLine {
                        line: index + 1,
                        content: line.to_string(),
                        error,
                    })
                }
                ParseMode::Lenient => skipped.push(skip(index + 1, line, error)),
            }
        }
    }

    Ok(ParseOutcome { records, skipped })
}

fn skip(line: usize, content: &str, error: RecordError) -> SkippedLine {
    warn!("Skipping line {}: {}", line, error);
    SkippedLine {
        line,
        content: content.to_string(),
        error,
    }
}

/// Parses a file handed over by the fetch boundary. A fetch failure is
/// returned as is and nothing is read.
pub fn read_fetched<D: LineDecoder>(
    decoder: &D,
    fetched: Result<PathBuf, FetchError>,
    mode: ParseMode,
) -> Result<ParseOutcome<D::Record>, Error> {
    let path = fetched?;
    decoder
        .parse_file(&path, mode)
        .map_err(|source| Error::File { path, source })
}

// -- Tests ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use std::io::Cursor;

    use super::*;

    struct Numbers;

    impl LineDecoder for Numbers {
        type Record = i32;

        fn decode_line(&self, line: &str, out: &mut Vec<i32>) -> Result<(), RecordError> {
            let v = line
                .trim()
                .parse()
                .map_err(|e| RecordError::invalid("n", line, e))?;
            out.push(v);
            Ok(())
        }
    }

    #[test]
    fn should_stop_at_first_malformed_line() {
        let err = Numbers.parse_str("1\n2\nx\n4").unwrap_err();

        match err {
            ParseError::MalformedLine { line, content, .. } => {
                assert_eq!(line, 3);
                assert_eq!(content, "x");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn should_ignore_blank_lines() {
        let records = Numbers.parse_str("1\n\n   \n2\n\n").unwrap();
        assert_eq!(records, vec![1, 2]);

        let err = Numbers.parse_str("1\n\nx").unwrap_err();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn should_collect_skipped_lines_when_lenient() {
        let outcome = Numbers.parse_lines_lenient(["1", "y", "3"]);

        assert_eq!(outcome.records, vec![1, 3]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].line, 2);
        assert_eq!(outcome.skipped[0].content, "y");
    }

    #[test]
    fn should_stream_from_reader() {
        let reader = Cursor::new("5\nz\n7\n");

        let outcome = Numbers.parse_reader(reader, ParseMode::Lenient).unwrap();
        assert_eq!(outcome.records, vec![5, 7]);
        assert_eq!(outcome.skipped[0].line, 2);

        let reader = Cursor::new("5\nz\n7\n");
        assert!(Numbers.parse_reader(reader, ParseMode::Strict).is_err());
    }

    #[test]
    fn should_propagate_fetch_failure_without_reading() {
        let fetched = Err(FetchError::InvalidStationId("bad".to_string()));

        let err = read_fetched(&Numbers, fetched, ParseMode::Strict).unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::InvalidStationId(_))));
    }

    #[test]
    fn should_name_file_in_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numbers.txt");
        std::fs::write(&path, "1\nnope\n").unwrap();

        let err = read_fetched(&Numbers, Ok(path.clone()), ParseMode::Strict).unwrap_err();
        match err {
            Error::File { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.line(), Some(2));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
