//! Parses a set of `.dly` files into observations.
//!
//! Files are independent, so each one is decoded on its own blocking task
//! with its own output table. Results come back in the order the paths were
//! given.

use std::path::PathBuf;

use futures::future::join_all;
use indicatif::ProgressBar;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    reading::{DailyFileParser, LineDecoder, ObservationRecord, ParseMode, SkippedLine},
};

/// The decode of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReadings {
    pub path: PathBuf,
    pub records: Vec<ObservationRecord>,
    pub skipped: Vec<SkippedLine>,
}

/// Decodes every file. In strict mode the first malformed line aborts the
/// whole call and names the file it came from.
pub async fn deserialise_files(
    paths: Vec<PathBuf>,
    parser: &DailyFileParser,
    mode: ParseMode,
    progress_bar: &ProgressBar,
) -> Result<Vec<FileReadings>> {
    let tasks: Vec<_> = paths
        .iter()
        .map(|path| {
            let path = path.clone();
            let parser = parser.clone();
            let pb = progress_bar.clone();
            tokio::task::spawn_blocking(move || {
                let outcome = parser.parse_file(&path, mode);
                pb.inc(1);
                outcome
            })
        })
        .collect();

    let mut files = Vec::with_capacity(paths.len());
    for (path, result) in paths.into_iter().zip(join_all(tasks).await) {
        let outcome = result
            .map_err(|e| Error::Task {
                path: path.clone(),
                message: e.to_string(),
            })?
            .map_err(|source| Error::File {
                path: path.clone(),
                source,
            })?;

        debug!(
            "{}: {} observations, {} skipped lines",
            path.display(),
            outcome.records.len(),
            outcome.skipped.len()
        );
        files.push(FileReadings {
            path,
            records: outcome.records,
            skipped: outcome.skipped,
        });
    }

    info!("Decoded {} files", files.len());
    Ok(files)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn dly_line(station: &str, month: u32, element: &str, value: i32) -> String {
        let mut line = format!("{}2020{:02}{}", station, month, element);
        for _ in 0..31 {
            line.push_str(&format!("{:>5}   ", value));
        }
        line
    }

    fn write(dir: &TempDir, name: &str, lines: &[String]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[tokio::test]
    async fn should_decode_files_in_order() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "AAA00000001.dly", &[dly_line("AAA00000001", 1, "TMAX", 10)]);
        let b = write(
            &dir,
            "BBB00000002.dly",
            &[
                dly_line("BBB00000002", 1, "TMAX", 20),
                dly_line("BBB00000002", 1, "PRCP", 5),
            ],
        );

        let files = deserialise_files(
            vec![a.clone(), b.clone()],
            &DailyFileParser::for_element("TMAX"),
            ParseMode::Strict,
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, a);
        assert_eq!(files[0].records[0].value, Some(10));
        assert_eq!(files[1].path, b);
        assert_eq!(files[1].records.len(), 31);
        assert!(files[1].records.iter().all(|r| r.element == "TMAX"));
    }

    #[tokio::test]
    async fn should_name_failing_file() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "good.dly", &[dly_line("AAA00000001", 1, "TMAX", 10)]);
        let bad = write(
            &dir,
            "bad.dly",
            &[dly_line("BBB00000002", 1, "TMAX", 10), "BBB000000022020".to_string()],
        );

        let err = deserialise_files(
            vec![good, bad.clone()],
            &DailyFileParser::new(),
            ParseMode::Strict,
            &ProgressBar::hidden(),
        )
        .await
        .unwrap_err();

        match err {
            Error::File { path, source } => {
                assert_eq!(path, bad);
                assert_eq!(source.line(), Some(2));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn should_report_skipped_lines_when_lenient() {
        let dir = TempDir::new().unwrap();
        let bad = write(
            &dir,
            "bad.dly",
            &["short".to_string(), dly_line("BBB00000002", 3, "TMIN", -15)],
        );

        let files = deserialise_files(
            vec![bad],
            &DailyFileParser::new(),
            ParseMode::Lenient,
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

        assert_eq!(files[0].records.len(), 31);
        assert_eq!(files[0].records[0].value, Some(-15));
        assert_eq!(files[0].skipped.len(), 1);
        assert_eq!(files[0].skipped[0].line, 1);
    }
}
