//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use ghcnd::{download::DEFAULT_BASE_URL, BoundingBox, Config, FilterCriteria};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory for downloaded archive files
    #[arg(long, global = true, env = "GHCND_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Root URL of the GHCN-Daily archive
    #[arg(long, global = true, env = "GHCND_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Download files again even if they are already present
    #[arg(long, global = true)]
    pub overwrite: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn config(&self) -> Config {
        let mut config = Config {
            base_url: self.base_url.clone(),
            overwrite: self.overwrite,
            ..Config::default()
        };
        if let Some(dir) = &self.data_dir {
            config.data_dir.clone_from(dir);
        }

        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter the station inventory
    Inventory {
        #[command(flatten)]
        filters: FilterArgs,
        /// Write matching rows to this parquet file instead of printing ids
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show station metadata
    Stations {
        /// Station ids to look up
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
    },
    /// Get daily data for every station matching the filters
    Daily {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        options: DecodeArgs,
    },
    /// Get daily data for one station
    Station {
        /// Station id, e.g. USW00094728
        id: String,
        /// Only decode this element
        #[arg(long)]
        element: Option<String>,
        #[command(flatten)]
        options: DecodeArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Two-letter country code (station id prefix)
    #[arg(long)]
    pub country: Option<String>,
    /// Element code, e.g. PRCP or TMAX
    #[arg(long)]
    pub element: Option<String>,
    /// Stations must report in or after this year
    #[arg(long)]
    pub min_year: Option<i32>,
    /// Stations must report in or before this year
    #[arg(long)]
    pub max_year: Option<i32>,
    /// LAT_MIN,LAT_MAX,LON_MIN,LON_MAX
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    pub bbox: Option<BoundingBox>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            country: args.country,
            element: args.element,
            min_year: args.min_year,
            max_year: args.max_year,
            bounding_box: args.bbox,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct DecodeArgs {
    /// Skip malformed lines instead of failing
    #[arg(long)]
    pub lenient: bool,
    /// Drop days that do not exist in their month
    #[arg(long)]
    pub calendar: bool,
    /// Output parquet file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate: {}", e))?;

    match parts.as_slice() {
        [lat_min, lat_max, lon_min, lon_max] if lat_min <= lat_max && lon_min <= lon_max => {
            Ok(BoundingBox::new(*lat_min, *lat_max, *lon_min, *lon_max))
        }
        [_, _, _, _] => Err("minimum must not exceed maximum".to_string()),
        _ => Err("expected LAT_MIN,LAT_MAX,LON_MIN,LON_MAX".to_string()),
    }
}

/// Set up structured logging on stderr.
pub fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ghcnd={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    let bar = ProgressBar::new(size).with_message(message);
    if let Ok(style) = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("##-"));
    }

    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_bbox() {
        let bbox = parse_bbox("40,55,-10.5,80").unwrap();
        assert_eq!(bbox, BoundingBox::new(40.0, 55.0, -10.5, 80.0));

        assert!(parse_bbox("40,55,60").is_err());
        assert!(parse_bbox("55,40,60,80").is_err());
        assert!(parse_bbox("a,b,c,d").is_err());
    }

    #[test]
    fn should_parse_daily_command() {
        let cli = Cli::parse_from([
            "ghcnd",
            "daily",
            "--country",
            "KZ",
            "--element",
            "PRCP",
            "--min-year",
            "1950",
            "--lenient",
            "--data-dir",
            "/tmp/ghcnd",
        ]);

        assert_eq!(cli.config().data_dir, PathBuf::from("/tmp/ghcnd"));
        match cli.command {
            Commands::Daily { filters, options } => {
                let criteria = FilterCriteria::from(filters);
                assert_eq!(criteria, FilterCriteria::new().country("KZ").element("PRCP").min_year(1950));
                assert!(options.lenient);
                assert!(!options.calendar);
            }
            _ => panic!("expected daily command"),
        }
    }

    #[test]
    fn should_convert_empty_filters_to_match_all() {
        assert_eq!(FilterCriteria::from(FilterArgs::default()), FilterCriteria::new());
    }
}
