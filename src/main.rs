use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use log::{LevelFilter, debug, info, warn};
use pace::{OutputFormat, PaceReport};

pub mod pace;
pub mod records;
pub mod utils;

#[derive(Parser)]
#[command(
    name = "pacecalc",
    version,
    about = "Pace calculator: shows how fast you need to run on average to reach a time goal, with projected lap times and world-record reference times."
)]
struct Cli {
    /// Output style. Use "none" to not display anything.
    #[arg(short, long, default_value = "plain")]
    output_format: OutputFormat,

    /// Set the log level.
    #[arg(short, long, default_value = "warn")]
    log_level: CliLevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the required pace, speed and lap times for a distance and a goal time.
    Pace {
        /// Distance in meters, or one of marathon, half-marathon, mile
        #[arg(short, long, env = "PACE_METERS")]
        meters: Option<String>,

        /// Goal time as [[H:]MM:]SS[.ff]
        #[arg(short, long, env = "PACE_TIME")]
        time: Option<String>,

        /// Use distance and time of a reference entry (key as listed by `records -o csv`)
        #[arg(short, long)]
        record: Option<String>,
    },

    /// List world-record reference times.
    Records {
        /// Only list one distance category, fastest first
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
enum CliLevelFilter {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLevelFilter> for LevelFilter {
    fn from(value: CliLevelFilter) -> Self {
        match value {
            CliLevelFilter::Off => LevelFilter::Off,
            CliLevelFilter::Error => LevelFilter::Error,
            CliLevelFilter::Warn => LevelFilter::Warn,
            CliLevelFilter::Info => LevelFilter::Info,
            CliLevelFilter::Debug => LevelFilter::Debug,
            CliLevelFilter::Trace => LevelFilter::Trace,
        }
    }
}

/// Resolves distance (meters) and time (seconds) from the command line.
/// Inputs that are not given count as 0, i.e. not entered yet.
fn resolve_inputs(
    meters: Option<&str>,
    time: Option<&str>,
    record: Option<&str>,
) -> Result<(f64, f64)> {
    if let Some(key) = record {
        if meters.is_some() || time.is_some() {
            warn!("Using distance and time of reference entry, ignoring --meters and --time");
        }
        let entry = records::reference_entry(key)
            .ok_or_else(|| anyhow!("Unknown reference entry: {}", key))?;
        debug!("Using reference entry {}", entry.key());
        return Ok((entry.distance_meters()?, entry.seconds()?));
    }

    let meters = meters.map(records::parse_distance).transpose()?.unwrap_or(0.0);
    let seconds = time.map(utils::parse_clock_time).transpose()?.unwrap_or(0.0);
    Ok((meters, seconds))
}

fn print_output(output: &str) {
    if !output.is_empty() {
        println!("{}", output);
    }
}

fn print_pace(
    cli: &Cli,
    meters: Option<&str>,
    time: Option<&str>,
    record: Option<&str>,
) -> Result<()> {
    let (meters, seconds) = resolve_inputs(meters, time, record)?;
    let report = PaceReport::new(meters, seconds);
    print_output(&report.render(&cli.output_format)?);
    Ok(())
}

fn print_records(cli: &Cli, category: Option<&str>) -> Result<()> {
    let entries = match category {
        Some(category) => records::records_for_category(category),
        None => records::reference_entries(),
    };
    if entries.is_empty() {
        warn!("No reference entries found");
    }
    print_output(&records::render_entries(&entries, &cli.output_format)?);
    Ok(())
}

fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    // Initialize the logger with appropriate verbosity
    env_logger::Builder::new()
        .filter_level(cli.log_level.into())
        .init();

    info!("Starting pace calculator");

    match &cli.command {
        Commands::Pace {
            meters,
            time,
            record,
        } => {
            debug!("Executing Pace command");
            print_pace(&cli, meters.as_deref(), time.as_deref(), record.as_deref())?
        }
        Commands::Records { category } => {
            debug!("Executing Records command");
            print_records(&cli, category.as_deref())?
        }
    }

    info!("Pace calculator completed");
    Ok(())
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_inputs() {
        assert_eq!(
            resolve_inputs(Some("10000"), Some("40:00"), None).unwrap(),
            (10000.0, 2400.0)
        );
        assert_eq!(
            resolve_inputs(Some("marathon"), Some("2:00:25"), None).unwrap(),
            (42195.0, 7225.0)
        );
        assert_eq!(resolve_inputs(None, None, None).unwrap(), (0.0, 0.0));
        assert!(resolve_inputs(Some("far"), None, None).is_err());
        assert!(resolve_inputs(None, Some("soon"), None).is_err());
    }

    #[test]
    fn test_resolve_inputs_from_record() {
        let (meters, seconds) =
            resolve_inputs(None, None, Some("100|9.58|Mens WR 100 m Usain Bolt")).unwrap();
        assert_eq!(meters, 100.0);
        assert_eq!(seconds, 9.58);

        // The record takes precedence over explicit inputs
        let (meters, _) = resolve_inputs(
            Some("5000"),
            None,
            Some("100|9.58|Mens WR 100 m Usain Bolt"),
        )
        .unwrap();
        assert_eq!(meters, 100.0);

        assert!(resolve_inputs(None, None, Some("100|9.00|Nobody")).is_err());
    }
}
