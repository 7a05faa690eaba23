use crate::utils::{self, DurationMode};
use anyhow::Result;
use clap::ValueEnum;
use log::{debug, trace};
use serde::Serialize;

/// Lap distances (meters) projected from the goal pace.
pub const PREDEFINED_LAPS: [u32; 9] = [10000, 5000, 3000, 1500, 1000, 800, 400, 200, 100];

const TRACK_LAP_METERS: u32 = 400;
const KILOMETER_METERS: u32 = 1000;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum OutputFormat {
    None,
    Json,
    JsonPretty,
    Csv,
    Plain,
}

/// Laps worth calling out in the lap table.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LapHighlight {
    /// One lap of a regular track
    TrackLap,
    /// Kilometer split
    Kilometer,
}

impl LapHighlight {
    fn for_distance(meters: u32) -> Option<Self> {
        match meters {
            TRACK_LAP_METERS => Some(Self::TrackLap),
            KILOMETER_METERS => Some(Self::Kilometer),
            _ => None,
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::TrackLap => "track lap",
            Self::Kilometer => "km split",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LapTime {
    pub meters: u32,
    /// Lap distance for display, e.g. `1,500 m`
    pub distance: String,
    pub time: String,
    /// Precise time, e.g. `240.00 seconds`
    pub tooltip: String,
    pub scaled_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<LapHighlight>,
}

/// Everything shown for a distance and a goal time.
#[derive(Debug, Clone, Serialize)]
pub struct PaceReport {
    pub distance: String,
    pub time: String,
    pub pace: String,
    pub speed: String,
    pub required_pace: String,
    pub laps: Vec<LapTime>,
    pub is_missing_inputs: bool,
}

/// Zero and NaN count as "not entered".
fn is_unset(value: f64) -> bool {
    value == 0.0 || value.is_nan()
}

/// Distance used as divisor. Guards against a distance that is not entered yet,
/// at the cost of a misleadingly small pace.
fn guarded_meters(meters: f64) -> f64 {
    meters.max(1.0)
}

pub fn is_missing_inputs(meters: f64, seconds: f64) -> bool {
    is_unset(meters) || is_unset(seconds)
}

/// Seconds needed for `lap_meters` when covering `meters` in `seconds`.
pub fn scaled_seconds(meters: f64, seconds: f64, lap_meters: f64) -> f64 {
    (seconds * lap_meters) / guarded_meters(meters)
}

/// Time per kilometer in clock notation, e.g. `04:00`.
pub fn required_pace(meters: f64, seconds: f64) -> String {
    utils::format_duration(scaled_seconds(meters, seconds, 1000.0), DurationMode::Normal, 0)
}

pub fn lap_times(meters: f64, seconds: f64) -> Vec<LapTime> {
    PREDEFINED_LAPS
        .iter()
        .map(|&lap_meters| {
            let scaled = scaled_seconds(meters, seconds, lap_meters as f64);
            trace!("Lap {} m takes {} seconds", lap_meters, scaled);
            LapTime {
                meters: lap_meters,
                distance: format!(
                    "{} m",
                    utils::format_with_thousands_separator(lap_meters as f64, 0)
                ),
                time: utils::format_duration(scaled, DurationMode::Units, 0),
                tooltip: format!("{} seconds", utils::to_fixed(scaled, 2)),
                scaled_seconds: scaled,
                highlight: LapHighlight::for_distance(lap_meters),
            }
        })
        .collect()
}

impl PaceReport {
    pub fn new(meters: f64, seconds: f64) -> Self {
        debug!("Calculating pace for {} m in {} seconds", meters, seconds);
        let pace = required_pace(meters, seconds);
        let speed = utils::format_speed(meters, seconds);
        let is_missing_inputs = is_missing_inputs(meters, seconds);
        if is_missing_inputs {
            debug!("Distance or time not entered, report is a placeholder");
        }

        Self {
            distance: format!("{} m", utils::format_with_thousands_separator(meters, 0)),
            time: utils::format_duration(seconds, DurationMode::Normal, 2),
            required_pace: format!("{} min/km ({})", pace, speed),
            pace,
            speed,
            laps: lap_times(meters, seconds),
            is_missing_inputs,
        }
    }

    /// Renders the report in the requested output format.
    /// `OutputFormat::None` renders nothing.
    pub fn render(&self, format: &OutputFormat) -> Result<String> {
        let output = match format {
            // Compact JSON format (single line without whitespace)
            OutputFormat::Json => serde_json::to_string(&self)?,
            // Pretty-printed JSON format (with indentation and newlines)
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&self)?,
            // CSV format (lap,time,seconds), one row per lap
            OutputFormat::Csv => {
                let mut lines = vec!["lap,time,seconds".to_string()];
                lines.extend(self.laps.iter().map(|lap| {
                    format!(
                        "{},{},{}",
                        lap.meters,
                        lap.time,
                        utils::to_fixed(lap.scaled_seconds, 2)
                    )
                }));
                lines.join("\n")
            }
            OutputFormat::Plain => self.to_plain(),
            OutputFormat::None => String::new(),
        };
        Ok(output)
    }

    fn to_plain(&self) -> String {
        let mut lines = Vec::new();
        if self.is_missing_inputs {
            lines.push("Enter a distance and a time to calculate the required pace.".to_string());
            lines.push(String::new());
        }

        lines.push(format!("{:<15}{}", "Distance", self.distance));
        lines.push(format!("{:<15}{}", "Time", self.time));
        lines.push(format!("{:<15}{}", "Required pace", self.required_pace));
        lines.push(String::new());
        lines.push(format!("{:<10}{}", "Lap", "Time"));

        for lap in &self.laps {
            let line = format!("{:<10}~ {}", lap.distance, lap.time);
            lines.push(match lap.highlight {
                Some(highlight) => format!("{:<32}({})", line, highlight.description()),
                None => line,
            });
        }
        lines.join("\n")
    }
}
