use crate::pace::OutputFormat;
use crate::utils;
use anyhow::{Result, anyhow};
use log::{debug, trace};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

const MARATHON_METERS: f64 = 42195.0;
const HALF_MARATHON_METERS: f64 = 21097.5;
const MILE_METERS: f64 = 1609.344;

/// World-record reference times as `(distance category, time, label)`.
const REFERENCE_ENTRIES: [(&str, &str, &str); 29] = [
    // Men
    ("marathon", "2:00:25", "Mens Marathon Breaking2 Eliud Kipchoge"),
    ("marathon", "2:02:57", "Mens WR Marathon Dennis Kipruto Kimetto"),
    ("half-marathon", "58:23", "Mens WR Half marathon Zersenay Tadese"),
    ("10000", "26:17.53", "Mens WR 10,000 m Kenenisa Bekele"),
    ("5000", "12:37.35", "Mens WR 5000 m Kenenisa Bekele"),
    ("3000", "7:53.63", "Mens WR 3000 m steeplechase Saif Saaeed Shaheen"),
    ("3000", "7:20.67", "Mens WR 3000 m Daniel Komen"),
    ("mile", "3:43.13", "Mens WR Mile Hicham El Guerrouj"),
    ("1500", "3:26.00", "Mens WR 1500 m Hicham El Guerrouj"),
    ("800", "1:40.91", "Mens WR 800 m David Rudisha"),
    ("400", "46.78", "Mens WR 400 m hurdles Kevin Young"),
    ("400", "43.03", "Mens WR 400 m Wayde van Niekerk"),
    ("200", "19.19", "Mens WR 200 m Usain Bolt"),
    ("110", "12.80", "Mens WR 110 m hurdles Aries Meritt"),
    ("100", "9.58", "Mens WR 100 m Usain Bolt"),
    // Women
    ("marathon", "2:15:25", "Womens WR Marathon Paula Radcliffe (Mx)"),
    (
        "half-marathon",
        "1:04:51",
        "Womens WR Half marathon Joyciline Jepkosgei (Mx)",
    ),
    ("10000", "29:17.45", "Womens WR 10,000 m Almaz Ayana"),
    ("5000", "14:11.15", "Womens WR 5000 m Tirunesh Dibaba"),
    ("3000", "8:44.32", "Womens WR 3000 m steeplechase Beatrice Chepkoech"),
    ("3000", "8:06.11", "Womens WR 3000 m Wang Junxia"),
    ("mile", "4:12.56", "Womens WR Mile Svetlana Masterkova"),
    ("1500", "3:50.07", "Womens WR 1500 m Genzebe Dibaba"),
    ("800", "1:53.28", "Womens WR 800 m Jarmila Kratochvílová"),
    ("400", "42.34", "Womens WR 400 m hurdles Yuliya Pechonkina"),
    ("400", "47.60", "Womens WR 400 m Marita Koch"),
    ("200", "21.34", "Womens WR 200 m Florence Griffith Joyner"),
    ("100", "12.20", "Womens WR 100 m hurdles Kendra Harrison"),
    ("100", "10.49", "Womens WR 100 m Florence Griffith Joyner"),
];

/// Reference table keyed by `distance|time|label`, built on first access.
pub static REFERENCE_TABLE: LazyLock<HashMap<String, ReferenceEntry>> =
    LazyLock::new(|| build_reference_table(&REFERENCE_ENTRIES));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEntry {
    pub distance_category: String,
    pub time: String,
    pub label: String,
}

impl ReferenceEntry {
    pub fn new(distance_category: &str, time: &str, label: &str) -> Self {
        Self {
            distance_category: distance_category.to_string(),
            time: time.to_string(),
            label: label.to_string(),
        }
    }

    /// Composite key identifying the entry in the reference table.
    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.distance_category, self.time, self.label)
    }

    pub fn distance_meters(&self) -> Result<f64> {
        category_meters(&self.distance_category).ok_or_else(|| {
            anyhow!(
                "Unknown distance category: {}",
                self.distance_category
            )
        })
    }

    /// Record time in seconds
    pub fn seconds(&self) -> Result<f64> {
        utils::parse_clock_time(&self.time)
    }
}

/// Builds the reference table from `(distance category, time, label)` triples.
/// Entries sharing a key overwrite each other, the last one wins.
pub fn build_reference_table(entries: &[(&str, &str, &str)]) -> HashMap<String, ReferenceEntry> {
    let mut table = HashMap::with_capacity(entries.len());
    for (distance_category, time, label) in entries {
        let entry = ReferenceEntry::new(distance_category, time, label);
        trace!("Adding reference entry {}", entry.key());
        table.insert(entry.key(), entry);
    }
    debug!("Built reference table with {} entries", table.len());
    table
}

pub fn reference_entry(key: &str) -> Option<&'static ReferenceEntry> {
    REFERENCE_TABLE.get(key)
}

/// All reference entries in their source order.
pub fn reference_entries() -> Vec<&'static ReferenceEntry> {
    REFERENCE_ENTRIES
        .iter()
        .filter_map(|(distance_category, time, label)| {
            reference_entry(&format!("{}|{}|{}", distance_category, time, label))
        })
        .collect()
}

/// Entries of one distance category, fastest first.
pub fn records_for_category(category: &str) -> Vec<&'static ReferenceEntry> {
    let mut matching: Vec<&ReferenceEntry> = REFERENCE_TABLE
        .values()
        .filter(|entry| entry.distance_category.eq_ignore_ascii_case(category))
        .collect();
    matching.sort_by(|a, b| {
        let a_seconds = a.seconds().unwrap_or(f64::INFINITY);
        let b_seconds = b.seconds().unwrap_or(f64::INFINITY);
        a_seconds.total_cmp(&b_seconds)
    });
    debug!("Found {} entries for category {}", matching.len(), category);
    matching
}

/// Resolves a distance category to meters. Numeric categories are meters.
pub fn category_meters(category: &str) -> Option<f64> {
    match category.to_ascii_lowercase().as_str() {
        "marathon" => Some(MARATHON_METERS),
        "half-marathon" => Some(HALF_MARATHON_METERS),
        "mile" => Some(MILE_METERS),
        other => other
            .parse::<f64>()
            .ok()
            .filter(|meters| meters.is_finite() && *meters >= 0.0),
    }
}

/// Parses a distance given in meters or as a named category (`marathon`, `mile`, ...).
pub fn parse_distance(distance_str: &str) -> Result<f64> {
    let trimmed = distance_str.trim();
    category_meters(trimmed).ok_or_else(|| {
        anyhow!(
            "Invalid distance. Expected meters or one of marathon, half-marathon, mile, got: {}",
            distance_str
        )
    })
}

/// Renders reference entries in the requested output format.
pub fn render_entries(entries: &[&ReferenceEntry], format: &OutputFormat) -> Result<String> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string(entries)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(entries)?,
        // Labels may contain commas, so text fields are quoted
        OutputFormat::Csv => {
            let mut lines = vec!["key,distance,time,label".to_string()];
            lines.extend(entries.iter().map(|entry| {
                format!(
                    "{},{},{},{}",
                    csv_quote(&entry.key()),
                    entry.distance_category,
                    entry.time,
                    csv_quote(&entry.label)
                )
            }));
            lines.join("\n")
        }
        OutputFormat::Plain => entries
            .iter()
            .map(|entry| {
                format!(
                    "{:<15}{:>9}  {}",
                    entry.distance_category, entry.time, entry.label
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::None => String::new(),
    };
    Ok(output)
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_table_is_complete() {
        assert_eq!(REFERENCE_TABLE.len(), 29);
        assert_eq!(reference_entries().len(), 29);
    }

    #[test]
    fn test_reference_table_lookup_by_key() {
        let entry = reference_entry("100|9.58|Mens WR 100 m Usain Bolt").unwrap();
        assert_eq!(entry.distance_category, "100");
        assert_eq!(entry.time, "9.58");
        assert_eq!(entry.label, "Mens WR 100 m Usain Bolt");
        assert_eq!(entry.key(), "100|9.58|Mens WR 100 m Usain Bolt");

        assert!(reference_entry("100|9.58").is_none());
    }

    #[test]
    fn test_build_reference_table_last_write_wins() {
        let table = build_reference_table(&[
            ("400", "43.03", "Mens WR 400 m"),
            ("400", "47.60", "Womens WR 400 m"),
            ("400", "43.03", "Mens WR 400 m"),
        ]);
        assert_eq!(table.len(), 2);
        assert!(table.contains_key("400|43.03|Mens WR 400 m"));
    }

    #[test]
    fn test_build_reference_table_empty() {
        assert!(build_reference_table(&[]).is_empty());
    }

    #[test]
    fn test_reference_entries_keep_source_order() {
        let entries = reference_entries();
        assert_eq!(entries[0].label, "Mens Marathon Breaking2 Eliud Kipchoge");
        assert_eq!(
            entries[28].label,
            "Womens WR 100 m Florence Griffith Joyner"
        );
    }

    #[test]
    fn test_all_entries_resolve_to_distance_and_time() {
        for entry in reference_entries() {
            assert!(entry.distance_meters().unwrap() > 0.0, "{}", entry.key());
            assert!(entry.seconds().unwrap() > 0.0, "{}", entry.key());
        }
    }

    #[test]
    fn test_records_for_category() {
        let records = records_for_category("400");
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].label, "Womens WR 400 m hurdles Yuliya Pechonkina");
        assert_eq!(records[3].label, "Womens WR 400 m Marita Koch");

        let marathons = records_for_category("Marathon");
        assert_eq!(marathons.len(), 3);
        assert_eq!(marathons[0].time, "2:00:25");

        assert!(records_for_category("42").is_empty());
    }

    #[test]
    fn test_entry_seconds_and_meters() {
        let entry = reference_entry("marathon|2:00:25|Mens Marathon Breaking2 Eliud Kipchoge")
            .unwrap();
        assert_eq!(entry.seconds().unwrap(), 7225.0);
        assert_eq!(entry.distance_meters().unwrap(), 42195.0);

        let unknown = ReferenceEntry::new("ultra", "6:00:00", "Somebody");
        assert!(unknown.distance_meters().is_err());
    }

    #[test]
    fn test_parse_distance() {
        assert_eq!(parse_distance("10000").unwrap(), 10000.0);
        assert_eq!(parse_distance(" 1500.5 ").unwrap(), 1500.5);
        assert_eq!(parse_distance("marathon").unwrap(), 42195.0);
        assert_eq!(parse_distance("Half-Marathon").unwrap(), 21097.5);
        assert_eq!(parse_distance("mile").unwrap(), 1609.344);
        assert!(parse_distance("ultra").is_err());
        assert!(parse_distance("-100").is_err());
        assert!(parse_distance("").is_err());
    }

    #[test]
    fn test_render_entries() {
        let entries = records_for_category("100");

        let csv = render_entries(&entries, &OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "key,distance,time,label");
        assert_eq!(
            lines[1],
            "\"100|9.58|Mens WR 100 m Usain Bolt\",100,9.58,\"Mens WR 100 m Usain Bolt\""
        );

        let json = render_entries(&entries, &OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["distance_category"], "100");
        assert_eq!(parsed[0]["time"], "9.58");

        let plain = render_entries(&entries, &OutputFormat::Plain).unwrap();
        assert_eq!(plain.lines().count(), 3);
        assert!(plain.starts_with("100"));

        assert!(render_entries(&entries, &OutputFormat::None).unwrap().is_empty());
    }
}
