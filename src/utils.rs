use anyhow::{Result, anyhow};
use log::trace;

/// Extra fractional digits printed when checking whether a value sits exactly
/// on a rounding midpoint. Enough to expose the exact binary expansion.
const TIE_PROBE_DIGITS: usize = 40;

/// Magnitude from which numbers are printed in exponent form.
const EXPONENT_FORM_THRESHOLD: f64 = 1e21;

/// Output style of [`format_duration`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum DurationMode {
    /// Labeled segments, e.g. `1 hours 5 min 30 sec`.
    #[default]
    Units,
    /// Zero-padded clock notation, e.g. `01:05:30`.
    Normal,
    /// No explicit mode. Rendered like [`DurationMode::Normal`].
    None,
}

/// Prints a number the way a display layer expects to see it:
/// `NaN`, `Infinity`, no negative zero and exponent form for huge values.
fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.abs() >= EXPONENT_FORM_THRESHOLD {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }
    format!("{}", value)
}

/// Adds one unit in the last place of an unsigned decimal string.
fn increment_last_digit(digits: &str) -> String {
    let mut chars: Vec<char> = digits.chars().collect();
    for c in chars.iter_mut().rev() {
        match *c {
            '.' => continue,
            '9' => *c = '0',
            d => {
                *c = char::from_digit(d.to_digit(10).unwrap_or(0) + 1, 10).unwrap_or(d);
                return chars.into_iter().collect();
            }
        }
    }
    // Carried out of the most significant digit
    let mut carried = String::with_capacity(chars.len() + 1);
    carried.push('1');
    carried.extend(chars);
    carried
}

/// Rounds `value` to `digits` decimal places.
///
/// Unlike `format!("{:.N}")`, which breaks exact ties towards the even digit,
/// ties are rounded away from zero (`2.5` -> `"3"`, `1.125` -> `"1.13"`).
/// Negative values keep their sign even when they round to zero, and
/// non-finite or huge values are printed as plain numbers.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() || value.abs() >= EXPONENT_FORM_THRESHOLD {
        return number_to_string(value);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    let exact = format!("{:.*}", digits + TIE_PROBE_DIGITS, magnitude);
    let (integer, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let is_tie = fraction[digits..].starts_with('5')
        && fraction[digits + 1..].bytes().all(|b| b == b'0');

    let rounded = if is_tie {
        let truncated = if digits == 0 {
            integer.to_string()
        } else {
            format!("{}.{}", integer, &fraction[..digits])
        };
        increment_last_digit(&truncated)
    } else {
        format!("{:.*}", digits, magnitude)
    };

    format!("{}{}", sign, rounded)
}

/// Pads a clock segment with a leading zero when its numeric value is below 10.
fn pad_clock_segment(segment: &str) -> String {
    match segment.parse::<f64>() {
        Ok(value) if value < 10.0 => format!("0{}", segment),
        _ => segment.to_string(),
    }
}

/// Formats a duration in seconds, either as labeled segments
/// (`1 hours 2 min 5 sec`) or as clock notation (`01:02:05`).
///
/// The hours segment is left out entirely when there are no whole hours.
/// Seconds keep their fraction and are rounded to `digits` decimal places.
pub fn format_duration(time: f64, mode: DurationMode, digits: usize) -> String {
    let hours = (time / 3600.0).floor();
    let minutes = ((time - hours * 3600.0) / 60.0).floor();
    let seconds = time - hours * 3600.0 - minutes * 60.0;

    let mut parts = vec![
        (number_to_string(hours), "hours"),
        (number_to_string(minutes), "min"),
        (to_fixed(seconds, digits), "sec"),
    ];

    if hours == 0.0 || hours.is_nan() {
        parts.remove(0);
    }

    trace!("Formatting {} seconds as {:?} ({} digits)", time, mode, digits);
    match mode {
        DurationMode::Units => parts
            .iter()
            .map(|(value, unit)| format!("{} {}", value, unit))
            .collect::<Vec<_>>()
            .join(" "),
        DurationMode::Normal | DurationMode::None => parts
            .iter()
            .map(|(value, _)| pad_clock_segment(value))
            .collect::<Vec<_>>()
            .join(":"),
    }
}

/// Formats the average speed in km/h with one decimal.
/// A zero duration yields `0.0 km/h`.
pub fn format_speed(meters: f64, seconds: f64) -> String {
    let kmh = if seconds == 0.0 {
        0.0
    } else {
        (meters / seconds) * 3.6
    };
    format!("{} km/h", to_fixed(kmh, 1))
}

/// Rounds `value` to `fixed_digits` decimals and groups the integer digits
/// by thousands, e.g. `1234567` -> `1,234,567`.
pub fn format_with_thousands_separator(value: f64, fixed_digits: usize) -> String {
    let fixed = to_fixed(value, fixed_digits);

    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    // NaN, Infinity and exponent forms have nothing to group
    if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
        return fixed;
    }

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

/// Parses a clock time like `2:00:25`, `1:40.91` or `9.58` into seconds.
///
/// Up to three `:`-separated parts are accepted. Only the last part may have
/// a fraction; minutes and seconds following another part must be below 60.
pub fn parse_clock_time(time_str: &str) -> Result<f64> {
    let trimmed = time_str.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty time value"));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(anyhow!(
            "Invalid time format. Expected [[H:]MM:]SS[.ff], got: {}",
            time_str
        ));
    }

    let (last, leading) = parts
        .split_last()
        .ok_or_else(|| anyhow!("Invalid time format: {}", time_str))?;

    let seconds: f64 = last
        .parse()
        .map_err(|_| anyhow!("Invalid seconds value: {}", last))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(anyhow!("Seconds value must be a positive number, got: {}", last));
    }
    if !leading.is_empty() && seconds >= 60.0 {
        return Err(anyhow!("Seconds value must be below 60, got: {}", last));
    }

    let names: &[&str] = if leading.len() == 2 {
        &["hour", "minute"]
    } else {
        &["minute"]
    };

    let mut total = 0.0;
    for (index, (part, name)) in leading.iter().zip(names).enumerate() {
        let value: u64 = part
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", name, part))?;
        if index > 0 && value >= 60 {
            return Err(anyhow!("{} value must be below 60, got: {}", name, value));
        }
        total = total * 60.0 + value as f64;
    }

    Ok(total * 60.0 + seconds)
}
