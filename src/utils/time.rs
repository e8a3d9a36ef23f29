//! Time parsing and formatting utilities

use crate::error::{ReelError, ReelResult};

/// Time parser for the formats accepted on the command line
pub struct TimeParser;

impl TimeParser {
    /// Create a new time parser
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeParser {
    /// Parse `SS.ms`, `MM:SS.ms` or `HH:MM:SS.ms` to seconds
    pub fn parse_time(&self, time_str: &str) -> ReelResult<f64> {
        let time_str = time_str.trim();
        let invalid = || ReelError::InvalidTimeFormat {
            time: time_str.to_string(),
        };

        let parts: Vec<&str> = time_str.split(':').collect();
        if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }

        // Seconds may be fractional; hour and minute fields may not
        let (last, leading) = parts.split_last().ok_or_else(invalid)?;
        let seconds: f64 = last.parse().map_err(|_| invalid())?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid());
        }
        if !leading.is_empty() && seconds >= 60.0 {
            return Err(invalid());
        }

        let mut total = seconds;
        for (i, field) in leading.iter().rev().enumerate() {
            let value: u32 = field.parse().map_err(|_| invalid())?;
            if i == 0 && leading.len() == 2 && value >= 60 {
                return Err(invalid());
            }
            total += value as f64 * 60f64.powi(i as i32 + 1);
        }

        Ok(total)
    }

    /// Format seconds to HH:MM:SS.ms string
    pub fn format_time(&self, seconds: f64) -> String {
        let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                hours, minutes, secs, milliseconds
            )
        } else {
            format!("{:02}:{:02}.{:03}", minutes, secs, milliseconds)
        }
    }
}

/// Seconds as filter argument text, millisecond precision
pub fn secs(value: f64) -> String {
    format!("{:.3}", clean_zero(value))
}

/// Ratio as filter argument text.
///
/// Keeps six decimals of precision but drops trailing zeros, so `2.0`
/// renders as `2.0` and `1.5` as `1.5`.
pub fn factor(value: f64) -> String {
    let text = format!("{:.6}", clean_zero(value));
    let trimmed = text.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

// avoids "-0.000" in generated text
fn clean_zero(value: f64) -> f64 {
    if value.abs() < 5e-7 {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_formats() {
        let parser = TimeParser::new();
        assert_eq!(parser.parse_time("90.5").unwrap(), 90.5);
        assert_eq!(parser.parse_time("01:30").unwrap(), 90.0);
        assert_eq!(parser.parse_time("01:30.500").unwrap(), 90.5);
        assert_eq!(parser.parse_time("1:02:03.5").unwrap(), 3723.5);
    }

    #[test]
    fn rejects_malformed_times() {
        let parser = TimeParser::new();
        assert!(parser.parse_time("abc").is_err());
        assert!(parser.parse_time("-3").is_err());
        assert!(parser.parse_time("00:75").is_err());
        assert!(parser.parse_time("1:75:00").is_err());
        assert!(parser.parse_time("1:2:3:4").is_err());
        assert!(parser.parse_time("1::3").is_err());
    }

    #[test]
    fn formats_times() {
        let parser = TimeParser::new();
        assert_eq!(parser.format_time(90.5), "01:30.500");
        assert_eq!(parser.format_time(3723.25), "01:02:03.250");
    }

    #[test]
    fn filter_number_formatting() {
        assert_eq!(secs(5.0), "5.000");
        assert_eq!(secs(-0.0000001), "0.000");
        assert_eq!(factor(2.0), "2.0");
        assert_eq!(factor(1.5), "1.5");
        assert_eq!(factor(1.0 / 3.0), "0.333333");
    }
}
