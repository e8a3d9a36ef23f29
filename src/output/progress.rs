//! ffmpeg status line parsing

use crate::output::ExportProgress;
use crate::utils::time::TimeParser;

/// Parse an ffmpeg stderr status line.
///
/// Example: `frame=  123 fps= 60 q=28.0 size=  1024kB time=00:01:02.05 speed=1.50x`.
/// Returns `None` for lines that carry no `time=` field.
pub fn parse_progress(line: &str, total_secs: f64) -> Option<ExportProgress> {
    if !line.contains("time=") {
        return None;
    }

    let frame = extract_value(line, "frame=")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let fps = extract_value(line, "fps=")
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0);
    let speed = extract_value(line, "speed=").unwrap_or_default();
    let time = extract_value(line, "time=")
        .and_then(|v| TimeParser::new().parse_time(&v).ok())
        .unwrap_or(0.0);

    let percent = if total_secs > 0.0 {
        (time / total_secs * 100.0).min(100.0)
    } else {
        0.0
    };

    let speed_factor = speed.trim_end_matches('x').parse::<f64>().unwrap_or(0.0);
    let eta_seconds = if speed_factor > 0.0 && total_secs > time {
        Some((total_secs - time) / speed_factor)
    } else {
        None
    };

    Some(ExportProgress {
        time,
        percent,
        frame,
        fps,
        speed,
        eta_seconds,
    })
}

/// Value following `key`, up to the next whitespace
fn extract_value(line: &str, key: &str) -> Option<String> {
    let start = line.find(key)? + key.len();
    let rest = line[start..].trim_start();
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let value = &rest[..end];
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_yields_progress() {
        let line = "frame=  150 fps= 30 q=28.0 size=    1024kB time=00:00:05.00 bitrate= 200.0kbits/s speed=1.50x";
        let progress = parse_progress(line, 10.0).unwrap();

        assert_eq!(progress.frame, 150);
        assert!((progress.fps - 30.0).abs() < 0.01);
        assert!((progress.time - 5.0).abs() < 1e-9);
        assert!((progress.percent - 50.0).abs() < 0.1);
        assert_eq!(progress.speed, "1.50x");
        assert!((progress.eta_seconds.unwrap() - 3.33).abs() < 0.1);
    }

    #[test]
    fn other_lines_are_ignored() {
        assert!(parse_progress("Input #0, mov,mp4,m4a", 10.0).is_none());
        assert!(parse_progress("Stream #0:0: Video: h264", 10.0).is_none());
        assert!(parse_progress("", 10.0).is_none());
    }

    #[test]
    fn unknown_total_gives_zero_percent() {
        let progress = parse_progress("frame=  10 fps= 30 time=00:00:01.00 speed=1.00x", 0.0).unwrap();
        assert_eq!(progress.percent, 0.0);
        assert_eq!(progress.eta_seconds, None);
    }

    #[test]
    fn unparsable_time_counts_as_zero() {
        let progress = parse_progress("frame=    0 fps=0.0 time=N/A speed=N/A", 10.0).unwrap();
        assert_eq!(progress.time, 0.0);
        assert_eq!(progress.eta_seconds, None);
    }

    #[test]
    fn percent_is_capped() {
        let progress = parse_progress("time=00:00:12.00 speed=2.0x", 10.0).unwrap();
        assert_eq!(progress.percent, 100.0);
    }

    #[test]
    fn extract_value_skips_padding() {
        let line = "frame=  150 fps= 30.0 time=00:00:05.00 speed=1.50x";
        assert_eq!(extract_value(line, "fps=").unwrap(), "30.0");
        assert_eq!(extract_value(line, "missing="), None);
    }
}
