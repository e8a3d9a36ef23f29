//! Export job description, command construction and progress parsing

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::CompiledGraph;
use crate::error::ReelError;

pub mod command;
pub mod progress;

/// Encoder settings, the `[export]` table of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// ffmpeg executable name or path
    pub ffmpeg: String,
    /// `auto` or an explicit encoder name
    pub video_codec: String,
    /// Constant quality for libx264 and `-cq` for hardware encoders
    pub crf: u8,
    /// libx264 preset
    pub preset: String,
    pub audio_bitrate: String,
    /// Encoder threads; 0 uses every core
    pub threads: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            video_codec: "auto".to_string(),
            crf: 23,
            preset: "fast".to_string(),
            audio_bitrate: "192k".to_string(),
            threads: 0,
        }
    }
}

impl ExportSettings {
    /// Thread count to hand to the encoder
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }

    /// Encoder pinned by configuration, `None` for auto-detection
    pub fn pinned_encoder(&self) -> Result<Option<VideoEncoder>, ReelError> {
        if self.video_codec.eq_ignore_ascii_case("auto") {
            return Ok(None);
        }
        self.video_codec.parse().map(Some)
    }
}

/// H.264 encoders in detection preference order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoEncoder {
    Nvenc,
    Qsv,
    Amf,
    X264,
}

impl VideoEncoder {
    /// Hardware encoders first, software fallback last
    pub const PREFERENCE: [VideoEncoder; 4] = [Self::Nvenc, Self::Qsv, Self::Amf, Self::X264];

    /// ffmpeg encoder name
    pub fn codec_name(self) -> &'static str {
        match self {
            Self::Nvenc => "h264_nvenc",
            Self::Qsv => "h264_qsv",
            Self::Amf => "h264_amf",
            Self::X264 => "libx264",
        }
    }

    pub fn is_hardware(self) -> bool {
        !matches!(self, Self::X264)
    }
}

impl fmt::Display for VideoEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codec_name())
    }
}

impl FromStr for VideoEncoder {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::PREFERENCE
            .into_iter()
            .find(|e| e.codec_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReelError::ConfigError {
                message: format!(
                    "unknown video codec '{}', expected auto, libx264, h264_nvenc, h264_qsv or h264_amf",
                    s
                ),
            })
    }
}

/// Everything needed to run one export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJob {
    pub graph: CompiledGraph,
    pub output_path: PathBuf,
    pub encoder: VideoEncoder,
    pub settings: ExportSettings,
}

/// One parsed ffmpeg status line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportProgress {
    /// Position in the output, seconds
    pub time: f64,
    /// Completion percentage (0.0 - 100.0)
    pub percent: f64,
    pub frame: u64,
    pub fps: f64,
    /// Raw speed text such as `1.50x`
    pub speed: String,
    /// Estimated seconds remaining
    pub eta_seconds: Option<f64>,
}

/// Outcome of a finished export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub output_path: PathBuf,
    pub encoder: VideoEncoder,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Rendered timeline length in seconds
    pub duration: f64,
}

impl ExportReport {
    /// Wall-clock time the export took
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
