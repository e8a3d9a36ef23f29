// Domain models - Core types and data structures

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;


/// Kind of media a clip was created from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Video,
    Audio,
}

/// A timed placement of a media source on a track.
///
/// Owned by the caller. The compiler only reads it. Optional fields carry the
/// defaults the editor writes for a freshly dropped clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRecord {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "path")]
    pub source_path: String,
    /// Lane index; lower is visually in front
    pub track: u32,
    /// Timeline position in seconds
    pub start: f64,
    /// Timeline extent in seconds
    #[serde(alias = "dur")]
    pub duration: f64,
    #[serde(default)]
    pub source_in: f64,
    #[serde(default)]
    pub source_duration: f64,
    #[serde(default = "unity")]
    pub speed: f64,
    /// Gain in percent
    #[serde(default = "full_volume")]
    pub volume: f64,
    #[serde(default)]
    pub crop_x1: f64,
    #[serde(default)]
    pub crop_y1: f64,
    #[serde(default = "unity")]
    pub crop_x2: f64,
    #[serde(default = "unity")]
    pub crop_y2: f64,
    #[serde(default = "unity")]
    pub scale_x: f64,
    #[serde(default = "unity")]
    pub scale_y: f64,
    #[serde(default)]
    pub pos_x: f64,
    #[serde(default)]
    pub pos_y: f64,
    #[serde(default = "unity")]
    pub opacity: f64,
    #[serde(default)]
    pub fade_in: f64,
    #[serde(default)]
    pub fade_out: f64,
    /// Seconds the first frame is held before the clip starts moving
    #[serde(default)]
    pub start_freeze: f64,
    /// Seconds the last frame is held at the end of the clip
    #[serde(default)]
    pub end_freeze: f64,
    #[serde(default)]
    pub media_type: MediaType,
    /// Decoded frame width as reported by probing; zero for audio-only sources
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "yes")]
    pub has_audio: bool,
    #[serde(default)]
    pub linked_uid: Option<String>,
    #[serde(default)]
    pub muted: bool,
    /// Voice-over clips duck every other clip they overlap
    #[serde(default)]
    pub priority: bool,
}

fn unity() -> f64 {
    1.0
}

fn full_volume() -> f64 {
    100.0
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn yes() -> bool {
    true
}

impl ClipRecord {
    /// Create a clip with editor defaults for everything but placement
    pub fn new(source_path: impl Into<String>, track: u32, start: f64, duration: f64) -> Self {
        Self {
            uid: String::new(),
            name: String::new(),
            source_path: source_path.into(),
            track,
            start,
            duration,
            source_in: 0.0,
            source_duration: duration,
            speed: 1.0,
            volume: 100.0,
            crop_x1: 0.0,
            crop_y1: 0.0,
            crop_x2: 1.0,
            crop_y2: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            pos_x: 0.0,
            pos_y: 0.0,
            opacity: 1.0,
            fade_in: 0.0,
            fade_out: 0.0,
            start_freeze: 0.0,
            end_freeze: 0.0,
            media_type: MediaType::Video,
            width: 1920,
            height: 1080,
            has_audio: true,
            linked_uid: None,
            muted: false,
            priority: false,
        }
    }

    /// Builder-style uid assignment
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Timeline end in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Timeline span in which the source plays, between the freeze holds
    pub fn motion(&self) -> (f64, f64) {
        (self.start + self.start_freeze, self.end() - self.end_freeze)
    }

    /// Whether the clip contributes pictures
    pub fn has_video(&self) -> bool {
        self.media_type == MediaType::Video && self.width > 0
    }

    /// Label used in log messages
    pub fn label(&self) -> &str {
        if !self.uid.is_empty() {
            &self.uid
        } else if !self.name.is_empty() {
            &self.name
        } else {
            &self.source_path
        }
    }
}

/// Output frame size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        ResolutionPreset::Landscape.canvas()
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Export resolutions offered by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPreset {
    Landscape,
    Portrait,
    Qhd,
    Uhd,
}

impl ResolutionPreset {
    pub fn canvas(self) -> Canvas {
        match self {
            ResolutionPreset::Landscape => Canvas::new(1920, 1080),
            ResolutionPreset::Portrait => Canvas::new(1080, 1920),
            ResolutionPreset::Qhd => Canvas::new(2560, 1440),
            ResolutionPreset::Uhd => Canvas::new(3840, 2160),
        }
    }
}

impl FromStr for ResolutionPreset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "landscape" | "1080p" | "1920x1080" => Ok(ResolutionPreset::Landscape),
            "portrait" | "1080x1920" => Ok(ResolutionPreset::Portrait),
            "qhd" | "1440p" | "2560x1440" => Ok(ResolutionPreset::Qhd),
            "uhd" | "4k" | "2160p" | "3840x2160" => Ok(ResolutionPreset::Uhd),
            _ => Err(DomainError::BadArgs(format!(
                "Unknown resolution preset: {}. Valid presets: landscape, portrait, qhd, uhd",
                s
            ))),
        }
    }
}

/// Timeline range to compile.
///
/// `duration == None` means "to the end of the project"; that is the export
/// case. Interactive preview passes a short bounded window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderWindow {
    pub start: f64,
    pub duration: Option<f64>,
}

impl RenderWindow {
    /// Whole timeline from zero
    pub fn full() -> Self {
        Self::default()
    }

    pub fn bounded(start: f64, duration: f64) -> Result<Self, DomainError> {
        if !start.is_finite() || !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::InvalidTimeRange(format!(
                "window start {} with duration {}",
                start, duration
            )));
        }
        Ok(Self {
            start,
            duration: Some(duration),
        })
    }

    pub fn from_start(start: f64) -> Self {
        Self {
            start,
            duration: None,
        }
    }

    /// Exclusive end; infinite when unbounded
    pub fn end(&self) -> f64 {
        match self.duration {
            Some(d) => self.start + d,
            None => f64::INFINITY,
        }
    }

    /// Half-open overlap test against `[start, end)`
    pub fn intersects(&self, start: f64, end: f64) -> bool {
        start < self.end() && end > self.start
    }
}

/// Per-track mixer state, keyed by track index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMix {
    /// Track gain in percent; missing tracks play at 100
    #[serde(default)]
    pub volumes: BTreeMap<u32, f64>,
    #[serde(default)]
    pub mutes: BTreeMap<u32, bool>,
}

impl TrackMix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume(mut self, track: u32, percent: f64) -> Self {
        self.volumes.insert(track, percent);
        self
    }

    pub fn with_mute(mut self, track: u32, muted: bool) -> Self {
        self.mutes.insert(track, muted);
        self
    }

    pub fn volume(&self, track: u32) -> f64 {
        self.volumes.get(&track).copied().unwrap_or(100.0)
    }

    pub fn is_muted(&self, track: u32) -> bool {
        self.mutes.get(&track).copied().unwrap_or(false)
    }
}

/// Saved timeline state as the editor writes it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub canvas: Canvas,
    #[serde(default)]
    pub clips: Vec<ClipRecord>,
    #[serde(default)]
    pub track_volumes: BTreeMap<u32, f64>,
    #[serde(default)]
    pub track_mutes: BTreeMap<u32, bool>,
}

impl ProjectDocument {
    /// Mixer state in the shape the compiler consumes
    pub fn mix(&self) -> TrackMix {
        TrackMix {
            volumes: self.track_volumes.clone(),
            mutes: self.track_mutes.clone(),
        }
    }
}
