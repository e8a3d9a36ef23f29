//! Core compiler engine module

use serde::{Deserialize, Serialize};

use crate::planner::DEFAULT_MIN_VISIBLE;

pub mod generator;

pub use generator::GraphGenerator;

/// Label of the composited video output
pub const VIDEO_OUT: &str = "vo";

/// Label of the mixed audio output
pub const AUDIO_OUT: &str = "ao";

/// Tunables of the compiler, the `[compiler]` table of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Shortest visible span, in seconds, worth compositing
    pub min_visible: f64,
    /// Linear gain applied to other voices under a priority clip
    pub duck_level: f64,
    /// Mix and silence sample rate in Hz
    pub sample_rate: u32,
    /// Frame rate of the background source
    pub frame_rate: u32,
    /// Background length when an unbounded window has no clips
    pub empty_duration: f64,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            min_visible: DEFAULT_MIN_VISIBLE,
            duck_level: 0.18,
            sample_rate: 44_100,
            frame_rate: 30,
            empty_duration: 10.0,
        }
    }
}

/// Result of one compilation, ready for a backend command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledGraph {
    /// Input files in `-i` order
    pub input_paths: Vec<String>,
    /// `-filter_complex` text
    pub graph_text: String,
    /// Pin to map for video, `[vo]`
    pub video_pin: String,
    /// Pin to map for audio, `[ao]`
    pub audio_pin: String,
    /// Input 0 feeds a video chain
    pub first_input_is_video: bool,
    /// Length of the rendered output in seconds
    pub duration: f64,
}
