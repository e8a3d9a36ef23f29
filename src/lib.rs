//! Reelgraph Library
//!
//! Turns a multi-track timeline of media clips into one ffmpeg filter graph
//! with a single video output and a single mixed audio output. The same
//! graph drives preview playback of a time window and the final export.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod graph;
pub mod output;
pub mod planner;
pub mod ports;
pub mod streams;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{Canvas, ClipRecord, RenderWindow, TrackMix};
pub use engine::{CompiledGraph, CompilerSettings, GraphGenerator};
pub use error::{GraphError, ReelError, ReelResult};
