//! Per-stream chain builders
//!
//! The video builder stacks visible clip layers onto a background; the audio
//! builder processes each audible clip and mixes them down. Both share the
//! [`mapper::SourceRouter`] for sources feeding more than one chain.

pub mod audio;
pub mod mapper;
pub mod span;
pub mod tempo;
pub mod video;

pub use audio::{AudioChainBuilder, AudioVoice};
pub use mapper::SourceRouter;
pub use span::SpanPlan;
pub use tempo::tempo_stages;
pub use video::{Placement, VideoChainBuilder};
