//! Render planning: interval arithmetic and visibility resolution

pub mod interval;
pub mod visibility;

pub use interval::{merge_all, Interval};
pub use visibility::{VisibilityResolver, VisibleClip, DEFAULT_MIN_VISIBLE};
