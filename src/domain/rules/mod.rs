// Domain rules - Business logic and policies

use crate::domain::errors::*;
use crate::domain::model::*;


/// Position offsets below this are treated as centered
pub const POSITION_EPSILON: f64 = 1e-3;

/// Crop insets up to this fraction on any side are treated as uncropped
pub const CROP_TOLERANCE: f64 = 0.01;

/// Name fragment of clips recorded with the voice-over tool
pub const VOICE_OVER_MARKER: &str = "VO_";

/// Boundary validation for clip records coming from the editor
pub struct ClipValidator;

impl ClipValidator {
    /// Check the fields the compiler cannot work without
    pub fn validate(clip: &ClipRecord) -> Result<(), DomainError> {
        let uid = clip.label().to_string();

        if clip.source_path.trim().is_empty() {
            return Err(DomainError::MissingField {
                uid,
                field: "source_path",
            });
        }
        if !clip.start.is_finite() {
            return Err(DomainError::InvalidClip {
                uid,
                reason: format!("start {} is not finite", clip.start),
            });
        }
        if !clip.duration.is_finite() || clip.duration <= 0.0 {
            return Err(DomainError::InvalidClip {
                uid,
                reason: format!("duration {} must be positive", clip.duration),
            });
        }
        if !clip.speed.is_finite() || clip.speed <= 0.0 {
            return Err(DomainError::InvalidClip {
                uid,
                reason: format!("speed {} must be positive", clip.speed),
            });
        }
        if !(clip.crop_x1 < clip.crop_x2 && clip.crop_x2 <= 1.0)
            || !(clip.crop_y1 < clip.crop_y2 && clip.crop_y2 <= 1.0)
            || clip.crop_x1 < 0.0
            || clip.crop_y1 < 0.0
        {
            return Err(DomainError::InvalidClip {
                uid,
                reason: format!(
                    "crop rectangle ({}, {})-({}, {}) is empty or outside [0,1]",
                    clip.crop_x1, clip.crop_y1, clip.crop_x2, clip.crop_y2
                ),
            });
        }
        let holds_valid = [clip.start_freeze, clip.end_freeze]
            .iter()
            .all(|h| h.is_finite() && *h >= 0.0);
        if !holds_valid || clip.start_freeze + clip.end_freeze >= clip.duration {
            return Err(DomainError::InvalidClip {
                uid,
                reason: format!(
                    "freeze holds {} + {} leave no motion in a {} s clip",
                    clip.start_freeze, clip.end_freeze, clip.duration
                ),
            });
        }
        if clip.scale_x <= 0.0 || clip.scale_y <= 0.0 {
            return Err(DomainError::InvalidClip {
                uid,
                reason: format!("scale {}x{} must be positive", clip.scale_x, clip.scale_y),
            });
        }

        Ok(())
    }

    /// Return a copy whose soft values sit inside their documented ranges.
    ///
    /// Fades are capped at half the duration and opacity at [0,1]. Returns
    /// `None` when nothing had to change.
    pub fn normalize(clip: &ClipRecord) -> Option<ClipRecord> {
        let half = clip.duration / 2.0;
        let fade_in = clip.fade_in.clamp(0.0, half);
        let fade_out = clip.fade_out.clamp(0.0, half);
        let opacity = clip.opacity.clamp(0.0, 1.0);

        if fade_in == clip.fade_in && fade_out == clip.fade_out && opacity == clip.opacity {
            return None;
        }

        let mut fixed = clip.clone();
        fixed.fade_in = fade_in;
        fixed.fade_out = fade_out;
        fixed.opacity = opacity;
        Some(fixed)
    }
}

/// Rules deciding how a clip participates in the composite
pub struct LayerRules;

impl LayerRules {
    /// True when the clip paints every canvas pixel with full alpha.
    ///
    /// Only such clips can hide the tracks behind them.
    pub fn is_opaque_full_frame(clip: &ClipRecord) -> bool {
        clip.opacity >= 1.0
            && clip.scale_x >= 1.0
            && clip.scale_y >= 1.0
            && clip.pos_x.abs() < POSITION_EPSILON
            && clip.pos_y.abs() < POSITION_EPSILON
            && Self::crop_is_negligible(clip)
    }

    /// No side of the crop rectangle is inset by more than one percent
    pub fn crop_is_negligible(clip: &ClipRecord) -> bool {
        clip.crop_x1 <= CROP_TOLERANCE
            && clip.crop_y1 <= CROP_TOLERANCE
            && clip.crop_x2 >= 1.0 - CROP_TOLERANCE
            && clip.crop_y2 >= 1.0 - CROP_TOLERANCE
    }

    /// Interval during which the clip is fully opaque, ignoring fade ramps
    pub fn active_span(clip: &ClipRecord) -> (f64, f64) {
        (clip.start + clip.fade_in, clip.end() - clip.fade_out)
    }
}

/// Rules for the audio mix
pub struct MixRules;

impl MixRules {
    /// Whether the clip's sound reaches the mix at all
    pub fn contributes_audio(clip: &ClipRecord, mix: &TrackMix) -> bool {
        clip.has_audio && !clip.muted && !mix.is_muted(clip.track)
    }

    /// Voice-over clips duck the others. The editor names its recordings
    /// `VO_<timestamp>`, so the name marks them even without the flag.
    pub fn is_priority(clip: &ClipRecord) -> bool {
        clip.priority || clip.name.contains(VOICE_OVER_MARKER)
    }

    /// Linear gain from clip percent and track percent
    pub fn effective_gain(clip: &ClipRecord, mix: &TrackMix) -> f64 {
        (clip.volume / 100.0) * (mix.volume(clip.track) / 100.0)
    }
}
