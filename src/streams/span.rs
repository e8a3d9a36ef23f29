//! How a visible or audible span of a clip is decoded

use crate::domain::model::ClipRecord;
use crate::planner::Interval;

// below this a pre-roll or hold is float noise
const EPSILON: f64 = 1e-9;

/// One fade ramp of a clip in timeline seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    /// `in` or `out`, as the fade filters spell it
    pub direction: &'static str,
    pub interval: Interval,
}

/// Fade-in then fade-out ramps of a clip
pub fn ramps(clip: &ClipRecord) -> Vec<Ramp> {
    let mut ramps = Vec::with_capacity(2);
    if clip.fade_in > 0.0 {
        ramps.push(Ramp {
            direction: "in",
            interval: Interval::new(clip.start, clip.start + clip.fade_in),
        });
    }
    if clip.fade_out > 0.0 {
        ramps.push(Ramp {
            direction: "out",
            interval: Interval::new(clip.end() - clip.fade_out, clip.end()),
        });
    }
    ramps
}

/// Decode plan for one span `[a, b)` of a clip.
///
/// When `a` falls inside a fade ramp, decoding starts `lead` seconds early
/// at the start of that ramp. The fade then runs from its true beginning and
/// the pre-roll is trimmed off afterwards, so a window opening mid-fade
/// continues the ramp instead of restarting it.
///
/// The decoded range `[a - lead, b)` splits into a frozen head, the part
/// where the source plays, and a frozen tail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanPlan {
    pub span: Interval,
    pub lead: f64,
    pub head_hold: f64,
    pub motion: Option<Interval>,
    pub tail_hold: f64,
}

impl SpanPlan {
    pub fn new(clip: &ClipRecord, span: Interval) -> Self {
        let lead = ramps(clip)
            .iter()
            .filter(|r| span.start - r.interval.start > EPSILON && span.start < r.interval.end)
            .map(|r| span.start - r.interval.start)
            .fold(0.0, f64::max);

        let decoded = Interval::new(span.start - lead, span.end);
        let (motion_start, motion_end) = clip.motion();
        let held = |from: f64, to: f64| {
            Interval::new(from, to)
                .intersect(&decoded)
                .map_or(0.0, |piece| piece.len())
        };

        Self {
            span,
            lead,
            head_hold: held(clip.start, motion_start),
            motion: Interval::new(motion_start, motion_end).intersect(&decoded),
            tail_hold: held(motion_end, clip.end()),
        }
    }

    /// Timeline second at which the decoded stream starts
    pub fn decode_start(&self) -> f64 {
        self.span.start - self.lead
    }

    /// True when the chain must run on its own clock and be moved onto the
    /// output clock at the end
    pub fn needs_local_clock(&self) -> bool {
        self.lead > EPSILON || self.has_holds()
    }

    pub fn has_holds(&self) -> bool {
        self.head_hold > EPSILON || self.tail_hold > EPSILON
    }

    /// Source offset and length, in source seconds, of the moving part
    pub fn source_range(&self, clip: &ClipRecord) -> Option<(f64, f64)> {
        let (motion_start, _) = clip.motion();
        self.motion.map(|m| {
            (
                clip.source_in + (m.start - motion_start) * clip.speed,
                m.len() * clip.speed,
            )
        })
    }

    /// Source range for a span that only shows a frozen frame: one frame of
    /// `frame` timeline seconds at the edge the hold repeats
    pub fn still_range(&self, clip: &ClipRecord, frame: f64) -> (f64, f64) {
        let length = frame * clip.speed;
        if self.head_hold > EPSILON {
            (clip.source_in, length)
        } else {
            let (motion_start, motion_end) = clip.motion();
            let last = clip.source_in + (motion_end - motion_start) * clip.speed - length;
            (last.max(clip.source_in), length)
        }
    }
}
