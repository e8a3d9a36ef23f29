//! Occlusion culling over the video layers of a render window

use tracing::debug;

use crate::domain::model::{ClipRecord, RenderWindow};
use crate::domain::rules::LayerRules;
use crate::planner::interval::{subtract_all, total_len, Interval};

/// Default shortest visible span worth compositing, one frame at 60 fps
pub const DEFAULT_MIN_VISIBLE: f64 = 1.0 / 60.0;

/// A clip that survives culling, with the spans where it can be seen
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleClip<'a> {
    pub clip: &'a ClipRecord,
    /// Sorted, disjoint, clipped to the render window
    pub intervals: Vec<Interval>,
}

impl VisibleClip<'_> {
    pub fn visible_len(&self) -> f64 {
        total_len(&self.intervals)
    }
}

/// Finds the video clips that can affect the composite
#[derive(Debug, Clone)]
pub struct VisibilityResolver {
    min_visible: f64,
}

impl Default for VisibilityResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_VISIBLE)
    }
}

impl VisibilityResolver {
    pub fn new(min_visible: f64) -> Self {
        Self {
            min_visible: min_visible.max(0.0),
        }
    }

    /// Resolve visible spans, returning survivors front-to-back.
    ///
    /// Clips on a lower track hide clips on higher tracks wherever they are
    /// opaque and full-frame. Fade ramps never hide anything. Clips whose
    /// remaining visible time is under `min_visible` are dropped.
    pub fn resolve<'a>(&self, clips: &[&'a ClipRecord], window: &RenderWindow) -> Vec<VisibleClip<'a>> {
        let frame = Interval::new(window.start, window.end());

        let mut layers: Vec<&'a ClipRecord> = clips
            .iter()
            .copied()
            .filter(|c| c.has_video() && window.intersects(c.start, c.end()))
            .collect();
        // stable: clips sharing a track keep caller order
        layers.sort_by_key(|c| c.track);

        let mut occluders: Vec<(u32, Interval)> = Vec::new();
        let mut visible = Vec::with_capacity(layers.len());
        let mut dropped = 0usize;

        for clip in layers {
            let mut remaining: Vec<Interval> = Interval::new(clip.start, clip.end())
                .intersect(&frame)
                .into_iter()
                .collect();

            for (track, active) in &occluders {
                if *track >= clip.track {
                    continue;
                }
                remaining = subtract_all(&remaining, active);
                if remaining.is_empty() {
                    break;
                }
            }

            if LayerRules::is_opaque_full_frame(clip) {
                let (from, to) = LayerRules::active_span(clip);
                if let Some(active) = Interval::new(from, to).intersect(&frame) {
                    occluders.push((clip.track, active));
                }
            }

            if total_len(&remaining) < self.min_visible {
                debug!(clip = clip.label(), track = clip.track, "clip fully occluded in window");
                dropped += 1;
                continue;
            }

            visible.push(VisibleClip {
                clip,
                intervals: remaining,
            });
        }

        if dropped > 0 {
            debug!(dropped, kept = visible.len(), "occlusion culling finished");
        }
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MediaType;

    fn clip(uid: &str, track: u32, start: f64, duration: f64) -> ClipRecord {
        ClipRecord::new(format!("/media/{}.mp4", uid), track, start, duration).with_uid(uid)
    }

    fn uids(visible: &[VisibleClip<'_>]) -> Vec<String> {
        visible.iter().map(|v| v.clip.uid.clone()).collect()
    }

    #[test]
    fn front_clip_hides_back_clip_only_while_active() {
        let a = clip("a", 0, 0.0, 5.0);
        let b = clip("b", 1, 0.0, 10.0);
        let clips = vec![&a, &b];
        let resolver = VisibilityResolver::default();

        let first = resolver.resolve(&clips, &RenderWindow::bounded(0.0, 5.0).unwrap());
        assert_eq!(uids(&first), vec!["a"]);

        let second = resolver.resolve(&clips, &RenderWindow::bounded(5.0, 5.0).unwrap());
        assert_eq!(uids(&second), vec!["b"]);

        let whole = resolver.resolve(&clips, &RenderWindow::full());
        assert_eq!(uids(&whole), vec!["a", "b"]);
        assert_eq!(whole[1].intervals, vec![Interval::new(5.0, 10.0)]);
    }

    #[test]
    fn output_is_front_to_back() {
        let back = clip("back", 3, 0.0, 4.0);
        let mut front = clip("front", 1, 0.0, 4.0);
        front.scale_x = 0.5;
        let clips = vec![&back, &front];

        let visible = VisibilityResolver::default().resolve(&clips, &RenderWindow::full());
        assert_eq!(uids(&visible), vec!["front", "back"]);
    }

    #[test]
    fn occluder_in_the_middle_splits_the_back_clip() {
        let top = clip("top", 0, 4.0, 2.0);
        let under = clip("under", 2, 0.0, 10.0);
        let clips = vec![&under, &top];

        let visible = VisibilityResolver::default().resolve(&clips, &RenderWindow::full());
        let under_spans = &visible[1].intervals;
        assert_eq!(
            under_spans,
            &vec![Interval::new(0.0, 4.0), Interval::new(6.0, 10.0)]
        );
        assert!((visible[1].visible_len() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn translucent_scaled_or_cropped_clips_do_not_occlude() {
        let mut ghost = clip("ghost", 0, 0.0, 10.0);
        ghost.opacity = 0.5;
        let mut pip = clip("pip", 0, 0.0, 10.0);
        pip.scale_y = 0.9;
        let mut cropped = clip("cropped", 0, 0.0, 10.0);
        cropped.crop_y2 = 0.5;
        let mut moved = clip("moved", 0, 0.0, 10.0);
        moved.pos_x = 0.25;
        let base = clip("base", 1, 0.0, 10.0);

        for front in [&ghost, &pip, &cropped, &moved] {
            let clips = vec![front, &base];
            let visible = VisibilityResolver::default().resolve(&clips, &RenderWindow::full());
            assert_eq!(visible.len(), 2, "{} should not hide the base", front.uid);
        }
    }

    #[test]
    fn fade_ramps_leave_the_back_clip_visible() {
        let mut top = clip("top", 0, 0.0, 10.0);
        top.fade_in = 1.0;
        top.fade_out = 2.0;
        let under = clip("under", 1, 0.0, 10.0);
        let clips = vec![&top, &under];

        let visible = VisibilityResolver::default().resolve(&clips, &RenderWindow::full());
        assert_eq!(
            visible[1].intervals,
            vec![Interval::new(0.0, 1.0), Interval::new(8.0, 10.0)]
        );
    }

    #[test]
    fn same_track_clips_never_occlude_each_other() {
        let a = clip("a", 1, 0.0, 10.0);
        let b = clip("b", 1, 0.0, 10.0);
        let clips = vec![&a, &b];
        let visible = VisibilityResolver::default().resolve(&clips, &RenderWindow::full());
        assert_eq!(uids(&visible), vec!["a", "b"]);
    }

    #[test]
    fn slivers_below_one_frame_are_dropped() {
        let top = clip("top", 0, 0.0, 9.995);
        let under = clip("under", 1, 0.0, 10.0);
        let clips = vec![&top, &under];

        let visible = VisibilityResolver::default().resolve(&clips, &RenderWindow::full());
        assert_eq!(uids(&visible), vec!["top"]);

        let strict = VisibilityResolver::new(0.001).resolve(&clips, &RenderWindow::full());
        assert_eq!(uids(&strict), vec!["top", "under"]);
    }

    #[test]
    fn hidden_occluders_still_hide_what_is_behind_them() {
        let front = clip("front", 0, 0.0, 10.0);
        let middle = clip("middle", 1, 0.0, 10.0);
        let back = clip("back", 2, 0.0, 10.0);
        let clips = vec![&back, &middle, &front];

        let visible = VisibilityResolver::default().resolve(&clips, &RenderWindow::full());
        assert_eq!(uids(&visible), vec!["front"]);
    }

    #[test]
    fn audio_only_and_out_of_window_clips_are_ignored() {
        let mut music = clip("music", 0, 0.0, 10.0);
        music.media_type = MediaType::Audio;
        music.width = 0;
        let late = clip("late", 1, 20.0, 5.0);
        let clips = vec![&music, &late];

        let visible =
            VisibilityResolver::default().resolve(&clips, &RenderWindow::bounded(0.0, 15.0).unwrap());
        assert!(visible.is_empty());
    }

    #[test]
    fn intervals_are_clipped_to_the_window() {
        let a = clip("a", 0, 2.0, 20.0);
        let clips = vec![&a];
        let visible =
            VisibilityResolver::default().resolve(&clips, &RenderWindow::bounded(10.0, 5.0).unwrap());
        assert_eq!(visible[0].intervals, vec![Interval::new(10.0, 15.0)]);
    }
}
