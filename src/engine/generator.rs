//! Timeline to filter graph compilation

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::domain::model::{Canvas, ClipRecord, RenderWindow, TrackMix};
use crate::domain::rules::ClipValidator;
use crate::engine::{CompiledGraph, CompilerSettings, AUDIO_OUT, VIDEO_OUT};
use crate::error::GraphResult;
use crate::graph::{Filter, Graph, Pin};
use crate::planner::VisibilityResolver;
use crate::streams::{AudioChainBuilder, VideoChainBuilder};

/// Compiles a set of clips into a filter graph for a render window.
///
/// The generator only borrows its inputs and every [`build`](Self::build)
/// call works on a fresh [`Graph`], so one generator can serve any number of
/// windows, from any thread.
pub struct GraphGenerator<'a> {
    clips: &'a [ClipRecord],
    canvas: Canvas,
    mix: &'a TrackMix,
    settings: CompilerSettings,
}

impl<'a> GraphGenerator<'a> {
    pub fn new(clips: &'a [ClipRecord], canvas: Canvas, mix: &'a TrackMix) -> Self {
        Self {
            clips,
            canvas,
            mix,
            settings: CompilerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CompilerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Compile the clips visible or audible inside `window`.
    ///
    /// Invalid clips are skipped with a warning. An empty or fully silent
    /// timeline still yields a graph with both output pins.
    pub fn build(&self, window: &RenderWindow, is_export: bool) -> GraphResult<CompiledGraph> {
        let usable = self.usable_clips();
        let refs: Vec<&ClipRecord> = usable.iter().map(|c| c.as_ref()).collect();
        let duration = self.output_duration(&refs, window);

        let visible = VisibilityResolver::new(self.settings.min_visible).resolve(&refs, window);
        let audio = AudioChainBuilder::new(window, self.mix, &self.settings);
        let voices = audio.voices(&refs);

        // inputs follow caller order, whichever chain first needs them
        let mut graph = Graph::new();
        let contributing: HashSet<*const ClipRecord> = visible
            .iter()
            .map(|v| v.clip as *const ClipRecord)
            .chain(voices.iter().map(|v| v.clip as *const ClipRecord))
            .collect();
        for clip in &refs {
            if contributing.contains(&(*clip as *const ClipRecord)) {
                graph.add_input(&clip.source_path);
            }
        }
        let first_input_is_video = visible
            .iter()
            .any(|v| graph.input_index(&v.clip.source_path) == Some(0));

        let video = VideoChainBuilder::new(self.canvas, window, is_export, &self.settings)
            .build(&mut graph, &visible, duration)?;
        let sink = graph.add_sink(Filter::new("null"), 1, VIDEO_OUT);
        graph.bind(sink, 0, video)?;

        let mixed = audio.build(&mut graph, &voices, duration)?;
        let sink = graph.add_sink(Filter::new("anull"), 1, AUDIO_OUT);
        graph.bind(sink, 0, mixed)?;

        let culled = refs
            .iter()
            .filter(|c| c.has_video())
            .count()
            .saturating_sub(visible.len());
        info!(
            clips = refs.len(),
            visible = visible.len(),
            audible = voices.len(),
            inputs = graph.inputs().len(),
            "compiled filter graph"
        );
        if culled > 0 {
            debug!(culled, "video clips culled or outside the window");
        }

        Ok(CompiledGraph {
            input_paths: graph.inputs().to_vec(),
            graph_text: graph.serialize()?,
            video_pin: Pin::Label(VIDEO_OUT.to_string()).to_string(),
            audio_pin: Pin::Label(AUDIO_OUT.to_string()).to_string(),
            first_input_is_video,
            duration,
        })
    }

    /// Validated clips with fades and opacity brought into range
    fn usable_clips(&self) -> Vec<Cow<'a, ClipRecord>> {
        self.clips
            .iter()
            .filter_map(|clip| {
                if let Err(e) = ClipValidator::validate(clip) {
                    warn!(clip = clip.label(), error = %e, "skipping invalid clip");
                    return None;
                }
                match ClipValidator::normalize(clip) {
                    Some(fixed) => {
                        warn!(clip = clip.label(), "clamped fade or opacity out of range");
                        Some(Cow::Owned(fixed))
                    }
                    None => Some(Cow::Borrowed(clip)),
                }
            })
            .collect()
    }

    /// Length of the background and silence sources
    fn output_duration(&self, clips: &[&ClipRecord], window: &RenderWindow) -> f64 {
        if let Some(duration) = window.duration {
            return duration;
        }
        let project_end = clips.iter().map(|c| c.end()).fold(f64::NEG_INFINITY, f64::max);
        if project_end.is_finite() {
            (project_end - window.start).max(self.settings.min_visible)
        } else {
            self.settings.empty_duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_clips_are_skipped() {
        let good = ClipRecord::new("/m/good.mp4", 0, 0.0, 4.0);
        let mut bad = ClipRecord::new("/m/bad.mp4", 1, 0.0, 4.0);
        bad.speed = 0.0;
        let empty = ClipRecord::new("  ", 2, 0.0, 4.0);
        let clips = vec![bad, good, empty];
        let mix = TrackMix::new();

        let compiled = GraphGenerator::new(&clips, Canvas::default(), &mix)
            .build(&RenderWindow::full(), false)
            .unwrap();
        assert_eq!(compiled.input_paths, vec!["/m/good.mp4"]);
    }

    #[test]
    fn overlong_fades_are_clamped() {
        let mut clip = ClipRecord::new("/m/a.mp4", 0, 0.0, 4.0);
        clip.fade_in = 10.0;
        let clips = vec![clip];
        let mix = TrackMix::new();

        let compiled = GraphGenerator::new(&clips, Canvas::default(), &mix)
            .build(&RenderWindow::full(), false)
            .unwrap();
        assert!(compiled.graph_text.contains("fade=t=in:st=0.000:d=2.000:alpha=1"));
    }

    #[test]
    fn unbounded_window_runs_to_project_end() {
        let clips = vec![ClipRecord::new("/m/a.mp4", 0, 2.0, 6.0)];
        let mix = TrackMix::new();
        let generator = GraphGenerator::new(&clips, Canvas::default(), &mix);

        assert_eq!(generator.build(&RenderWindow::full(), true).unwrap().duration, 8.0);
        assert_eq!(generator.build(&RenderWindow::from_start(3.0), true).unwrap().duration, 5.0);
        let empty: Vec<ClipRecord> = Vec::new();
        let none = GraphGenerator::new(&empty, Canvas::default(), &mix)
            .build(&RenderWindow::full(), false)
            .unwrap();
        assert_eq!(none.duration, 10.0);
    }

    #[test]
    fn custom_settings_reach_the_graph() {
        let clips: Vec<ClipRecord> = Vec::new();
        let mix = TrackMix::new();
        let settings = CompilerSettings {
            sample_rate: 48_000,
            frame_rate: 25,
            ..CompilerSettings::default()
        };
        let compiled = GraphGenerator::new(&clips, Canvas::new(1280, 720), &mix)
            .with_settings(settings)
            .build(&RenderWindow::bounded(0.0, 2.0).unwrap(), false)
            .unwrap();
        assert_eq!(
            compiled.graph_text,
            "color=c=black:s=1280x720:r=25:d=2.000[s0];[s0]null[vo];\
             anullsrc=channel_layout=stereo:sample_rate=48000:d=2.000[s1];[s1]anull[ao]"
        );
    }
}
