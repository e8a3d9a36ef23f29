//! Audio voices, per-clip processing and the final mixdown

use tracing::debug;

use crate::domain::model::{ClipRecord, RenderWindow, TrackMix};
use crate::domain::rules::MixRules;
use crate::engine::CompilerSettings;
use crate::error::GraphResult;
use crate::graph::{Filter, Graph, Pin, StreamKind};
use crate::planner::{merge_all, Interval};
use crate::streams::mapper::SourceRouter;
use crate::streams::span::{ramps, SpanPlan};
use crate::streams::tempo::{is_unity, tempo_stages};
use crate::utils::time::{factor, secs};

/// A clip that reaches the mix, with its span inside the render window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioVoice<'a> {
    pub clip: &'a ClipRecord,
    pub span: Interval,
    pub plan: SpanPlan,
    /// Source offset and length, in source seconds
    pub source: (f64, f64),
}

impl AudioVoice<'_> {
    /// Part of the span where the source is heard, outside the freeze holds
    pub fn audible(&self) -> Option<Interval> {
        self.plan.motion.and_then(|m| m.intersect(&self.span))
    }
}

/// Builds the audio half of a filter graph
pub struct AudioChainBuilder<'s> {
    window: RenderWindow,
    mix: &'s TrackMix,
    settings: &'s CompilerSettings,
}

impl<'s> AudioChainBuilder<'s> {
    pub fn new(window: &RenderWindow, mix: &'s TrackMix, settings: &'s CompilerSettings) -> Self {
        Self {
            window: *window,
            mix,
            settings,
        }
    }

    /// Audible clips in caller order
    pub fn voices<'a>(&self, clips: &[&'a ClipRecord]) -> Vec<AudioVoice<'a>> {
        let frame = Interval::new(self.window.start, self.window.end());
        clips
            .iter()
            .copied()
            .filter(|clip| MixRules::contributes_audio(clip, self.mix))
            .filter_map(|clip| {
                let span = Interval::new(clip.start, clip.end()).intersect(&frame)?;
                let (motion_start, motion_end) = clip.motion();
                Interval::new(motion_start, motion_end).intersect(&span)?;
                let plan = SpanPlan::new(clip, span);
                let source = plan.source_range(clip)?;
                Some(AudioVoice {
                    clip,
                    span,
                    plan,
                    source,
                })
            })
            .collect()
    }

    /// Process every voice and mix them, or emit silence of `duration`
    /// when there is nothing to hear. Returns the mix output pin.
    pub fn build(&self, graph: &mut Graph, voices: &[AudioVoice<'_>], duration: f64) -> GraphResult<Pin> {
        if voices.is_empty() {
            let silence = Filter::new("anullsrc")
                .arg("channel_layout", "stereo")
                .arg("sample_rate", self.settings.sample_rate)
                .arg("d", secs(duration));
            let id = graph.add_node(silence, 0, 1);
            return graph.output(id, 0);
        }

        let mut router = SourceRouter::prepare(
            graph,
            StreamKind::Audio,
            voices.iter().map(|v| v.clip.source_path.as_str()),
        )?;

        let mut mixed_inputs = Vec::with_capacity(voices.len());
        for voice in voices {
            let source = router.take(graph, &voice.clip.source_path);
            mixed_inputs.push(self.voice_chain(graph, source, voice, voices)?);
        }

        let amix = Filter::new("amix")
            .arg("inputs", mixed_inputs.len())
            .arg("duration", "longest")
            .arg("dropout_transition", 0);
        let id = graph.add_node(amix, mixed_inputs.len(), 1);
        for (slot, pin) in mixed_inputs.into_iter().enumerate() {
            graph.bind(id, slot, pin)?;
        }
        let mixed = graph.output(id, 0)?;

        debug!(voices = voices.len(), "audio mix built");
        graph.pipe(mixed, Filter::new("aresample").positional(self.settings.sample_rate))
    }

    fn voice_chain(
        &self,
        graph: &mut Graph,
        source: Pin,
        voice: &AudioVoice<'_>,
        all: &[AudioVoice<'_>],
    ) -> GraphResult<Pin> {
        let clip = voice.clip;
        let span = voice.span;
        let plan = voice.plan;

        let (source_start, source_len) = voice.source;
        let mut pin = graph.pipe(
            source,
            Filter::new("atrim")
                .arg("start", secs(source_start))
                .arg("duration", secs(source_len)),
        )?;
        pin = graph.pipe(pin, Filter::new("asetpts").positional("PTS-STARTPTS"))?;

        if !is_unity(clip.speed) {
            for stage in tempo_stages(clip.speed) {
                pin = graph.pipe(pin, Filter::new("atempo").positional(factor(stage)))?;
            }
        }

        // freeze holds are silent
        if plan.head_hold > 0.0 {
            let hold_ms = (plan.head_hold * 1000.0).round() as u64;
            pin = graph.pipe(pin, Filter::new("adelay").positional(hold_ms).arg("all", 1))?;
        }
        if plan.tail_hold > 0.0 {
            pin = graph.pipe(pin, Filter::new("apad").arg("pad_dur", secs(plan.tail_hold)))?;
        }

        // decoded clock: zero at plan.decode_start()
        for ramp in ramps(clip) {
            if ramp.interval.intersect(&span).is_some() {
                let start = (ramp.interval.start - plan.decode_start()).max(0.0);
                pin = graph.pipe(pin, afade(ramp.direction, start, ramp.interval.len()))?;
            }
        }
        if plan.lead > 0.0 {
            pin = graph.pipe(pin, Filter::new("atrim").arg("start", secs(plan.lead)))?;
            pin = graph.pipe(pin, Filter::new("asetpts").positional("PTS-STARTPTS"))?;
        }

        let gain = MixRules::effective_gain(clip, self.mix);
        pin = graph.pipe(pin, Filter::new("volume").positional(factor(gain)))?;

        // local clock from here on: zero at span.start
        if !MixRules::is_priority(clip) {
            let ducked = merge_all(
                all.iter()
                    .filter(|v| MixRules::is_priority(v.clip))
                    .filter_map(|v| v.audible())
                    .filter_map(|lead| lead.intersect(&span))
                    .collect(),
            );
            for overlap in ducked {
                let enable = format!(
                    "between(t,{},{})",
                    secs(overlap.start - span.start),
                    secs(overlap.end - span.start)
                );
                pin = graph.pipe(
                    pin,
                    Filter::new("volume")
                        .positional(factor(self.settings.duck_level))
                        .arg("enable", enable),
                )?;
            }
        }

        let delay_ms = ((span.start - self.window.start) * 1000.0).round().max(0.0) as u64;
        graph.pipe(pin, Filter::new("adelay").positional(delay_ms).arg("all", 1))
    }
}

fn afade(direction: &str, start: f64, duration: f64) -> Filter {
    Filter::new("afade")
        .arg("t", direction)
        .arg("st", secs(start))
        .arg("d", secs(duration))
}
