//! Video mini-chains and the layered composite

use tracing::debug;

use crate::domain::model::{Canvas, ClipRecord, RenderWindow};
use crate::domain::rules::LayerRules;
use crate::engine::CompilerSettings;
use crate::error::GraphResult;
use crate::graph::{Filter, Graph, Pin, StreamKind};
use crate::planner::{Interval, VisibleClip};
use crate::streams::mapper::SourceRouter;
use crate::streams::span::{ramps, SpanPlan};
use crate::streams::tempo::is_unity;
use crate::utils::time::{factor, secs};

/// Size and canvas position of a transformed layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

impl Placement {
    /// Box a clip is fitted into, centred and then shifted by its position.
    ///
    /// `pos_y` is positive upwards while canvas rows grow downwards.
    pub fn of(clip: &ClipRecord, canvas: Canvas) -> Self {
        let w = canvas.width as f64;
        let h = canvas.height as f64;
        let width = even_dimension(w * clip.scale_x);
        let height = even_dimension(h * clip.scale_y);
        let x = (w - width as f64) / 2.0 + clip.pos_x * w;
        let y = (h - height as f64) / 2.0 - clip.pos_y * h;
        Self {
            width,
            height,
            x: x.round() as i64,
            y: y.round() as i64,
        }
    }
}

// yuv420 outputs need even sizes
fn even_dimension(value: f64) -> u32 {
    let rounded = value.round().max(2.0) as u32;
    rounded - rounded % 2
}

/// Builds the video half of a filter graph
pub struct VideoChainBuilder<'s> {
    canvas: Canvas,
    window_start: f64,
    is_export: bool,
    settings: &'s CompilerSettings,
}

impl<'s> VideoChainBuilder<'s> {
    pub fn new(canvas: Canvas, window: &RenderWindow, is_export: bool, settings: &'s CompilerSettings) -> Self {
        Self {
            canvas,
            window_start: window.start,
            is_export,
            settings,
        }
    }

    /// Composite the visible clips over a black background of `duration`.
    ///
    /// `visible` is front-to-back; layers are stacked back-most first so the
    /// front clip is overlaid last. Returns the composite's output pin.
    pub fn build(&self, graph: &mut Graph, visible: &[VisibleClip<'_>], duration: f64) -> GraphResult<Pin> {
        let layers: Vec<(&ClipRecord, Interval)> = visible
            .iter()
            .rev()
            .flat_map(|v| v.intervals.iter().map(move |span| (v.clip, *span)))
            .collect();

        let mut router = SourceRouter::prepare(
            graph,
            StreamKind::Video,
            layers.iter().map(|(clip, _)| clip.source_path.as_str()),
        )?;

        let mut composite = self.background(graph, duration)?;
        for (clip, span) in &layers {
            let source = router.take(graph, &clip.source_path);
            let layer = self.clip_chain(graph, source, clip, *span)?;
            composite = self.overlay(graph, composite, layer, clip, *span)?;
        }

        debug!(layers = layers.len(), "video composite built");
        Ok(composite)
    }

    /// Black canvas-sized source that every layer is drawn onto
    pub fn background(&self, graph: &mut Graph, duration: f64) -> GraphResult<Pin> {
        let color = Filter::new("color")
            .arg("c", "black")
            .arg("s", self.canvas)
            .arg("r", self.settings.frame_rate)
            .arg("d", secs(duration));
        let id = graph.add_node(color, 0, 1);
        graph.output(id, 0)
    }

    fn clip_chain(&self, graph: &mut Graph, source: Pin, clip: &ClipRecord, span: Interval) -> GraphResult<Pin> {
        let plan = SpanPlan::new(clip, span);
        let offset = span.start - self.window_start;
        // fades are timed against this clock
        let local = plan.needs_local_clock();
        let origin = if local {
            plan.decode_start()
        } else {
            self.window_start
        };

        let frame = 1.0 / f64::from(self.settings.frame_rate.max(1));
        let (source_start, source_len) = plan
            .source_range(clip)
            .unwrap_or_else(|| plan.still_range(clip, frame));
        let mut pin = graph.pipe(
            source,
            Filter::new("trim")
                .arg("start", secs(source_start))
                .arg("duration", secs(source_len)),
        )?;
        let retime = retime_expr(clip.speed, if local { 0.0 } else { offset });
        pin = graph.pipe(pin, Filter::new("setpts").positional(retime))?;

        if plan.has_holds() {
            pin = graph.pipe(pin, freeze_filter(plan.head_hold, plan.tail_hold))?;
        }

        if !LayerRules::crop_is_negligible(clip) {
            let crop = Filter::new("crop")
                .positional(format!("iw*{}", factor(clip.crop_x2 - clip.crop_x1)))
                .positional(format!("ih*{}", factor(clip.crop_y2 - clip.crop_y1)))
                .positional(format!("iw*{}", factor(clip.crop_x1)))
                .positional(format!("ih*{}", factor(clip.crop_y1)));
            pin = graph.pipe(pin, crop)?;
        }

        let fades = fades(clip, span, origin);
        let translucent = clip.opacity < 1.0;
        if !fades.is_empty() || translucent {
            pin = graph.pipe(pin, Filter::new("format").positional("rgba"))?;
        }
        for fade in fades {
            pin = graph.pipe(pin, fade)?;
        }

        if local {
            if plan.lead > 0.0 {
                pin = graph.pipe(pin, Filter::new("trim").arg("start", secs(plan.lead)))?;
            }
            pin = graph.pipe(pin, Filter::new("setpts").positional(retime_expr(1.0, offset)))?;
        }

        if translucent {
            pin = graph.pipe(pin, Filter::new("colorchannelmixer").arg("aa", factor(clip.opacity)))?;
        }

        let place = Placement::of(clip, self.canvas);
        pin = graph.pipe(
            pin,
            Filter::new("scale")
                .positional(place.width)
                .positional(place.height)
                .arg("force_original_aspect_ratio", "decrease"),
        )?;
        pin = graph.pipe(
            pin,
            Filter::new("pad")
                .positional(place.width)
                .positional(place.height)
                .positional("(ow-iw)/2")
                .positional("(oh-ih)/2")
                .arg("color", "black@0"),
        )?;

        if self.is_export {
            pin = graph.pipe(pin, Filter::new("setsar").positional(1))?;
        }
        Ok(pin)
    }

    fn overlay(
        &self,
        graph: &mut Graph,
        base: Pin,
        layer: Pin,
        clip: &ClipRecord,
        span: Interval,
    ) -> GraphResult<Pin> {
        let place = Placement::of(clip, self.canvas);
        let from = span.start - self.window_start;
        let to = span.end - self.window_start;
        let overlay = Filter::new("overlay")
            .arg("x", place.x)
            .arg("y", place.y)
            .arg("enable", format!("between(t,{},{})", secs(from), secs(to)))
            .arg("eof_action", "pass");
        let id = graph.add_node(overlay, 2, 1);
        graph.bind(id, 0, base)?;
        graph.bind(id, 1, layer)?;
        graph.output(id, 0)
    }
}

/// Whole-ramp fades for every ramp touching `span`, timed from `origin`
fn fades(clip: &ClipRecord, span: Interval, origin: f64) -> Vec<Filter> {
    ramps(clip)
        .into_iter()
        .filter(|ramp| ramp.interval.intersect(&span).is_some())
        .map(|ramp| {
            fade_filter(
                ramp.direction,
                (ramp.interval.start - origin).max(0.0),
                ramp.interval.len(),
            )
        })
        .collect()
}

/// Clone the first and last frames for the freeze holds
fn freeze_filter(head: f64, tail: f64) -> Filter {
    let mut tpad = Filter::new("tpad");
    if head > 0.0 {
        tpad = tpad.arg("start_mode", "clone").arg("start_duration", secs(head));
    }
    if tail > 0.0 {
        tpad = tpad.arg("stop_mode", "clone").arg("stop_duration", secs(tail));
    }
    tpad
}

fn fade_filter(direction: &str, start: f64, duration: f64) -> Filter {
    Filter::new("fade")
        .arg("t", direction)
        .arg("st", secs(start))
        .arg("d", secs(duration))
        .arg("alpha", 1)
}

/// `setpts` expression restarting at zero, stretched by `1/speed` and
/// shifted to `offset` seconds on the output clock
fn retime_expr(speed: f64, offset: f64) -> String {
    let mut expr = if is_unity(speed) {
        "PTS-STARTPTS".to_string()
    } else {
        format!("(PTS-STARTPTS)*{}", factor(1.0 / speed))
    };
    if offset > 1e-9 {
        expr.push_str(&format!("+{}/TB", secs(offset)));
    }
    expr
}
