//! Integration tests for timeline compilation

use reelgraph_cli::domain::model::MediaType;
use reelgraph_cli::graph::{Filter, Graph, StreamKind};
use reelgraph_cli::{Canvas, ClipRecord, CompiledGraph, GraphError, GraphGenerator, RenderWindow, TrackMix};

// Test utilities

fn video(uid: &str, path: &str, track: u32, start: f64, duration: f64) -> ClipRecord {
    ClipRecord::new(path, track, start, duration).with_uid(uid)
}

fn audio(uid: &str, path: &str, track: u32, start: f64, duration: f64) -> ClipRecord {
    let mut clip = ClipRecord::new(path, track, start, duration).with_uid(uid);
    clip.media_type = MediaType::Audio;
    clip.width = 0;
    clip.height = 0;
    clip
}

fn compile(clips: &[ClipRecord], mix: &TrackMix, window: RenderWindow) -> CompiledGraph {
    GraphGenerator::new(clips, Canvas::default(), mix)
        .build(&window, true)
        .unwrap()
}

fn count(text: &str, needle: &str) -> usize {
    text.matches(needle).count()
}

#[test]
fn test_empty_timeline_yields_background_and_silence() {
    let mix = TrackMix::new();
    let compiled = compile(&[], &mix, RenderWindow::full());

    assert!(compiled.input_paths.is_empty());
    assert!(!compiled.first_input_is_video);
    assert_eq!(compiled.video_pin, "[vo]");
    assert_eq!(compiled.audio_pin, "[ao]");
    assert!(compiled.graph_text.contains("color=c=black:s=1920x1080"));
    assert!(compiled.graph_text.contains("anullsrc=channel_layout=stereo"));
    assert!(compiled.graph_text.ends_with("[ao]"));
    assert!(!compiled.graph_text.contains("amix"));
}

#[test]
fn test_compilation_is_deterministic() {
    let clips = vec![
        video("a", "/media/a.mp4", 0, 0.0, 4.0),
        video("b", "/media/b.mp4", 1, 2.0, 6.0),
        audio("m", "/media/music.wav", 2, 0.0, 8.0),
    ];
    let mix = TrackMix::new().with_volume(2, 50.0);

    let first = compile(&clips, &mix, RenderWindow::full());
    let second = compile(&clips, &mix, RenderWindow::full());
    assert_eq!(first, second);
}

#[test]
fn test_shared_source_is_opened_once_and_split() {
    let clips = vec![
        video("a", "/media/shared.mp4", 0, 0.0, 5.0),
        video("b", "/media/shared.mp4", 0, 5.0, 5.0),
    ];
    let mix = TrackMix::new();
    let compiled = compile(&clips, &mix, RenderWindow::full());

    assert_eq!(compiled.input_paths, vec!["/media/shared.mp4"]);
    assert_eq!(count(&compiled.graph_text, "[0:v]split=2"), 1);
    assert_eq!(count(&compiled.graph_text, "[0:a]asplit=2"), 1);
    assert!(compiled.first_input_is_video);
}

#[test]
fn test_mix_counts_only_audible_voices() {
    let mut muted = audio("c", "/media/c.wav", 2, 0.0, 4.0);
    muted.muted = true;
    let clips = vec![
        audio("a", "/media/a.wav", 0, 0.0, 4.0),
        audio("b", "/media/b.wav", 1, 0.0, 4.0),
        muted,
        audio("d", "/media/d.wav", 3, 0.0, 4.0),
    ];
    let mix = TrackMix::new().with_mute(3, true);
    let compiled = compile(&clips, &mix, RenderWindow::full());

    assert!(compiled.graph_text.contains("amix=inputs=2:duration=longest:dropout_transition=0"));
    assert_eq!(compiled.input_paths, vec!["/media/a.wav", "/media/b.wav"]);
    assert!(!compiled.first_input_is_video);
}

#[test]
fn test_fully_silent_timeline_uses_anullsrc() {
    let mut clip = video("a", "/media/a.mp4", 0, 0.0, 6.0);
    clip.has_audio = false;
    let clips = vec![clip];
    let mix = TrackMix::new();
    let compiled = compile(&clips, &mix, RenderWindow::full());

    assert!(compiled.graph_text.contains("anullsrc=channel_layout=stereo:sample_rate=44100:d=6.000"));
    assert!(!compiled.graph_text.contains("amix"));
    assert!(!compiled.graph_text.contains("[0:a]"));
}

#[test]
fn test_front_clip_occludes_back_clip() {
    let clips = vec![
        video("front", "/media/front.mp4", 0, 0.0, 5.0),
        video("back", "/media/back.mp4", 1, 0.0, 10.0),
    ];
    let mix = TrackMix::new();
    let compiled = compile(&clips, &mix, RenderWindow::full());

    assert!(compiled.graph_text.contains("enable='between(t,0.000,5.000)'"));
    assert!(compiled.graph_text.contains("enable='between(t,5.000,10.000)'"));
    assert!(!compiled.graph_text.contains("between(t,0.000,10.000)"));
    assert_eq!(compiled.duration, 10.0);
}

#[test]
fn test_clip_outside_window_is_excluded() {
    let clips = vec![
        video("early", "/media/early.mp4", 0, 0.0, 10.0),
        video("late", "/media/late.mp4", 0, 12.0, 2.0),
    ];
    let mix = TrackMix::new();
    let window = RenderWindow::bounded(10.0, 5.0).unwrap();
    let compiled = compile(&clips, &mix, window);

    assert_eq!(compiled.input_paths, vec!["/media/late.mp4"]);
    assert_eq!(compiled.duration, 5.0);
    // overlay times are relative to the window start
    assert!(compiled.graph_text.contains("enable='between(t,2.000,4.000)'"));
    assert!(compiled.graph_text.contains("adelay=2000:all=1"));
}

#[test]
fn test_first_input_follows_caller_order() {
    let clips = vec![
        audio("music", "/media/music.wav", 2, 0.0, 5.0),
        video("shot", "/media/shot.mp4", 0, 0.0, 5.0),
    ];
    let mix = TrackMix::new();
    let compiled = compile(&clips, &mix, RenderWindow::full());

    assert_eq!(compiled.input_paths, vec!["/media/music.wav", "/media/shot.mp4"]);
    assert!(!compiled.first_input_is_video);

    let reordered = vec![clips[1].clone(), clips[0].clone()];
    let compiled = compile(&reordered, &mix, RenderWindow::full());
    assert!(compiled.first_input_is_video);
}

#[test]
fn test_priority_clip_ducks_overlapping_voices() {
    let mut voice = audio("vo", "/media/voice.wav", 1, 5.0, 4.0);
    voice.priority = true;
    let clips = vec![audio("bed", "/media/bed.wav", 0, 0.0, 20.0), voice];
    let mix = TrackMix::new();
    let compiled = compile(&clips, &mix, RenderWindow::full());

    assert!(compiled
        .graph_text
        .contains("volume=0.18:enable='between(t,5.000,9.000)'"));
    assert_eq!(count(&compiled.graph_text, "enable='between"), 1);
}

#[test]
fn test_overlapping_voice_overs_duck_as_one_span() {
    let first = audio("vo1", "/media/vo1.wav", 1, 5.0, 4.0).with_name("VO_intro");
    let second = audio("vo2", "/media/vo2.wav", 2, 7.0, 5.0).with_name("VO_outro");
    let clips = vec![audio("bed", "/media/bed.wav", 0, 0.0, 20.0), first, second];
    let mix = TrackMix::new();
    let compiled = compile(&clips, &mix, RenderWindow::full());

    assert!(compiled
        .graph_text
        .contains("volume=0.18:enable='between(t,5.000,12.000)'"));
    assert_eq!(count(&compiled.graph_text, "volume=0.18"), 1);
}

#[test]
fn test_window_opening_mid_fade_keeps_the_ramp() {
    let mut clip = video("a", "/media/a.mp4", 0, 0.0, 10.0);
    clip.fade_in = 2.0;
    let mix = TrackMix::new();
    let window = RenderWindow::bounded(1.0, 4.0).unwrap();
    let compiled = compile(&[clip], &mix, window);

    assert!(compiled.graph_text.contains("fade=t=in:st=0.000:d=2.000:alpha=1"));
    assert!(compiled.graph_text.contains("afade=t=in:st=0.000:d=2.000"));
    assert!(!compiled.graph_text.contains("d=1.000"));
}

#[test]
fn test_preview_omits_export_only_filters() {
    let clips = vec![video("a", "/media/a.mp4", 0, 0.0, 3.0)];
    let mix = TrackMix::new();
    let generator = GraphGenerator::new(&clips, Canvas::default(), &mix);

    let preview = generator.build(&RenderWindow::full(), false).unwrap();
    let export = generator.build(&RenderWindow::full(), true).unwrap();
    assert!(!preview.graph_text.contains("setsar=1"));
    assert!(export.graph_text.contains("setsar=1"));
}

#[test]
fn test_graph_misuse_is_reported() {
    let mut graph = Graph::new();
    let source = graph.input_stream("/media/a.mp4", StreamKind::Video);
    let node = graph.add_node(Filter::new("null"), 1, 1);

    assert!(matches!(
        graph.output(node, 3),
        Err(GraphError::PinOutOfRange { index: 3, .. })
    ));
    assert!(matches!(
        graph.serialize(),
        Err(GraphError::UnboundInput { slot: 0, .. })
    ));

    graph.bind(node, 0, source.clone()).unwrap();
    assert!(matches!(
        graph.bind(node, 0, source.clone()),
        Err(GraphError::SlotAlreadyBound { slot: 0, .. })
    ));

    let other = graph.add_node(Filter::new("null"), 1, 1);
    assert!(matches!(
        graph.bind(other, 0, source),
        Err(GraphError::PinAlreadyConsumed { .. })
    ));
}
