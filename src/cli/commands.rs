//! Command implementations

use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::AppConfig;
use crate::app::{AppContainer, CompileRequest, DefaultAppContainer, ExportRequest};
use crate::cli::args::{ArgsArgs, CanvasArgs, CompileArgs, ExportArgs, WindowArgs};
use crate::domain::model::{Canvas, RenderWindow, ResolutionPreset};
use crate::engine::CompiledGraph;
use crate::output::command::{build_ffmpeg_args, shell_line};
use crate::output::ExportProgress;
use crate::utils::time::TimeParser;

/// Percentage step between progress log lines
const PROGRESS_STEP: f64 = 5.0;

/// Execute the compile command
pub async fn compile(args: CompileArgs, config: &AppConfig) -> Result<()> {
    let request = CompileRequest {
        project_path: args.project.clone(),
        window: parse_window(&args.window)?,
        canvas: parse_canvas(&args.canvas)?,
        is_export: args.export,
    };

    let container = DefaultAppContainer::new(config);
    let compiled = container
        .compile_interactor()
        .execute(&request)
        .await
        .with_context(|| format!("Failed to compile project '{}'", args.project))?;

    if args.json {
        let json = serde_json::to_string_pretty(&compiled)
            .context("Failed to serialize compiled graph to JSON")?;
        println!("{}", json);
    } else {
        display_compiled(&compiled);
    }
    Ok(())
}

/// Execute the export command
pub async fn export(args: ExportArgs, config: &AppConfig) -> Result<()> {
    let mut request = ExportRequest::new(args.project.clone(), args.output.clone());
    request.window = parse_window(&args.window)?;
    request.canvas = parse_canvas(&args.canvas)?;

    let container = DefaultAppContainer::new(config);
    let last_logged = Mutex::new(-PROGRESS_STEP);
    let on_progress = |progress: ExportProgress| {
        if let Ok(mut last) = last_logged.lock() {
            if progress.percent - *last >= PROGRESS_STEP || progress.percent >= 100.0 {
                *last = progress.percent;
                info!(
                    percent = %format!("{:.1}", progress.percent),
                    speed = %progress.speed,
                    eta_seconds = ?progress.eta_seconds.map(|e| e.round()),
                    "rendering"
                );
            }
        }
    };

    let report = container
        .export_interactor()
        .execute(&request, &on_progress)
        .await
        .with_context(|| format!("Failed to export project '{}'", args.project))?;

    let elapsed = report.elapsed().num_milliseconds() as f64 / 1000.0;
    println!(
        "Exported {} ({:.2}s of timeline) in {:.1}s with {}",
        report.output_path.display(),
        report.duration,
        elapsed,
        report.encoder
    );
    Ok(())
}

/// Execute the args command
pub async fn print_args(args: ArgsArgs, config: &AppConfig) -> Result<()> {
    let mut request = ExportRequest::new(args.project.clone(), args.output.clone());
    request.window = parse_window(&args.window)?;
    request.canvas = parse_canvas(&args.canvas)?;

    let container = DefaultAppContainer::new(config);
    let job = container
        .export_interactor()
        .prepare(&request)
        .await
        .with_context(|| format!("Failed to prepare export of '{}'", args.project))?;

    let argv = build_ffmpeg_args(&job);
    if args.lines {
        println!("{}", config.export.ffmpeg);
        for arg in &argv {
            println!("{}", arg);
        }
    } else {
        println!("{}", shell_line(&config.export.ffmpeg, &argv));
    }
    Ok(())
}

/// Render window from `--start`/`--duration`
pub fn parse_window(args: &WindowArgs) -> Result<RenderWindow> {
    let parser = TimeParser::new();
    let start = match &args.start {
        Some(s) => parser
            .parse_time(s)
            .with_context(|| format!("Invalid start time '{}'", s))?,
        None => 0.0,
    };
    match &args.duration {
        Some(d) => {
            let duration = parser
                .parse_time(d)
                .with_context(|| format!("Invalid duration '{}'", d))?;
            RenderWindow::bounded(start, duration).context("Invalid render window")
        }
        None => Ok(RenderWindow::from_start(start)),
    }
}

/// Canvas override from `--width`/`--height` or `--preset`
pub fn parse_canvas(args: &CanvasArgs) -> Result<Option<Canvas>> {
    if let (Some(width), Some(height)) = (args.width, args.height) {
        return Ok(Some(Canvas::new(width, height)));
    }
    match &args.preset {
        Some(name) => {
            let preset: ResolutionPreset = name
                .parse()
                .with_context(|| format!("Invalid resolution preset '{}'", name))?;
            Ok(Some(preset.canvas()))
        }
        None => Ok(None),
    }
}

/// Display a compiled graph in human-readable format
fn display_compiled(compiled: &CompiledGraph) {
    println!("Inputs:");
    if compiled.input_paths.is_empty() {
        println!("  (none)");
    }
    for (index, path) in compiled.input_paths.iter().enumerate() {
        println!("  {}: {}", index, path);
    }
    println!(
        "Duration: {} ({:.3}s)",
        TimeParser::new().format_time(compiled.duration),
        compiled.duration
    );
    println!("Video: {}", compiled.video_pin);
    println!("Audio: {}", compiled.audio_pin);
    println!("Filter graph:");
    for chain in compiled.graph_text.split(';') {
        println!("  {}", chain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_defaults_to_whole_timeline() {
        let window = parse_window(&WindowArgs::default()).unwrap();
        assert_eq!(window, RenderWindow::from_start(0.0));
    }

    #[test]
    fn window_accepts_timestamps() {
        let window = parse_window(&WindowArgs {
            start: Some("00:10".to_string()),
            duration: Some("5".to_string()),
        })
        .unwrap();
        assert_eq!(window, RenderWindow::bounded(10.0, 5.0).unwrap());
    }

    #[test]
    fn zero_duration_window_is_rejected() {
        let err = parse_window(&WindowArgs {
            start: None,
            duration: Some("0".to_string()),
        });
        assert!(err.is_err());
    }

    #[test]
    fn canvas_from_size_or_preset() {
        let sized = parse_canvas(&CanvasArgs {
            width: Some(1280),
            height: Some(720),
            preset: None,
        })
        .unwrap();
        assert_eq!(sized, Some(Canvas::new(1280, 720)));

        let preset = parse_canvas(&CanvasArgs {
            preset: Some("portrait".to_string()),
            ..CanvasArgs::default()
        })
        .unwrap();
        assert_eq!(preset, Some(Canvas::new(1080, 1920)));

        assert_eq!(parse_canvas(&CanvasArgs::default()).unwrap(), None);
        assert!(parse_canvas(&CanvasArgs {
            preset: Some("cinema".to_string()),
            ..CanvasArgs::default()
        })
        .is_err());
    }
}
