//! ffmpeg command line construction

use crate::output::ExportJob;

/// Full ffmpeg argument vector for an export, without the program name
pub fn build_ffmpeg_args(job: &ExportJob) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), "-hide_banner".into()];

    for path in &job.graph.input_paths {
        args.push("-i".into());
        args.push(path.clone());
    }

    args.push("-filter_complex".into());
    args.push(job.graph.graph_text.clone());
    args.push("-map".into());
    args.push(job.graph.video_pin.clone());
    args.push("-map".into());
    args.push(job.graph.audio_pin.clone());

    args.extend(video_codec_args(job));

    args.push("-threads".into());
    args.push(job.settings.effective_threads().to_string());
    args.extend([
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        job.settings.audio_bitrate.clone(),
    ]);

    args.push(job.output_path.to_string_lossy().to_string());
    args
}

fn video_codec_args(job: &ExportJob) -> Vec<String> {
    let crf = job.settings.crf.to_string();
    let mut args = vec!["-c:v".to_string(), job.encoder.codec_name().to_string()];
    if job.encoder.is_hardware() {
        args.extend(
            ["-pix_fmt", "yuv420p", "-preset", "p4", "-rc", "vbr", "-cq"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(crf);
    } else {
        args.push("-preset".into());
        args.push(job.settings.preset.clone());
        args.push("-crf".into());
        args.push(crf);
    }
    args
}

/// Render an argument vector as a copy-pasteable shell line
pub fn shell_line(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|a| shell_quote(a)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '+' | '='));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}
