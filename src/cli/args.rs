//! Command-line argument definitions

use clap::Args;
use clap_num::number_range;

fn parse_dimension(s: &str) -> Result<u32, String> {
    number_range(s, 2, 16384)
}

fn parse_crf(s: &str) -> Result<u8, String> {
    number_range(s, 0, 51)
}

/// Output frame size selection shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct CanvasArgs {
    /// Canvas width in pixels
    #[arg(long, requires = "height", value_parser = parse_dimension)]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long, requires = "width", value_parser = parse_dimension)]
    pub height: Option<u32>,

    /// Resolution preset (landscape, portrait, qhd, uhd)
    #[arg(long, conflicts_with_all = ["width", "height"])]
    pub preset: Option<String>,
}

/// Timeline range selection
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Window start (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long)]
    pub start: Option<String>,

    /// Window length; the rest of the project when omitted
    #[arg(short, long)]
    pub duration: Option<String>,
}

/// Arguments for the compile command
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Project file (.json, .yaml or .yml)
    #[arg(short, long)]
    pub project: String,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub canvas: CanvasArgs,

    /// Compile for export (adds square-pixel normalization)
    #[arg(long)]
    pub export: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Encoder selection shared by export and args
#[derive(Args, Debug, Clone, Default)]
pub struct EncoderArgs {
    /// Video codec (auto, libx264, h264_nvenc, h264_qsv, h264_amf)
    #[arg(long)]
    pub codec: Option<String>,

    /// Constant Rate Factor (0-51)
    #[arg(long, value_parser = parse_crf)]
    pub crf: Option<u8>,

    /// Encoding preset for libx264
    #[arg(long = "x264-preset")]
    pub x264_preset: Option<String>,

    /// Encoder threads (0 = all cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// ffmpeg executable
    #[arg(long)]
    pub ffmpeg: Option<String>,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Project file (.json, .yaml or .yml)
    #[arg(short, long)]
    pub project: String,

    /// Output file path
    #[arg(short, long)]
    pub output: String,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub canvas: CanvasArgs,

    #[command(flatten)]
    pub encoder: EncoderArgs,
}

/// Arguments for the args command
#[derive(Args, Debug)]
pub struct ArgsArgs {
    /// Project file (.json, .yaml or .yml)
    #[arg(short, long)]
    pub project: String,

    /// Output file path placed at the end of the command
    #[arg(short, long, default_value = "export.mp4")]
    pub output: String,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub canvas: CanvasArgs,

    #[command(flatten)]
    pub encoder: EncoderArgs,

    /// Print one argument per line instead of a shell command
    #[arg(long)]
    pub lines: bool,
}
