// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod project_file;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::FfmpegExecAdapter;
pub use project_file::ProjectFileAdapter;
pub use toml_config::{AppConfig, TomlConfigAdapter};
pub use tracing_log::init_tracing;
