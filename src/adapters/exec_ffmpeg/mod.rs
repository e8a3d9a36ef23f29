//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` command line tool on the tokio runtime: encoder
//! detection through `-encoders` and exports fed by a compiled graph.

use std::collections::VecDeque;
use std::process::Stdio;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{ReelError, ReelResult};
use crate::output::command::{build_ffmpeg_args, shell_line};
use crate::output::progress::parse_progress;
use crate::output::{ExportJob, ExportProgress, ExportReport, VideoEncoder};
use crate::ports::*;

/// stderr lines kept for the error message of a failed run
const STDERR_TAIL: usize = 8;

/// FFmpeg-based execution adapter
pub struct FfmpegExecAdapter {
    program: String,
}

impl FfmpegExecAdapter {
    /// Create an adapter running `program`, usually just `ffmpeg`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn spawn_error(&self, e: std::io::Error) -> ReelError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ReelError::Backend {
                code: None,
                message: format!("'{}' not found on PATH", self.program),
            }
        } else {
            ReelError::IoError(e)
        }
    }
}

/// Best encoder named in an `ffmpeg -encoders` listing
pub fn pick_encoder(listing: &str) -> VideoEncoder {
    VideoEncoder::PREFERENCE
        .into_iter()
        .find(|encoder| {
            listing
                .split_whitespace()
                .any(|word| word == encoder.codec_name())
        })
        .unwrap_or(VideoEncoder::X264)
}

#[async_trait]
impl ExecutePort for FfmpegExecAdapter {
    async fn detect_encoder(&self) -> ReelResult<VideoEncoder> {
        let output = Command::new(&self.program)
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .output()
            .await;

        let encoder = match output {
            Ok(out) if out.status.success() => {
                let mut listing = String::from_utf8_lossy(&out.stdout).into_owned();
                listing.push_str(&String::from_utf8_lossy(&out.stderr));
                pick_encoder(&listing)
            }
            Ok(out) => {
                warn!(status = %out.status, "encoder listing failed, using libx264");
                VideoEncoder::X264
            }
            Err(e) => {
                warn!(error = %e, "encoder detection failed, using libx264");
                VideoEncoder::X264
            }
        };

        if encoder.is_hardware() {
            info!(%encoder, "hardware encoder detected");
        } else {
            info!("no hardware encoder found, using libx264");
        }
        Ok(encoder)
    }

    async fn run_export(
        &self,
        job: &ExportJob,
        on_progress: &(dyn Fn(ExportProgress) + Send + Sync),
    ) -> ReelResult<ExportReport> {
        let args = build_ffmpeg_args(job);
        info!(command = %shell_line(&self.program, &args), "starting export");

        let started_at = Utc::now();
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL);
        if let Some(stderr) = child.stderr.take() {
            // ffmpeg ends status lines with \r, so split on both
            let mut lines = BufReader::new(stderr).split(b'\r');
            while let Some(chunk) = lines.next_segment().await? {
                for line in String::from_utf8_lossy(&chunk).lines() {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match parse_progress(line, job.graph.duration) {
                        Some(progress) => {
                            debug!(percent = progress.percent, speed = %progress.speed, "export progress");
                            on_progress(progress);
                        }
                        None => {
                            if tail.len() == STDERR_TAIL {
                                tail.pop_front();
                            }
                            tail.push_back(line.to_string());
                        }
                    }
                }
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            let message = tail.into_iter().collect::<Vec<_>>().join("\n");
            return Err(ReelError::Backend {
                code: status.code(),
                message,
            });
        }

        let report = ExportReport {
            output_path: job.output_path.clone(),
            encoder: job.encoder,
            started_at,
            finished_at: Utc::now(),
            duration: job.graph.duration,
        };
        info!(
            output = %report.output_path.display(),
            elapsed_ms = report.elapsed().num_milliseconds(),
            "export finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "Encoders:
 V..... = Video
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC (codec h264)
 V....D h264_amf             AMD AMF H.264 Encoder (codec h264)
 V....D h264_qsv             H.264 / AVC / MPEG-4 AVC (Intel Quick Sync Video acceleration) (codec h264)
 A....D aac                  AAC (Advanced Audio Coding)";

    #[test]
    fn prefers_qsv_over_amf() {
        assert_eq!(pick_encoder(LISTING), VideoEncoder::Qsv);
    }

    #[test]
    fn nvenc_wins_when_present() {
        let listing = format!("{}\n V....D h264_nvenc           NVIDIA NVENC H.264 encoder", LISTING);
        assert_eq!(pick_encoder(&listing), VideoEncoder::Nvenc);
    }

    #[test]
    fn falls_back_to_libx264() {
        assert_eq!(pick_encoder(" V....D libx264  libx264 H.264"), VideoEncoder::X264);
        assert_eq!(pick_encoder(""), VideoEncoder::X264);
    }

    #[tokio::test]
    async fn missing_program_falls_back_on_detection() {
        let adapter = FfmpegExecAdapter::new("reelgraph-no-such-ffmpeg");
        assert_eq!(adapter.detect_encoder().await.unwrap(), VideoEncoder::X264);
    }
}
