// Ports - Interface definitions (contracts)

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::error::ReelResult;
use crate::output::{ExportJob, ExportProgress, ExportReport, VideoEncoder};
use async_trait::async_trait;

/// Port for loading saved timeline documents
#[async_trait]
pub trait ProjectPort: Send + Sync {
    /// Load and parse a project document
    async fn load_project(&self, path: &str) -> ReelResult<ProjectDocument>;

    /// Write a project document, format chosen by extension
    async fn save_project(&self, path: &str, project: &ProjectDocument) -> ReelResult<()>;
}

/// Port for running the rendering backend
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Pick the best H.264 encoder the backend offers
    async fn detect_encoder(&self) -> ReelResult<VideoEncoder>;

    /// Run an export to completion, reporting progress lines as they arrive
    async fn run_export(
        &self,
        job: &ExportJob,
        on_progress: &(dyn Fn(ExportProgress) + Send + Sync),
    ) -> ReelResult<ExportReport>;
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    /// Directive string for an `EnvFilter`
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
