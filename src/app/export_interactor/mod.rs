// Export interactor - Compiles a project for export and runs the backend

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::app::compile_interactor::{CompileInteractor, CompileRequest};
use crate::domain::model::{Canvas, RenderWindow};
use crate::error::ReelResult;
use crate::output::{ExportJob, ExportProgress, ExportReport, ExportSettings};
use crate::ports::*;

/// What to export and where
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub project_path: String,
    pub output_path: PathBuf,
    /// Overrides the project's canvas when set
    pub canvas: Option<Canvas>,
    /// Timeline range to render, the whole project by default
    pub window: RenderWindow,
}

impl ExportRequest {
    pub fn new(project_path: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            output_path: output_path.into(),
            canvas: None,
            window: RenderWindow::full(),
        }
    }
}

/// Interactor for the export use case
pub struct ExportInteractor {
    compile: Arc<CompileInteractor>,
    execute_port: Arc<dyn ExecutePort>,
    settings: ExportSettings,
}

impl ExportInteractor {
    /// Create new export interactor with injected ports
    pub fn new(
        compile: Arc<CompileInteractor>,
        execute_port: Arc<dyn ExecutePort>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            compile,
            execute_port,
            settings,
        }
    }

    /// Compile the whole project and pick the encoder, without running anything
    pub async fn prepare(&self, request: &ExportRequest) -> ReelResult<ExportJob> {
        let mut compile_request = CompileRequest::export(request.project_path.clone());
        compile_request.canvas = request.canvas;
        compile_request.window = request.window;
        let graph = self.compile.execute(&compile_request).await?;

        let encoder = match self.settings.pinned_encoder()? {
            Some(encoder) => encoder,
            None => self.execute_port.detect_encoder().await?,
        };

        Ok(ExportJob {
            graph,
            output_path: request.output_path.clone(),
            encoder,
            settings: self.settings.clone(),
        })
    }

    /// Run a full export
    pub async fn execute(
        &self,
        request: &ExportRequest,
        on_progress: &(dyn Fn(ExportProgress) + Send + Sync),
    ) -> ReelResult<ExportReport> {
        let job = self.prepare(request).await?;
        info!(
            output = %job.output_path.display(),
            encoder = %job.encoder,
            inputs = job.graph.input_paths.len(),
            "exporting project"
        );
        self.execute_port.run_export(&job, on_progress).await
    }
}
