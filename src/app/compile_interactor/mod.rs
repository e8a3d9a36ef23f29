// Compile interactor - Turns a saved project into a filter graph

use std::sync::Arc;

use tracing::info;

use crate::domain::model::*;
use crate::engine::{CompiledGraph, CompilerSettings, GraphGenerator};
use crate::error::ReelResult;
use crate::ports::*;

/// What to compile
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub project_path: String,
    pub window: RenderWindow,
    /// Overrides the project's canvas when set
    pub canvas: Option<Canvas>,
    pub is_export: bool,
}

impl CompileRequest {
    /// Whole-project export of `project_path`
    pub fn export(project_path: impl Into<String>) -> Self {
        Self {
            project_path: project_path.into(),
            window: RenderWindow::full(),
            canvas: None,
            is_export: true,
        }
    }
}

/// Interactor for the compile use case
pub struct CompileInteractor {
    project_port: Arc<dyn ProjectPort>,
    settings: CompilerSettings,
}

impl CompileInteractor {
    /// Create new compile interactor with injected ports
    pub fn new(project_port: Arc<dyn ProjectPort>, settings: CompilerSettings) -> Self {
        Self {
            project_port,
            settings,
        }
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Load the project and compile it
    pub async fn execute(&self, request: &CompileRequest) -> ReelResult<CompiledGraph> {
        let project = self.project_port.load_project(&request.project_path).await?;
        self.compile(&project, request)
    }

    /// Compile an already loaded project
    pub fn compile(&self, project: &ProjectDocument, request: &CompileRequest) -> ReelResult<CompiledGraph> {
        let canvas = request.canvas.unwrap_or(project.canvas);
        let mix = project.mix();
        let compiled = GraphGenerator::new(&project.clips, canvas, &mix)
            .with_settings(self.settings.clone())
            .build(&request.window, request.is_export)?;

        info!(
            project = %request.project_path,
            %canvas,
            inputs = compiled.input_paths.len(),
            duration = compiled.duration,
            "project compiled"
        );
        Ok(compiled)
    }
}
