use std::sync::Arc;

use crate::adapters::{AppConfig, FfmpegExecAdapter, ProjectFileAdapter};
use crate::app::{compile_interactor::CompileInteractor, export_interactor::ExportInteractor};
use crate::ports::{ExecutePort, ProjectPort};

pub trait AppContainer: Send + Sync {
    fn compile_interactor(&self) -> Arc<CompileInteractor>;
    fn export_interactor(&self) -> Arc<ExportInteractor>;
}

pub struct DefaultAppContainer {
    compile_interactor: Arc<CompileInteractor>,
    export_interactor: Arc<ExportInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Self {
        let project_port = Arc::new(ProjectFileAdapter::new());
        let execute_port = Arc::new(FfmpegExecAdapter::new(config.export.ffmpeg.clone()));

        let compile_interactor = Arc::new(CompileInteractor::new(
            Arc::clone(&project_port) as Arc<dyn ProjectPort>,
            config.compiler.clone(),
        ));

        let export_interactor = Arc::new(ExportInteractor::new(
            Arc::clone(&compile_interactor),
            Arc::clone(&execute_port) as Arc<dyn ExecutePort>,
            config.export.clone(),
        ));

        Self {
            compile_interactor,
            export_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn compile_interactor(&self) -> Arc<CompileInteractor> {
        Arc::clone(&self.compile_interactor)
    }

    fn export_interactor(&self) -> Arc<ExportInteractor> {
        Arc::clone(&self.export_interactor)
    }
}
