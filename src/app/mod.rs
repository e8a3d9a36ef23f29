// Application layer - Use case interactors

pub mod compile_interactor;
pub mod container;
pub mod export_interactor;

// Re-export interactors
pub use compile_interactor::{CompileInteractor, CompileRequest};
pub use container::{AppContainer, DefaultAppContainer};
pub use export_interactor::{ExportInteractor, ExportRequest};
