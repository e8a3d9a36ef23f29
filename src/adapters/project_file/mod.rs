// Project file adapter - Timeline documents stored as JSON or YAML

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::model::ProjectDocument;
use crate::error::{ReelError, ReelResult};
use crate::ports::*;

/// On-disk project formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    Json,
    Yaml,
}

impl ProjectFormat {
    /// Format implied by the file extension, JSON when unknown
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => ProjectFormat::Yaml,
            _ => ProjectFormat::Json,
        }
    }
}

/// Reads and writes project documents on the local file system
#[derive(Debug, Default, Clone)]
pub struct ProjectFileAdapter;

impl ProjectFileAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Parse document text in the given format
    pub fn parse(content: &str, format: ProjectFormat) -> ReelResult<ProjectDocument> {
        let project = match format {
            ProjectFormat::Json => serde_json::from_str(content)?,
            ProjectFormat::Yaml => serde_yaml::from_str(content)?,
        };
        Ok(project)
    }

    /// Render a document in the given format
    pub fn render(project: &ProjectDocument, format: ProjectFormat) -> ReelResult<String> {
        let text = match format {
            ProjectFormat::Json => serde_json::to_string_pretty(project)?,
            ProjectFormat::Yaml => serde_yaml::to_string(project)?,
        };
        Ok(text)
    }
}

fn project_error(path: &str, err: impl std::fmt::Display) -> ReelError {
    ReelError::ProjectError {
        path: path.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl ProjectPort for ProjectFileAdapter {
    async fn load_project(&self, path: &str) -> ReelResult<ProjectDocument> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| project_error(path, e))?;
        let format = ProjectFormat::from_path(Path::new(path));
        let project = Self::parse(&content, format).map_err(|e| project_error(path, e))?;

        info!(
            path,
            clips = project.clips.len(),
            canvas = %project.canvas,
            "loaded project"
        );
        Ok(project)
    }

    async fn save_project(&self, path: &str, project: &ProjectDocument) -> ReelResult<()> {
        let target = Path::new(path);
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = Self::render(project, ProjectFormat::from_path(target))?;
        tokio::fs::write(target, text).await?;
        debug!(path, "saved project");
        Ok(())
    }
}
