//! Headless pipeline run
//!
//! Drives the same controller as the console from the command line and
//! writes the results to an output directory:
//!
//! - `graph.json` / `graph.html`: the built graph and its inspection view
//! - `analytics.json` / `analytics.html`: the analytics report, when requested
//!
//! The run stops at the first stage that does not succeed.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::controller::{Outcome, PipelineController};
use crate::gateway::{Gateway, UploadFile};
use crate::model::{Layout, VizKind};
use crate::render::{RenderError, ViewRenderer};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A pipeline stage was skipped or failed
    #[error("{0}")]
    Stage(String),
}

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Visualization to request after the build, if any
    pub viz: Option<VizKind>,
    pub layout: Layout,
    pub analytics: bool,
}

/// What a run produced
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub artifact_id: String,
    pub written: Vec<PathBuf>,
    /// Absolute URL of the rendered visualization on the backend
    pub visualization: Option<String>,
}

/// Writes pipeline results as standalone files.
pub struct ReportWriter {
    output: PathBuf,
}

impl ReportWriter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }

    fn write_pair<T: serde::Serialize>(
        &self,
        stem: &str,
        value: &T,
        title: &str,
        fragment: &str,
    ) -> ReportResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.output)?;

        let json_path = self.output.join(format!("{stem}.json"));
        fs::write(&json_path, serde_json::to_string_pretty(value)?)?;

        let html_path = self.output.join(format!("{stem}.html"));
        fs::write(&html_path, ViewRenderer::report(title, fragment)?)?;

        Ok(vec![json_path, html_path])
    }

    /// Write the graph and analytics the controller currently holds.
    pub fn write<G: Gateway>(&self, controller: &PipelineController<G>) -> ReportResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        let state = controller.state();
        let results = controller.results();

        if let (Some(graph), Some(view)) = (state.graph(), results.graph_info.as_ref()) {
            let title = format!("Knowledge graph: {}", view.metadata.title);
            let fragment = ViewRenderer::graph_info(view)?;
            written.extend(self.write_pair("graph", graph, &title, &fragment)?);
        }

        if let (Some(report), Some(view)) = (state.analytics(), results.analytics.as_ref()) {
            let fragment = ViewRenderer::analytics(view)?;
            written.extend(self.write_pair("analytics", report, "Graph analytics", &fragment)?);
        }

        Ok(written)
    }
}

fn require(stage: &str, outcome: Outcome) -> ReportResult<()> {
    match outcome {
        Outcome::Succeeded => Ok(()),
        Outcome::Skipped => Err(ReportError::Stage(format!(
            "{stage} skipped: prerequisite missing"
        ))),
        Outcome::Failed(message) => Err(ReportError::Stage(message)),
    }
}

/// Run upload → build → (visualize) → (analyze) and write the results.
pub async fn run<G: Gateway>(
    controller: &mut PipelineController<G>,
    options: &RunOptions,
    backend_url: &str,
) -> ReportResult<RunSummary> {
    let file = read_input(&options.input)?;
    require("Upload", controller.upload(file).await)?;
    require("Build", controller.build_graph().await)?;

    let mut visualization = None;
    if let Some(kind) = options.viz {
        require("Visualization", controller.visualize(kind, options.layout).await)?;
        visualization = controller
            .results()
            .mount
            .current()
            .map(|artifact| artifact.src(backend_url));
    }

    if options.analytics {
        require("Analysis", controller.analyze().await)?;
    }

    let written = ReportWriter::new(&options.output).write(controller)?;
    info!(files = written.len(), output = %options.output.display(), "reports written");

    Ok(RunSummary {
        artifact_id: controller
            .state()
            .artifact_id()
            .unwrap_or_default()
            .to_string(),
        written,
        visualization,
    })
}

fn read_input(path: &Path) -> ReportResult<UploadFile> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(UploadFile::new(name, bytes))
}
