//! Pipeline controller
//!
//! Enforces stage ordering: upload → build → (visualize | analyze)*. An
//! operation whose prerequisite is missing is skipped without any observable
//! effect. A successful call updates the state and the result views; a
//! failed call only reports. Operations take `&mut self`, so a session can
//! never have two calls in flight.

use serde::Serialize;
use tracing::{info, warn};

use crate::busy::BusyIndicator;
use crate::gateway::{Gateway, UploadFile};
use crate::model::{Layout, VizKind};
use crate::mount::VisualizationMount;
use crate::render::{AnalyticsView, GraphInfoView, project_analytics, project_graph};
use crate::state::{Controls, PipelineState, Stage};
use crate::status::{Channel, Severity, Slot, StatusReporter};

const UPLOAD_BUSY: &str = "Uploading file...";
const BUILD_BUSY: &str = "Building knowledge graph, this may take 1-2 minutes...";
const VISUALIZE_BUSY: &str = "Generating visualization...";
const ANALYZE_BUSY: &str = "Analyzing graph...";

/// Result of invoking a pipeline operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Prerequisite missing; nothing happened
    Skipped,
    Succeeded,
    /// The message that was reported
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

/// Result tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    GraphInfo,
    Analytics,
    Visualization,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::GraphInfo => "graph_info",
            Tab::Analytics => "analytics",
            Tab::Visualization => "visualization",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "graph_info" => Ok(Tab::GraphInfo),
            "analytics" => Ok(Tab::Analytics),
            "visualization" => Ok(Tab::Visualization),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

/// What the results area currently shows.
#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    pub active_tab: Tab,
    pub graph_info: Option<GraphInfoView>,
    pub analytics: Option<AnalyticsView>,
    pub mount: VisualizationMount,
    /// Start of the uploaded text, as returned by the backend
    pub upload_preview: Option<String>,
}

pub struct PipelineController<G> {
    gateway: G,
    state: PipelineState,
    status: StatusReporter,
    busy: BusyIndicator,
    results: ResultsView,
}

impl<G: Gateway> PipelineController<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: PipelineState::new(),
            status: StatusReporter::new(),
            busy: BusyIndicator::new(),
            results: ResultsView::default(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// Shared handle; clones observe the same indicator.
    pub fn busy(&self) -> BusyIndicator {
        self.busy.clone()
    }

    pub fn results(&self) -> &ResultsView {
        &self.results
    }

    pub fn controls(&self, file_selected: bool, kind: VizKind) -> Controls {
        Controls::derive(&self.state, file_selected, kind)
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.results.active_tab = tab;
    }

    pub fn dismiss_alert(&mut self) {
        self.status.dismiss_alert();
    }

    /// Upload a document. Skipped when no file is selected.
    pub async fn upload(&mut self, file: UploadFile) -> Outcome {
        if !file.is_selected() {
            return Outcome::Skipped;
        }
        let _busy = self.busy.begin(UPLOAD_BUSY);

        match self.gateway.upload(&file).await {
            Ok(artifact) => {
                info!(artifact = %artifact.artifact_id, chars = artifact.char_count, "upload succeeded");
                self.state.accept_upload(artifact.artifact_id);
                self.results = ResultsView {
                    upload_preview: artifact.preview,
                    ..ResultsView::default()
                };
                self.status.report(
                    Channel::Inline(Slot::Upload),
                    Severity::Success,
                    format!("Upload succeeded: {} characters", artifact.char_count),
                );
                Outcome::Succeeded
            }
            Err(err) => self.fail(Channel::Inline(Slot::Upload), "Upload", &err),
        }
    }

    /// Build the graph for the uploaded artifact. Skipped before an upload.
    pub async fn build_graph(&mut self) -> Outcome {
        let Some(artifact_id) = self.state.artifact_id().map(str::to_owned) else {
            return Outcome::Skipped;
        };
        let _busy = self.busy.begin(BUILD_BUSY);

        match self.gateway.build_graph(&artifact_id).await {
            Ok(graph) => {
                info!(
                    nodes = graph.nodes.len(),
                    edges = graph.edges.len(),
                    "graph built"
                );
                self.results.graph_info = Some(project_graph(&graph));
                self.results.analytics = None;
                self.results.mount.clear();
                self.results.active_tab = Tab::GraphInfo;
                self.state.accept_graph(graph);
                self.status
                    .report(Channel::Inline(Slot::Build), Severity::Success, "Graph built");
                Outcome::Succeeded
            }
            Err(err) => self.fail(Channel::Inline(Slot::Build), "Build", &err),
        }
    }

    /// Render a visualization of the current graph. `layout` is only sent
    /// for kinds that are laid out. Skipped before a build.
    pub async fn visualize(&mut self, kind: VizKind, layout: Layout) -> Outcome {
        let Some(graph) = self.state.graph() else {
            return Outcome::Skipped;
        };
        let _busy = self.busy.begin(VISUALIZE_BUSY);
        let layout = kind.uses_layout().then_some(layout);

        let artifact = match self.gateway.visualize(graph, kind, layout).await {
            Ok(artifact) => artifact,
            Err(err) => return self.fail(Channel::Inline(Slot::Visualize), "Visualization", &err),
        };

        match self.results.mount.mount(&artifact.kind, artifact.path) {
            Ok(mounted) => {
                info!(kind = %mounted.kind, path = %mounted.path, "visualization mounted");
                self.results.active_tab = Tab::Visualization;
                self.status.report(
                    Channel::Inline(Slot::Visualize),
                    Severity::Success,
                    "Visualization ready",
                );
                Outcome::Succeeded
            }
            Err(err) => self.fail(Channel::Inline(Slot::Visualize), "Visualization", &err),
        }
    }

    /// Analyze the current graph. Failures raise an alert rather than an
    /// inline status. Skipped before a build.
    pub async fn analyze(&mut self) -> Outcome {
        let Some(graph) = self.state.graph() else {
            return Outcome::Skipped;
        };
        let _busy = self.busy.begin(ANALYZE_BUSY);

        match self.gateway.analyze(graph).await {
            Ok(report) => {
                let view = project_analytics(&report);
                info!(sections = view.sections().len(), "analysis complete");
                self.results.analytics = Some(view);
                self.results.active_tab = Tab::Analytics;
                self.state.accept_analytics(report);
                Outcome::Succeeded
            }
            Err(err) => self.fail(Channel::Alert, "Analysis", &err),
        }
    }

    fn fail(&mut self, channel: Channel, stage: &str, err: &dyn std::error::Error) -> Outcome {
        let message = format!("{stage} failed: {err}");
        warn!(%message, "pipeline stage failed");
        self.status.report(channel, Severity::Error, message.clone());
        Outcome::Failed(message)
    }
}
