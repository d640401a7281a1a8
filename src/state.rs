//! Session pipeline state
//!
//! One [`PipelineState`] exists per session and is owned by the controller.
//! Everything else sees it through the read-only accessors.

use serde::Serialize;

use crate::model::{AnalyticsReport, GraphDocument, VizKind};

/// How far the pipeline has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Uploaded,
    /// Visualize and analyze are available from here, repeatedly
    Built,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    artifact_id: Option<String>,
    graph: Option<GraphDocument>,
    analytics: Option<AnalyticsReport>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifact_id(&self) -> Option<&str> {
        self.artifact_id.as_deref()
    }

    pub fn graph(&self) -> Option<&GraphDocument> {
        self.graph.as_ref()
    }

    pub fn analytics(&self) -> Option<&AnalyticsReport> {
        self.analytics.as_ref()
    }

    pub fn stage(&self) -> Stage {
        match (&self.artifact_id, &self.graph) {
            (_, Some(_)) => Stage::Built,
            (Some(_), None) => Stage::Uploaded,
            (None, None) => Stage::Idle,
        }
    }

    /// A new document invalidates anything built from the previous one.
    pub(crate) fn accept_upload(&mut self, artifact_id: String) {
        self.artifact_id = Some(artifact_id);
        self.graph = None;
        self.analytics = None;
    }

    pub(crate) fn accept_graph(&mut self, graph: GraphDocument) {
        self.graph = Some(graph);
        self.analytics = None;
    }

    pub(crate) fn accept_analytics(&mut self, analytics: AnalyticsReport) {
        self.analytics = Some(analytics);
    }
}

/// Which triggers are enabled, derived from the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub upload: bool,
    pub build: bool,
    pub viz_kind: bool,
    pub visualize: bool,
    pub analyze: bool,
    /// Layout selector shown only for laid-out kinds
    pub layout_visible: bool,
}

impl Controls {
    pub fn derive(state: &PipelineState, file_selected: bool, kind: VizKind) -> Self {
        let built = state.graph().is_some();
        Self {
            upload: file_selected,
            build: state.artifact_id().is_some(),
            viz_kind: built,
            visualize: built,
            analyze: built,
            layout_visible: kind.uses_layout(),
        }
    }
}
