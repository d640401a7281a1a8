//! Console page
//!
//! One full HTML page per request, built from the controller's current
//! state. Result fragments come from [`ViewRenderer`] and are embedded as is.

use askama::Template;
use serde::{Deserialize, Serialize};

use crate::controller::{PipelineController, Tab};
use crate::gateway::Gateway;
use crate::model::{Layout, VizKind};
use crate::render::{RenderResult, ViewRenderer};
use crate::state::Controls;
use crate::status::{Slot, StatusMessage};

/// Visualization options last chosen in the console
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VizSelection {
    pub kind: VizKind,
    pub layout: Layout,
}

struct Choice {
    value: &'static str,
    label: &'static str,
    selected: bool,
    /// Whether the layout selector applies
    spatial: bool,
}

struct TabLink {
    name: &'static str,
    label: &'static str,
    active: bool,
}

#[derive(Template)]
#[template(path = "console.html")]
struct ConsoleTemplate<'a> {
    stage: String,
    controls: Controls,
    kinds: Vec<Choice>,
    layouts: Vec<Choice>,
    upload_status: Option<String>,
    build_status: Option<String>,
    visualize_status: Option<String>,
    busy: Option<String>,
    alert: Option<&'a StatusMessage>,
    preview: Option<&'a str>,
    tabs: Vec<TabLink>,
    active_tab: &'static str,
    graph_info: Option<String>,
    analytics: Option<String>,
    visualization: Option<String>,
}

#[derive(Template)]
#[template(path = "busy.html")]
struct BusyTemplate<'a> {
    label: &'a str,
}

fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::GraphInfo => "Graph Info",
        Tab::Analytics => "Analytics",
        Tab::Visualization => "Visualization",
    }
}

/// Render the console for one session.
pub fn render_console<G: Gateway>(
    controller: &PipelineController<G>,
    selection: VizSelection,
    backend_url: &str,
) -> RenderResult<String> {
    let status = controller.status();
    let inline = |slot: Slot| -> RenderResult<Option<String>> {
        status.message(slot).map(ViewRenderer::status).transpose()
    };
    let results = controller.results();

    let kinds = VizKind::ALL
        .into_iter()
        .map(|kind| Choice {
            value: kind.as_str(),
            label: kind.label(),
            selected: kind == selection.kind,
            spatial: kind.uses_layout(),
        })
        .collect();
    let layouts = Layout::ALL
        .into_iter()
        .map(|layout| Choice {
            value: layout.as_str(),
            label: layout.as_str(),
            selected: layout == selection.layout,
            spatial: true,
        })
        .collect();
    let tabs = [Tab::GraphInfo, Tab::Analytics, Tab::Visualization]
        .into_iter()
        .map(|tab| TabLink {
            name: tab.as_str(),
            label: tab_label(tab),
            active: tab == results.active_tab,
        })
        .collect();

    let template = ConsoleTemplate {
        stage: format!("{:?}", controller.stage()),
        // No script tracks the file input, so the button stays enabled and
        // `required` blocks empty submits. Empty uploads are skipped anyway.
        controls: controller.controls(true, selection.kind),
        kinds,
        layouts,
        upload_status: inline(Slot::Upload)?,
        build_status: inline(Slot::Build)?,
        visualize_status: inline(Slot::Visualize)?,
        busy: controller.busy().label(),
        alert: status.alert(),
        preview: results.upload_preview.as_deref(),
        tabs,
        active_tab: results.active_tab.as_str(),
        graph_info: results
            .graph_info
            .as_ref()
            .map(ViewRenderer::graph_info)
            .transpose()?,
        analytics: results
            .analytics
            .as_ref()
            .map(ViewRenderer::analytics)
            .transpose()?,
        visualization: results
            .mount
            .current()
            .map(|artifact| ViewRenderer::mount(artifact, backend_url))
            .transpose()?,
    };
    Ok(template.render()?)
}

/// Page shown while a backend call holds the session. Refreshes itself.
pub fn render_busy(label: &str) -> RenderResult<String> {
    Ok(BusyTemplate { label }.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{
        GatewayError, GatewayResult, UploadFile, UploadedArtifact, VisualizationArtifact,
    };
    use crate::model::{AnalyticsReport, GraphDocument};
    use async_trait::async_trait;

    /// Backend that accepts uploads and fails everything else.
    struct UploadOnly;

    #[async_trait]
    impl Gateway for UploadOnly {
        async fn upload(&self, _file: &UploadFile) -> GatewayResult<UploadedArtifact> {
            Ok(UploadedArtifact {
                artifact_id: "doc1".into(),
                char_count: 1200,
                preview: Some("Once upon a time".into()),
            })
        }

        async fn build_graph(&self, _artifact_id: &str) -> GatewayResult<GraphDocument> {
            Err(GatewayError::Remote("parse timeout".into()))
        }

        async fn visualize(
            &self,
            _graph: &GraphDocument,
            _kind: VizKind,
            _layout: Option<Layout>,
        ) -> GatewayResult<VisualizationArtifact> {
            Err(GatewayError::Remote("unreachable".into()))
        }

        async fn analyze(&self, _graph: &GraphDocument) -> GatewayResult<AnalyticsReport> {
            Err(GatewayError::Remote("unreachable".into()))
        }
    }

    #[test]
    fn idle_console_disables_downstream_triggers() {
        let controller = PipelineController::new(UploadOnly);
        let html = render_console(&controller, VizSelection::default(), "http://b").unwrap();

        assert!(html.contains("id=\"build-button\" disabled"));
        assert!(html.contains("id=\"visualize-button\" disabled"));
        assert!(html.contains("id=\"analyze-button\" disabled"));
        assert!(!html.contains("id=\"alert\""));
        assert!(!html.contains("status-message"));
        assert!(html.contains("<form method=\"post\" action=\"/tab/analytics\">"));
    }

    #[tokio::test]
    async fn console_shows_status_and_preview() {
        let mut controller = PipelineController::new(UploadOnly);
        controller.upload(UploadFile::new("doc1.txt", "x")).await;
        controller.build_graph().await;

        let html = render_console(&controller, VizSelection::default(), "http://b").unwrap();
        assert!(html.contains("Upload succeeded: 1200 characters"));
        assert!(html.contains("Build failed: parse timeout"));
        assert!(html.contains("Once upon a time"));
        assert!(html.contains("id=\"build-button\">"));
        assert!(html.contains("id=\"visualize-button\" disabled"));
    }

    #[test]
    fn busy_page_refreshes() {
        let html = render_busy("Analyzing graph...").unwrap();
        assert!(html.contains("http-equiv=\"refresh\""));
        assert!(html.contains("Analyzing graph..."));
    }

    #[test]
    fn layout_selector_hidden_for_flat_kinds() {
        let controller = PipelineController::new(UploadOnly);
        let spatial = render_console(&controller, VizSelection::default(), "http://b").unwrap();
        assert!(spatial.contains("id=\"layout-row\">"));

        let selection = VizSelection {
            kind: VizKind::Heatmap,
            layout: Layout::Spring,
        };
        let flat = render_console(&controller, selection, "http://b").unwrap();
        assert!(flat.contains("id=\"layout-row\" hidden"));
        assert!(flat.contains("value=\"heatmap\" selected"));
    }
}
