//! HTML rendering of views
//!
//! Each view has an Askama template under `templates/`. Fragments are
//! rendered on their own so the console page and the standalone report can
//! compose them.

use askama::Template;
use thiserror::Error;

use super::{AnalyticsView, GraphInfoView};
use crate::mount::{EmbedKind, MountedArtifact};
use crate::status::StatusMessage;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Template)]
#[template(path = "graph_info.html")]
struct GraphInfoTemplate<'a> {
    view: &'a GraphInfoView,
}

#[derive(Template)]
#[template(path = "analytics.html")]
struct AnalyticsTemplate<'a> {
    view: &'a AnalyticsView,
}

#[derive(Template)]
#[template(path = "components/status.html")]
struct StatusTemplate<'a> {
    message: &'a StatusMessage,
}

#[derive(Template)]
#[template(path = "components/mount.html")]
struct MountTemplate<'a> {
    src: &'a str,
    is_document: bool,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    title: &'a str,
    body: &'a str,
}

/// Renders views and components to HTML.
pub struct ViewRenderer;

impl ViewRenderer {
    /// Graph-info tab: metadata, aspects, counts, node and edge tables.
    pub fn graph_info(view: &GraphInfoView) -> RenderResult<String> {
        Ok(GraphInfoTemplate { view }.render()?)
    }

    /// Analytics tab: whichever sections the view carries.
    pub fn analytics(view: &AnalyticsView) -> RenderResult<String> {
        Ok(AnalyticsTemplate { view }.render()?)
    }

    pub fn status(message: &StatusMessage) -> RenderResult<String> {
        Ok(StatusTemplate { message }.render()?)
    }

    /// Iframe for embeddable documents, image for static images.
    pub fn mount(artifact: &MountedArtifact, backend_url: &str) -> RenderResult<String> {
        let src = artifact.src(backend_url);
        let template = MountTemplate {
            src: &src,
            is_document: artifact.kind == EmbedKind::EmbeddableDocument,
        };
        Ok(template.render()?)
    }

    /// Standalone page around an already rendered fragment.
    pub fn report(title: &str, body: &str) -> RenderResult<String> {
        Ok(ReportTemplate { title, body }.render()?)
    }
}
