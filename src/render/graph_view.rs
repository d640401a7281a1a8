//! Graph document → graph-info view

use serde::Serialize;

use super::format_number;
use crate::model::{GraphDocument, Id};

pub const UNKNOWN: &str = "Unknown";
pub const NONE: &str = "None";
pub const NO_DESCRIPTION: &str = "-";
/// Weight shown for edges that carry none, or carry zero
pub const DEFAULT_EDGE_WEIGHT: f64 = 5.0;
pub const WEIGHT_SCALE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphInfoView {
    pub metadata: MetadataBlock,
    /// `None` when the document has no aspects
    pub aspects: Option<Vec<String>>,
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes: Vec<NodeRow>,
    pub edges: Vec<EdgeRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataBlock {
    pub title: String,
    pub theme: String,
    pub abstract_text: String,
    pub reader: Option<String>,
    pub purpose: Option<String>,
    pub purposes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRow {
    pub id: String,
    pub name: String,
    pub node_type: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRow {
    pub source: String,
    pub relation: String,
    pub target: String,
    /// e.g. `7/10`
    pub weight: String,
}

/// Text that is present and not blank.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn or_placeholder(value: &Option<String>, placeholder: &str) -> String {
    present(value).unwrap_or(placeholder).to_string()
}

/// Zero and NaN weights display as the default.
fn display_weight(weight: Option<f64>) -> f64 {
    weight
        .filter(|w| *w != 0.0 && !w.is_nan())
        .unwrap_or(DEFAULT_EDGE_WEIGHT)
}

/// Project a graph document into its inspection view.
///
/// Rows mirror input order. Edge endpoints resolve to node names and fall
/// back to the raw id when no node carries it. Blank metadata and
/// descriptions show their placeholders.
pub fn project_graph(graph: &GraphDocument) -> GraphInfoView {
    let metadata = MetadataBlock {
        title: or_placeholder(&graph.title, UNKNOWN),
        theme: or_placeholder(&graph.theme, UNKNOWN),
        abstract_text: or_placeholder(&graph.abstract_text, NONE),
        reader: graph.reader.clone(),
        purpose: graph.purpose.clone(),
        purposes: graph.purposes.clone(),
    };

    let aspects = (!graph.aspects.is_empty()).then(|| graph.aspects.clone());

    let nodes = graph
        .nodes
        .iter()
        .map(|n| NodeRow {
            id: n.id.to_string(),
            name: n.name.clone(),
            node_type: n.node_type.clone(),
            description: or_placeholder(&n.description, NO_DESCRIPTION),
        })
        .collect();

    let resolve = |id: &Id| {
        graph
            .node(id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let edges = graph
        .edges
        .iter()
        .map(|e| EdgeRow {
            source: resolve(&e.source),
            relation: e.relation.clone(),
            target: resolve(&e.target),
            weight: format!("{}/{WEIGHT_SCALE}", format_number(display_weight(e.weight))),
        })
        .collect();

    GraphInfoView {
        metadata,
        aspects,
        node_count: graph.nodes.len(),
        edge_count: graph.edges.len(),
        nodes,
        edges,
    }
}
