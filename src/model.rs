//! Pipeline data model
//!
//! Typed mirrors of the two payload families returned by the backend: the
//! [`GraphDocument`] produced by the build stage and the [`AnalyticsReport`]
//! produced by the analytics stage. Field names follow the backend's JSON.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A knowledge graph extracted from an uploaded document.
///
/// Immutable once received: a new build replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    /// Angles from which the document was analysed
    #[serde(default)]
    pub aspects: Vec<String>,
    /// Who the document is written for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader: Option<String>,
    /// How the graph helps its reader
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub purposes: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphDocument {
    /// Look up a node by id.
    pub fn node(&self, id: &Id) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }
}

/// An entity in the graph. `id` is unique within its document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: Id,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A directed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: Id,
    pub target: Id,
    pub relation: String,
    /// Relationship strength on a 1-10 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Multi-section result of graph analysis. Every section is independent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_stats: Option<BasicStats>,
    /// Metric key to ranking, in the order the backend produced them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centrality: Option<IndexMap<String, CentralityMetric>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_distribution: Option<TypeDistribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<CommunityReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<ConnectivityReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub node_count: u64,
    pub edge_count: u64,
    /// In `[0, 1]`
    pub density: f64,
    pub average_degree: f64,
    pub is_connected: bool,
    #[serde(alias = "component_count")]
    pub num_components: u64,
    /// Only computed by the backend for connected graphs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_shortest_path: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityMetric {
    pub description: String,
    /// Ordered by descending score
    #[serde(default)]
    pub top_nodes: Vec<ScoredNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDistribution {
    #[serde(default)]
    pub node_types: Vec<TypeShare>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relation_types: Vec<RelationCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_node_types: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_relation_types: Option<u64>,
}

/// One entity type's share of the graph. `percentage` arrives pre-rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
    #[serde(rename = "type")]
    pub type_name: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationCount {
    pub relation: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityReport {
    #[serde(default)]
    pub description: String,
    pub num_communities: u64,
    #[serde(default)]
    pub communities: Vec<Community>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub community_id: Id,
    pub size: u64,
    #[serde(default)]
    pub nodes: Vec<MemberNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityReport {
    pub num_components: u64,
    #[serde(default)]
    pub largest_component_size: u64,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub component_id: Id,
    pub size: u64,
    #[serde(default)]
    pub nodes: Vec<MemberNode>,
}

/// A node listed as a member of a community or component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
}

/// Opaque identifier for nodes, communities and components. The backend
/// usually numbers them; it is written back in the shape it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{n}"),
            Id::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Text(s.to_owned())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Text(s)
    }
}

/// Visualization kinds the backend can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VizKind {
    #[default]
    #[serde(rename = "interactive_2d")]
    Interactive2d,
    #[serde(rename = "interactive_3d")]
    Interactive3d,
    Heatmap,
    Wordcloud,
}

impl VizKind {
    pub const ALL: [VizKind; 4] = [
        VizKind::Interactive2d,
        VizKind::Interactive3d,
        VizKind::Heatmap,
        VizKind::Wordcloud,
    ];

    /// Wire identifier (e.g. `interactive_2d`)
    pub fn as_str(&self) -> &'static str {
        match self {
            VizKind::Interactive2d => "interactive_2d",
            VizKind::Interactive3d => "interactive_3d",
            VizKind::Heatmap => "heatmap",
            VizKind::Wordcloud => "wordcloud",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VizKind::Interactive2d => "Interactive 2D graph",
            VizKind::Interactive3d => "Interactive 3D graph",
            VizKind::Heatmap => "Similarity heatmap",
            VizKind::Wordcloud => "Entity word cloud",
        }
    }

    /// Only the two spatial kinds are laid out, so only they take a layout.
    pub fn uses_layout(&self) -> bool {
        matches!(self, VizKind::Interactive2d | VizKind::Interactive3d)
    }
}

/// Node placement algorithms for the spatial visualization kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Semantic,
    Spring,
    Circular,
    KamadaKawai,
    Spectral,
}

impl Layout {
    pub const ALL: [Layout; 5] = [
        Layout::Semantic,
        Layout::Spring,
        Layout::Circular,
        Layout::KamadaKawai,
        Layout::Spectral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Semantic => "semantic",
            Layout::Spring => "spring",
            Layout::Circular => "circular",
            Layout::KamadaKawai => "kamada_kawai",
            Layout::Spectral => "spectral",
        }
    }
}

/// An unrecognized visualization kind or layout name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {what}: {value}")]
pub struct ParseOptionError {
    what: &'static str,
    value: String,
}

impl FromStr for VizKind {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VizKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseOptionError {
                what: "visualization kind",
                value: s.to_string(),
            })
    }
}

impl FromStr for Layout {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseOptionError {
                what: "layout",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for VizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
