//! Analytics report → analytics view

use serde::Serialize;

use super::format_number;
use crate::model::{AnalyticsReport, BasicStats, MemberNode, TypeDistribution};

/// Sections of the analytics view, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    BasicStats,
    Centrality,
    TypeDistribution,
    Community,
    Connectivity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsView {
    pub basic_stats: Option<BasicStatsView>,
    pub centrality: Option<Vec<CentralityView>>,
    pub type_distribution: Option<TypeDistributionView>,
    pub community: Option<GroupsView>,
    pub connectivity: Option<GroupsView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStatsView {
    pub node_count: u64,
    pub edge_count: u64,
    /// Three decimals
    pub density: String,
    /// Two decimals
    pub average_degree: String,
    pub is_connected: bool,
    pub component_count: u64,
    pub diameter: Option<String>,
    pub average_shortest_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralityView {
    pub metric: String,
    pub description: String,
    pub ranking: Vec<RankedNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedNode {
    /// Position + 1; scores are never consulted
    pub rank: usize,
    pub name: String,
    pub score: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDistributionView {
    pub node_types: Vec<TypeRow>,
    pub relation_types: Vec<RelationRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeRow {
    pub type_name: String,
    pub count: u64,
    /// As produced, with a `%` suffix
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationRow {
    pub relation: String,
    pub count: u64,
}

/// Community or connected-component membership.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupsView {
    pub description: Option<String>,
    pub count: u64,
    pub largest: Option<u64>,
    pub groups: Vec<GroupView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    pub id: String,
    pub size: u64,
    pub members: Vec<String>,
}

impl AnalyticsView {
    /// Sections present in this view, in display order.
    pub fn sections(&self) -> Vec<Section> {
        let mut sections = Vec::new();
        if self.basic_stats.is_some() {
            sections.push(Section::BasicStats);
        }
        if self.centrality.is_some() {
            sections.push(Section::Centrality);
        }
        if self.type_distribution.is_some() {
            sections.push(Section::TypeDistribution);
        }
        if self.community.is_some() {
            sections.push(Section::Community);
        }
        if self.connectivity.is_some() {
            sections.push(Section::Connectivity);
        }
        sections
    }
}

/// Project an analytics report. Each section is present iff its source
/// section is; community and connectivity are also dropped when they
/// report no groups.
pub fn project_analytics(report: &AnalyticsReport) -> AnalyticsView {
    AnalyticsView {
        basic_stats: report.basic_stats.as_ref().map(basic_stats),
        centrality: report.centrality.as_ref().map(|metrics| {
            metrics
                .iter()
                .map(|(key, metric)| CentralityView {
                    metric: key.clone(),
                    description: metric.description.clone(),
                    ranking: metric
                        .top_nodes
                        .iter()
                        .enumerate()
                        .map(|(i, n)| RankedNode {
                            rank: i + 1,
                            name: n.name.clone(),
                            score: format_number(n.score),
                        })
                        .collect(),
                })
                .collect()
        }),
        type_distribution: report.type_distribution.as_ref().map(type_distribution),
        community: report
            .community
            .as_ref()
            .filter(|c| c.num_communities > 0)
            .map(|c| GroupsView {
                description: Some(c.description.clone()),
                count: c.num_communities,
                largest: None,
                groups: c
                    .communities
                    .iter()
                    .map(|g| GroupView {
                        id: g.community_id.to_string(),
                        size: g.size,
                        members: member_names(&g.nodes),
                    })
                    .collect(),
            }),
        connectivity: report
            .connectivity
            .as_ref()
            .filter(|c| c.num_components > 0)
            .map(|c| GroupsView {
                description: None,
                count: c.num_components,
                largest: Some(c.largest_component_size),
                groups: c
                    .components
                    .iter()
                    .map(|g| GroupView {
                        id: g.component_id.to_string(),
                        size: g.size,
                        members: member_names(&g.nodes),
                    })
                    .collect(),
            }),
    }
}

fn basic_stats(stats: &BasicStats) -> BasicStatsView {
    BasicStatsView {
        node_count: stats.node_count,
        edge_count: stats.edge_count,
        density: format!("{:.3}", stats.density),
        average_degree: format!("{:.2}", stats.average_degree),
        is_connected: stats.is_connected,
        component_count: stats.num_components,
        diameter: stats.diameter.map(format_number),
        average_shortest_path: stats.average_shortest_path.map(|v| format!("{v:.2}")),
    }
}

fn type_distribution(dist: &TypeDistribution) -> TypeDistributionView {
    TypeDistributionView {
        node_types: dist
            .node_types
            .iter()
            .map(|t| TypeRow {
                type_name: t.type_name.clone(),
                count: t.count,
                percentage: format!("{}%", format_number(t.percentage)),
            })
            .collect(),
        relation_types: dist
            .relation_types
            .iter()
            .map(|r| RelationRow {
                relation: r.relation.clone(),
                count: r.count,
            })
            .collect(),
    }
}

fn member_names(nodes: &[MemberNode]) -> Vec<String> {
    nodes.iter().map(|n| n.name.clone()).collect()
}
