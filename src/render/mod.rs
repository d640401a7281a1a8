//! Render engine
//!
//! Two pure projections turn backend payloads into structured views:
//! [`project_graph`] for graph documents and [`project_analytics`] for
//! analytics reports. Both are deterministic: the same payload always gives
//! the same view. [`ViewRenderer`] turns views into HTML fragments.

mod analytics_view;
mod graph_view;
mod html;

pub use analytics_view::{
    AnalyticsView, BasicStatsView, CentralityView, GroupView, GroupsView, RankedNode,
    RelationRow, Section, TypeDistributionView, TypeRow, project_analytics,
};
pub use graph_view::{EdgeRow, GraphInfoView, MetadataBlock, NodeRow, project_graph};
pub use html::{RenderError, RenderResult, ViewRenderer};

/// Numbers as the backend would print them: `7` not `7.0`, `0.25` as is.
pub(crate) fn format_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_drop_the_fraction() {
        assert_eq!(format_number(7.0), "7");
        assert_eq!(format_number(66.67), "66.67");
        assert_eq!(format_number(0.1234), "0.1234");
    }
}
