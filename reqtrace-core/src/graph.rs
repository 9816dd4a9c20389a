//! Mind-map graph builder
//!
//! Turns the requirement list into nodes and directed edges, with the colors
//! and labels used by every graph front-end (GUI, Graphviz, JSON).

use log::debug;
use petgraph::stable_graph::StableGraph;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{LinkType, Requirement, RequirementId};
use crate::render::{edge_color, node_color, truncate_label};

/// Maximum title length shown inside a node
pub const LABEL_LIMIT: usize = 30;

pub const EMPTY_MIND_MAP_MESSAGE: &str = "No requirements to display in the mind map.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: RequirementId,
    pub label: String,
    #[serde(rename = "title")]
    pub tooltip: String,
    pub color: String,
}

impl GraphNode {
    pub fn from_requirement(req: &Requirement) -> Self {
        Self {
            id: req.id,
            label: format!("#{}\n{}", req.id, truncate_label(&req.title, LABEL_LIMIT)),
            tooltip: format!(
                "{}\nType: {}\nStatus: {}",
                req.title, req.requirement_type, req.status
            ),
            color: node_color(&req.requirement_type).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub from: RequirementId,
    pub to: RequirementId,
    pub label: String,
    pub color: String,
    #[serde(skip)]
    pub link_type: LinkType,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GraphModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphModel {
    /// One node per requirement, one edge per outgoing link
    pub fn from_requirements(requirements: &[Requirement]) -> Self {
        let nodes = requirements.iter().map(GraphNode::from_requirement).collect();

        let edges = requirements
            .iter()
            .flat_map(|req| {
                req.outgoing_links.iter().map(move |link| GraphEdge {
                    from: req.id,
                    to: link.target_requirement_id,
                    label: link.link_type.keyword().to_string(),
                    color: edge_color(&link.link_type).to_string(),
                    link_type: link.link_type.clone(),
                })
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: RequirementId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Directed petgraph with one node per requirement.
    ///
    /// Links whose target is not in the list have no node to attach to and
    /// are left out.
    pub fn to_stable_graph(&self) -> StableGraph<GraphNode, GraphEdge> {
        let mut graph = StableGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut indices = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            indices.insert(node.id, graph.add_node(node.clone()));
        }

        for edge in &self.edges {
            match (indices.get(&edge.from), indices.get(&edge.to)) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, edge.clone());
                }
                _ => debug!(
                    "Leaving out link #{} -> #{}: requirement not loaded",
                    edge.from, edge.to
                ),
            }
        }
        graph
    }

    /// Graphviz rendering
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph requirements {\n");
        out.push_str("    node [shape=box, style=\"rounded,filled\", fontcolor=white];\n");
        for node in &self.nodes {
            out.push_str(&format!(
                "    {} [label={}, tooltip={}, fillcolor=\"{}\"];\n",
                node.id,
                dot_string(&node.label),
                dot_string(&node.tooltip),
                node.color
            ));
        }
        for edge in &self.edges {
            out.push_str(&format!(
                "    {} -> {} [label={}, color=\"{}\"];\n",
                edge.from,
                edge.to,
                dot_string(&edge.label),
                edge.color
            ));
        }
        out.push_str("}\n");
        out
    }

    /// `{"nodes": [...], "edges": [...]}` document
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Quote a string for the DOT language
fn dot_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RequirementStatus, RequirementType};
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Requirement> {
        let mut login = Requirement::new(1, "Users can log in with a corporate account")
            .with_link(2, LinkType::DependsOn)
            .with_link(3, LinkType::Implements);
        login.requirement_type = RequirementType::User;
        login.status = RequirementStatus::Approved;
        vec![
            login,
            Requirement::new(2, "SSO").with_link(1, LinkType::Contradicts),
            Requirement::new(3, "Audit log"),
        ]
    }

    #[test]
    fn test_one_node_per_requirement_one_edge_per_link() {
        let reqs = sample();
        let graph = GraphModel::from_requirements(&reqs);

        assert_eq!(graph.nodes.len(), reqs.len());
        let link_count: usize = reqs.iter().map(|r| r.outgoing_links.len()).sum();
        assert_eq!(graph.edges.len(), link_count);

        let pairs: Vec<(i64, i64)> = graph.edges.iter().map(|e| (e.from, e.to)).collect();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 1)]);
    }

    #[test]
    fn test_node_label_tooltip_color() {
        let graph = GraphModel::from_requirements(&sample());
        let node = graph.node(1).unwrap();

        assert_eq!(node.label, "#1\nUsers can log in with a corpor...");
        assert_eq!(
            node.tooltip,
            "Users can log in with a corporate account\nType: user\nStatus: approved"
        );
        assert_eq!(node.color, "#9b59b6");
        assert_eq!(graph.node(3).unwrap().label, "#3\nAudit log");
    }

    #[test]
    fn test_edge_colors() {
        let graph = GraphModel::from_requirements(&sample());
        assert_eq!(graph.edges[0].color, "#f39c12");
        assert_eq!(graph.edges[0].label, "depends-on");
        assert_eq!(graph.edges[2].color, "#e74c3c");
    }

    #[test]
    fn test_dot_output() {
        let graph = GraphModel::from_requirements(&[
            Requirement::new(1, "Say \"hi\"").with_link(2, LinkType::Implements),
            Requirement::new(2, "B"),
        ]);
        let dot = graph.to_dot();

        assert!(dot.starts_with("digraph requirements {"));
        assert!(dot.contains("1 [label=\"#1\\nSay \\\"hi\\\"\""));
        assert!(dot.contains("1 -> 2 [label=\"implements\", color=\"#27ae60\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_json_output() {
        let graph = GraphModel::from_requirements(&sample());
        let value: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();

        assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(value["edges"][2]["from"], 2);
        assert_eq!(value["edges"][2]["to"], 1);
        assert!(value["nodes"][0]["title"].as_str().unwrap().contains("Type: user"));
        assert!(value["edges"][0].get("link_type").is_none());
    }

    #[test]
    fn test_stable_graph_follows_links() {
        let graph = GraphModel::from_requirements(&sample()).to_stable_graph();

        assert_eq!(graph.node_count(), 3);
        let mut pairs: Vec<(i64, i64, &str)> = graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = graph.edge_endpoints(e)?;
                Some((graph[from].id, graph[to].id, graph[e].label.as_str()))
            })
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![(1, 2, "depends-on"), (1, 3, "implements"), (2, 1, "contradicts")]
        );
    }

    #[test]
    fn test_stable_graph_skips_links_to_unloaded_requirements() {
        let model = GraphModel::from_requirements(&[
            Requirement::new(1, "A").with_link(2, LinkType::Implements),
            Requirement::new(2, "B").with_link(42, LinkType::DependsOn),
        ]);
        let graph = model.to_stable_graph();

        assert_eq!(model.edges.len(), 2);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_empty_graph() {
        let graph = GraphModel::from_requirements(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.to_stable_graph().node_count(), 0);
        assert_eq!(graph.to_dot(), "digraph requirements {\n    node [shape=box, style=\"rounded,filled\", fontcolor=white];\n}\n");
    }
}
