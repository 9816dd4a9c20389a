//! Mind map
//!
//! Requirements are drawn as an `egui_graphs` view over the petgraph built
//! from [`GraphModel`], laid out by its Fruchterman-Reingold simulation with center gravity.
//! Node fill follows the requirement type and edge color the link type.

use std::collections::HashMap;
use std::f32::consts::TAU;

use egui::epaint::{CircleShape, TextShape};
use egui::{Color32, FontFamily, FontId, Pos2, Shape, Stroke, Vec2};
use egui_graphs::{
    set_layout_state, DisplayEdge, DisplayNode, DrawContext, EdgeProps,
    FruchtermanReingoldWithCenterGravity, FruchtermanReingoldWithCenterGravityState, Graph,
    GraphView, LayoutForceDirected, Node, NodeProps, SettingsInteraction, SettingsNavigation,
    SettingsStyle,
};
use petgraph::graph::DefaultIx;
use petgraph::Directed;

use reqtrace_core::{Action, GraphEdge, GraphModel, GraphNode, RequirementId};

use crate::app::hex_color;

const NODE_RADIUS: f32 = 24.0;

/// Distance between neighbours on the starting circle
const SEED_SPACING: f32 = 120.0;

const ARROW_SIZE: f32 = 9.0;

/// How close a pointer must be to an edge to hit it
const EDGE_HIT_WIDTH: f32 = 5.0;

type RequirementGraph = Graph<GraphNode, GraphEdge, Directed, DefaultIx, RequirementNode, LinkEdge>;

#[derive(Clone, Debug)]
pub struct RequirementNode {
    id: RequirementId,
    pos: Pos2,
    label: String,
    fill: Color32,
    hovered: bool,
    dragged: bool,
}

impl From<NodeProps<GraphNode>> for RequirementNode {
    fn from(props: NodeProps<GraphNode>) -> Self {
        Self {
            id: props.payload.id,
            pos: props.location(),
            label: props.payload.label.clone(),
            fill: hex_color(&props.payload.color),
            hovered: props.hovered,
            dragged: props.dragged,
        }
    }
}

impl DisplayNode<GraphNode, GraphEdge, Directed, DefaultIx> for RequirementNode {
    fn is_inside(&self, pos: Pos2) -> bool {
        (pos - self.pos).length() <= NODE_RADIUS
    }

    fn closest_boundary_point(&self, dir: Vec2) -> Pos2 {
        self.pos + dir.normalized() * NODE_RADIUS
    }

    fn shapes(&mut self, ctx: &DrawContext) -> Vec<Shape> {
        let center = ctx.meta.canvas_to_screen_pos(self.pos);
        let radius = ctx.meta.canvas_to_screen_size(NODE_RADIUS);
        let width = if self.hovered || self.dragged { 3.0 } else { 1.0 };
        let text_color = ctx.ctx.style().visuals.text_color();

        let galley = ctx.ctx.fonts_mut(|f| {
            f.layout_no_wrap(
                self.label.clone(),
                FontId::new(11.0, FontFamily::Proportional),
                text_color,
            )
        });
        // Label sits under the circle
        let text_pos = Pos2::new(center.x - galley.size().x / 2.0, center.y + radius + 2.0);

        vec![
            CircleShape {
                center,
                radius,
                fill: self.fill,
                stroke: Stroke::new(width, Color32::WHITE),
            }
            .into(),
            TextShape::new(text_pos, galley, text_color).into(),
        ]
    }

    fn update(&mut self, state: &NodeProps<GraphNode>) {
        self.pos = state.location();
        self.hovered = state.hovered;
        self.dragged = state.dragged;
    }
}

#[derive(Clone, Debug)]
pub struct LinkEdge {
    label: String,
    color: Color32,
}

impl From<EdgeProps<GraphEdge>> for LinkEdge {
    fn from(props: EdgeProps<GraphEdge>) -> Self {
        Self {
            label: props.payload.label.clone(),
            color: hex_color(&props.payload.color),
        }
    }
}

impl DisplayEdge<GraphNode, GraphEdge, Directed, DefaultIx, RequirementNode> for LinkEdge {
    fn is_inside(
        &self,
        start: &Node<GraphNode, GraphEdge, Directed, DefaultIx, RequirementNode>,
        end: &Node<GraphNode, GraphEdge, Directed, DefaultIx, RequirementNode>,
        pos: Pos2,
    ) -> bool {
        distance_to_segment(pos, start.location(), end.location()) <= EDGE_HIT_WIDTH
    }

    fn shapes(
        &mut self,
        start: &Node<GraphNode, GraphEdge, Directed, DefaultIx, RequirementNode>,
        end: &Node<GraphNode, GraphEdge, Directed, DefaultIx, RequirementNode>,
        ctx: &DrawContext,
    ) -> Vec<Shape> {
        let span = end.location() - start.location();
        if span.length() <= 2.0 * NODE_RADIUS {
            return Vec::new();
        }

        let dir = span.normalized();
        let from = ctx
            .meta
            .canvas_to_screen_pos(start.display().closest_boundary_point(dir));
        let to = ctx
            .meta
            .canvas_to_screen_pos(end.display().closest_boundary_point(-dir));

        let tip = (to - from).normalized();
        let side = Vec2::new(-tip.y, tip.x) * ARROW_SIZE * 0.5;
        let base = to - tip * ARROW_SIZE;

        let galley = ctx.ctx.fonts_mut(|f| {
            f.layout_no_wrap(
                self.label.clone(),
                FontId::new(10.0, FontFamily::Proportional),
                self.color,
            )
        });
        let middle = from + (to - from) * 0.5;
        let label_pos = Pos2::new(middle.x - galley.size().x / 2.0, middle.y - galley.size().y);

        vec![
            Shape::line_segment([from, base], Stroke::new(1.5, self.color)),
            Shape::convex_polygon(vec![to, base + side, base - side], self.color, Stroke::NONE),
            TextShape::new(label_pos, galley, self.color).into(),
        ]
    }

    fn update(&mut self, state: &EdgeProps<GraphEdge>) {
        self.label = state.payload.label.clone();
        self.color = hex_color(&state.payload.color);
    }
}

/// One graph instance; the window drops it and builds a new one on every
/// mind-map render
pub struct MindMap {
    graph: RequirementGraph,
    tooltips: HashMap<RequirementId, String>,
    /// The layout simulation restarts for a new graph
    fresh_layout: bool,
}

impl MindMap {
    pub fn new(model: &GraphModel) -> Self {
        let mut graph = RequirementGraph::from(&model.to_stable_graph());

        let indices: Vec<_> = graph.g().node_indices().collect();
        let count = indices.len();
        for (i, idx) in indices.into_iter().enumerate() {
            if let Some(node) = graph.node_mut(idx) {
                node.set_location(seed_position(i, count));
            }
        }

        let tooltips = model
            .nodes
            .iter()
            .map(|n| (n.id, n.tooltip.clone()))
            .collect();

        Self {
            graph,
            tooltips,
            fresh_layout: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.graph.g().node_count() == 0
    }

    pub fn node_count(&self) -> usize {
        self.graph.g().node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.g().edge_count()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        if self.fresh_layout {
            set_layout_state::<FruchtermanReingoldWithCenterGravityState>(
                ui,
                FruchtermanReingoldWithCenterGravityState::default(),
                None,
            );
            self.fresh_layout = false;
        }

        let interaction = SettingsInteraction::new()
            .with_dragging_enabled(true)
            .with_hover_enabled(true)
            .with_node_selection_enabled(true);
        let navigation = SettingsNavigation::new().with_zoom_and_pan_enabled(true);
        let style = SettingsStyle::new().with_labels_always(true);

        let response = ui.add(
            &mut GraphView::<
                _,
                _,
                _,
                _,
                RequirementNode,
                LinkEdge,
                FruchtermanReingoldWithCenterGravityState,
                LayoutForceDirected<FruchtermanReingoldWithCenterGravity>,
            >::new(&mut self.graph)
            .with_interactions(&interaction)
            .with_navigations(&navigation)
            .with_styles(&style),
        );

        if let Some(id) = self.take_clicked() {
            actions.push(Action::OpenDetail(id));
        }
        if let Some(tooltip) = self.hovered().and_then(|id| self.tooltips.get(&id)) {
            response.on_hover_text(tooltip.as_str());
        }
    }

    /// Requirement whose node was just clicked. The selection is cleared so
    /// a second click on the same node registers again.
    fn take_clicked(&mut self) -> Option<RequirementId> {
        let idx = self
            .graph
            .g()
            .node_indices()
            .find(|idx| self.graph.node(*idx).is_some_and(|n| n.selected()))?;
        let node = self.graph.node_mut(idx)?;
        node.set_selected(false);
        Some(node.display().id)
    }

    fn hovered(&self) -> Option<RequirementId> {
        self.graph
            .g()
            .node_indices()
            .filter_map(|idx| self.graph.node(idx))
            .find(|n| n.hovered())
            .map(|n| n.display().id)
    }
}

/// Starting point of node `index` of `count`, evenly spaced on a circle
fn seed_position(index: usize, count: usize) -> Pos2 {
    if count <= 1 {
        return Pos2::ZERO;
    }
    let radius = (SEED_SPACING * count as f32 / TAU).max(SEED_SPACING);
    let angle = TAU * index as f32 / count as f32;
    Pos2::new(radius * angle.cos(), radius * angle.sin())
}

fn distance_to_segment(pos: Pos2, a: Pos2, b: Pos2) -> f32 {
    let line = b - a;
    let length_sq = line.length_sq();
    if length_sq <= f32::EPSILON {
        return (pos - a).length();
    }
    let t = ((pos - a).dot(line) / length_sq).clamp(0.0, 1.0);
    (pos - (a + line * t)).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqtrace_core::{LinkType, Requirement};

    fn model() -> GraphModel {
        GraphModel::from_requirements(&[
            Requirement::new(1, "Login").with_link(2, LinkType::DependsOn),
            Requirement::new(2, "SSO").with_link(3, LinkType::Implements),
            Requirement::new(3, "Audit log"),
        ])
    }

    #[test]
    fn test_one_node_per_requirement_one_edge_per_link() {
        let map = MindMap::new(&model());

        assert_eq!(map.node_count(), 3);
        assert_eq!(map.edge_count(), 2);
        assert!(!map.is_empty());
        assert!(MindMap::new(&GraphModel::default()).is_empty());
    }

    #[test]
    fn test_nodes_keep_type_color_and_label() {
        let model = model();
        let map = MindMap::new(&model);

        for idx in map.graph.g().node_indices() {
            let display = map.graph.node(idx).unwrap().display();
            let source = model.node(display.id).unwrap();
            assert_eq!(display.fill, hex_color(&source.color));
            assert_eq!(display.label, source.label);
        }
        assert_eq!(
            map.tooltips.get(&3).map(String::as_str),
            Some("Audit log\nType: functional\nStatus: draft")
        );
    }

    #[test]
    fn test_edges_keep_link_color() {
        let map = MindMap::new(&model());

        let mut labels: Vec<(String, Color32)> = map
            .graph
            .g()
            .edge_indices()
            .filter_map(|idx| map.graph.edge(idx))
            .map(|e| (e.display().label.clone(), e.display().color))
            .collect();
        labels.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(
            labels,
            vec![
                ("depends-on".to_string(), hex_color("#f39c12")),
                ("implements".to_string(), hex_color("#27ae60")),
            ]
        );
    }

    #[test]
    fn test_seed_positions_spread_on_a_circle() {
        assert_eq!(seed_position(0, 1), Pos2::ZERO);

        let points: Vec<Pos2> = (0..4).map(|i| seed_position(i, 4)).collect();
        for (i, p) in points.iter().enumerate() {
            assert!((p.to_vec2().length() - SEED_SPACING).abs() < 0.01);
            for q in &points[i + 1..] {
                assert!((*p - *q).length() > 2.0 * NODE_RADIUS);
            }
        }
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);

        assert_eq!(distance_to_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Pos2::new(13.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Pos2::new(0.0, 2.0), a, a), 2.0);
    }
}
