use crate::navigation::LevelPayload;
use emath::{Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

pub const PORT_RADIUS: f32 = 5.0;
pub const EDGE_HIT_DISTANCE: f32 = 6.0;
const EDGE_SAMPLES: usize = 32;
const ARROW_LENGTH: f32 = 9.0;
const ARROW_HALF_WIDTH: f32 = 4.5;
/// Dash and gap length for skip connections and hovered edges.
pub const EDGE_DASH: [f32; 2] = [6.0, 4.0];
const DASH_SPEED: f32 = 16.0;

/// Phase into [`EDGE_DASH`] after `time` seconds, chosen so the dashes
/// march from the start of an edge toward its end.
pub fn dash_offset(time: f64) -> f32 {
    let period = EDGE_DASH[0] + EDGE_DASH[1];
    (-(time as f32) * DASH_SPEED).rem_euclid(period)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum NodeStyle {
    Input,
    Output,
    Stem,
    Stage,
    Head,
    Block,
    Conv,
    Norm,
    Activation,
    Pool,
    Add,
    Linear,
    Transform,
}

impl NodeStyle {
    pub fn fill(&self) -> Rgb {
        match self {
            NodeStyle::Input | NodeStyle::Output => Rgb(0xe8, 0xf1, 0xfb),
            NodeStyle::Stem => Rgb(0xfd, 0xeb, 0xd3),
            NodeStyle::Stage => Rgb(0xdc, 0xee, 0xdc),
            NodeStyle::Head => Rgb(0xf6, 0xe1, 0xf4),
            NodeStyle::Block => Rgb(0xe3, 0xe9, 0xf9),
            NodeStyle::Conv => Rgb(0xd6, 0xe6, 0xfa),
            NodeStyle::Norm => Rgb(0xfb, 0xf3, 0xd0),
            NodeStyle::Activation => Rgb(0xfc, 0xe0, 0xdc),
            NodeStyle::Pool => Rgb(0xe2, 0xf4, 0xf2),
            NodeStyle::Add => Rgb(0xff, 0xff, 0xff),
            NodeStyle::Linear => Rgb(0xee, 0xe3, 0xfa),
            NodeStyle::Transform => Rgb(0xde, 0xf0, 0xe6),
        }
    }

    pub fn stroke(&self) -> Rgb {
        match self {
            NodeStyle::Input | NodeStyle::Output => Rgb(0x4a, 0x7b, 0xb7),
            NodeStyle::Stem => Rgb(0xd0, 0x8a, 0x2e),
            NodeStyle::Stage => Rgb(0x3f, 0x8f, 0x4a),
            NodeStyle::Head => Rgb(0xa0, 0x4b, 0x9b),
            NodeStyle::Block => Rgb(0x4e, 0x63, 0xb5),
            NodeStyle::Conv => Rgb(0x2f, 0x6d, 0xb5),
            NodeStyle::Norm => Rgb(0xb8, 0x9b, 0x1f),
            NodeStyle::Activation => Rgb(0xc2, 0x4d, 0x3c),
            NodeStyle::Pool => Rgb(0x2f, 0x8f, 0x86),
            NodeStyle::Add => Rgb(0x33, 0x33, 0x33),
            NodeStyle::Linear => Rgb(0x6d, 0x4b, 0xb0),
            NodeStyle::Transform => Rgb(0x3b, 0x8a, 0x5c),
        }
    }

    pub fn corner_radius(&self) -> f32 {
        match self {
            NodeStyle::Add => 100.0,
            NodeStyle::Input | NodeStyle::Output => 12.0,
            _ => 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitTarget {
    Node(NodeHandle),
    Edge(EdgeHandle),
    Port(PortHandle),
}

/// Arguments for [`Scene::create_node`]. Subtitle, click target and tooltip
/// are optional.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub center: Pos2,
    pub size: Vec2,
    pub label: String,
    pub subtitle: Option<String>,
    pub style: NodeStyle,
    pub on_click: Option<LevelPayload>,
    pub tooltip: Option<String>,
}

impl NodeSpec {
    pub fn new(center: Pos2, size: Vec2, label: impl Into<String>, style: NodeStyle) -> Self {
        Self {
            center,
            size,
            label: label.into(),
            subtitle: None,
            style,
            on_click: None,
            tooltip: None,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn on_click(mut self, target: LevelPayload) -> Self {
        self.on_click = Some(target);
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub rect: Rect,
    pub label: String,
    pub subtitle: Option<String>,
    pub style: NodeStyle,
    pub on_click: Option<LevelPayload>,
    pub tooltip: Option<String>,
}

impl DiagramNode {
    pub fn center(&self) -> Pos2 {
        self.rect.center()
    }

    pub fn left(&self) -> Pos2 {
        self.rect.left_center()
    }

    pub fn right(&self) -> Pos2 {
        self.rect.right_center()
    }

    pub fn top(&self) -> Pos2 {
        self.rect.center_top()
    }

    pub fn bottom(&self) -> Pos2 {
        self.rect.center_bottom()
    }

    pub fn is_clickable(&self) -> bool {
        self.on_click.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Flow,
    Skip,
}

/// Cubic Bezier connector; `points` are start, two controls, end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub kind: EdgeKind,
    pub points: [Pos2; 4],
    pub tooltip: Option<String>,
}

impl DiagramEdge {
    pub fn start(&self) -> Pos2 {
        self.points[0]
    }

    pub fn end(&self) -> Pos2 {
        self.points[3]
    }

    pub fn sample(&self, t: f32) -> Pos2 {
        let [p0, p1, p2, p3] = self.points;
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        pos2(
            a * p0.x + b * p1.x + c * p2.x + d * p3.x,
            a * p0.y + b * p1.y + c * p2.y + d * p3.y,
        )
    }

    /// Control polygon bounds; the curve lies inside its convex hull.
    pub fn bounding_rect(&self) -> Rect {
        Rect::from_points(&self.points)
    }

    /// The curve flattened to evenly spaced samples, endpoints included.
    pub fn polyline(&self) -> Vec<Pos2> {
        (0..=EDGE_SAMPLES)
            .map(|i| self.sample(i as f32 / EDGE_SAMPLES as f32))
            .collect()
    }

    pub fn distance_to(&self, point: Pos2) -> f32 {
        self.polyline()
            .into_iter()
            .map(|x| x.distance(point))
            .fold(f32::INFINITY, f32::min)
    }

    /// Arrowhead triangle at the end of the curve: tip, then the two wings.
    pub fn arrow_head(&self) -> [Pos2; 3] {
        let tip = self.end();
        let mut direction = tip - self.sample(0.95);
        if direction.length_sq() < 1e-6 {
            direction = tip - self.points[2];
        }
        let direction = if direction.length_sq() < 1e-6 {
            Vec2::X
        } else {
            direction.normalized()
        };
        let base = tip - direction * ARROW_LENGTH;
        let normal = vec2(-direction.y, direction.x) * ARROW_HALF_WIDTH;
        [tip, base + normal, base - normal]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramPort {
    pub center: Pos2,
    pub radius: f32,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramLabel {
    pub position: Pos2,
    pub text: String,
}

/// Everything drawn for one render pass. Rebuilt from scratch on every
/// navigation or input change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    nodes: Vec<DiagramNode>,
    edges: Vec<DiagramEdge>,
    ports: Vec<DiagramPort>,
    labels: Vec<DiagramLabel>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.ports.clear();
        self.labels.clear();
    }

    pub fn create_node(&mut self, spec: NodeSpec) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(DiagramNode {
            rect: Rect::from_center_size(spec.center, spec.size),
            label: spec.label,
            subtitle: spec.subtitle,
            style: spec.style,
            on_click: spec.on_click,
            tooltip: spec.tooltip,
        });
        handle
    }

    pub fn create_edge(&mut self, p1: Pos2, p2: Pos2, tooltip: Option<String>) -> EdgeHandle {
        let delta = p2 - p1;
        let points = if delta.x.abs() >= delta.y.abs() {
            let mid_x = (p1.x + p2.x) / 2.0;
            [p1, pos2(mid_x, p1.y), pos2(mid_x, p2.y), p2]
        } else {
            let mid_y = (p1.y + p2.y) / 2.0;
            [p1, pos2(p1.x, mid_y), pos2(p2.x, mid_y), p2]
        };
        self.push_edge(EdgeKind::Flow, points, tooltip)
    }

    /// Arcs above both endpoints so the identity path reads as bypassing the
    /// nodes in between.
    pub fn create_skip_connection(
        &mut self,
        p1: Pos2,
        p2: Pos2,
        tooltip: Option<String>,
    ) -> EdgeHandle {
        let lift = (0.35 * (p2.x - p1.x).abs()).max(60.0);
        let crest = p1.y.min(p2.y) - lift;
        let points = [p1, pos2(p1.x, crest), pos2(p2.x, crest), p2];
        self.push_edge(EdgeKind::Skip, points, tooltip)
    }

    fn push_edge(&mut self, kind: EdgeKind, points: [Pos2; 4], tooltip: Option<String>) -> EdgeHandle {
        let handle = EdgeHandle(self.edges.len());
        self.edges.push(DiagramEdge {
            kind,
            points,
            tooltip,
        });
        handle
    }

    pub fn create_port(&mut self, point: Pos2, tooltip: impl Into<String>) -> PortHandle {
        let handle = PortHandle(self.ports.len());
        self.ports.push(DiagramPort {
            center: point,
            radius: PORT_RADIUS,
            tooltip: tooltip.into(),
        });
        handle
    }

    pub fn create_label(&mut self, position: Pos2, text: impl Into<String>) {
        self.labels.push(DiagramLabel {
            position,
            text: text.into(),
        });
    }

    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DiagramEdge] {
        &self.edges
    }

    pub fn ports(&self) -> &[DiagramPort] {
        &self.ports
    }

    pub fn labels(&self) -> &[DiagramLabel] {
        &self.labels
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&DiagramNode> {
        self.nodes.get(handle.0)
    }

    pub fn edge(&self, handle: EdgeHandle) -> Option<&DiagramEdge> {
        self.edges.get(handle.0)
    }

    pub fn port(&self, handle: PortHandle) -> Option<&DiagramPort> {
        self.ports.get(handle.0)
    }

    pub fn find_node(&self, label: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .position(|x| x.label == label)
            .map(NodeHandle)
    }

    pub fn skip_connections(&self) -> impl Iterator<Item = &DiagramEdge> {
        self.edges.iter().filter(|x| x.kind == EdgeKind::Skip)
    }

    pub fn bounding_rect(&self) -> Rect {
        let mut rect = Rect::NOTHING;
        for node in &self.nodes {
            rect = rect.union(node.rect);
        }
        for edge in &self.edges {
            rect = rect.union(edge.bounding_rect());
        }
        for port in &self.ports {
            rect = rect.union(Rect::from_center_size(port.center, Vec2::splat(port.radius * 2.0)));
        }
        for label in &self.labels {
            // rough glyph width, enough for auto-fit
            let width = label.text.chars().count() as f32 * 7.0;
            rect = rect.union(Rect::from_center_size(label.position, vec2(width, 14.0)));
        }
        rect
    }

    /// Topmost target under `point` (world coordinates). Ports sit on node
    /// borders, so they win over nodes; edges are checked last.
    pub fn hit_test(&self, point: Pos2) -> Option<HitTarget> {
        if let Some(i) = self
            .ports
            .iter()
            .rposition(|x| x.center.distance(point) <= x.radius + 1.0)
        {
            return Some(HitTarget::Port(PortHandle(i)));
        }
        if let Some(i) = self.nodes.iter().rposition(|x| x.rect.contains(point)) {
            return Some(HitTarget::Node(NodeHandle(i)));
        }
        self.edges
            .iter()
            .enumerate()
            .map(|(i, x)| (i, x.distance_to(point)))
            .filter(|(_, d)| *d <= EDGE_HIT_DISTANCE)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| HitTarget::Edge(EdgeHandle(i)))
    }

    pub fn tooltip(&self, target: HitTarget) -> Option<&str> {
        match target {
            HitTarget::Node(handle) => self.node(handle).and_then(|x| x.tooltip.as_deref()),
            HitTarget::Edge(handle) => self.edge(handle).and_then(|x| x.tooltip.as_deref()),
            HitTarget::Port(handle) => self.port(handle).map(|x| x.tooltip.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bezier_endpoints() {
        let mut scene = Scene::new();
        let handle = scene.create_edge(pos2(0.0, 0.0), pos2(100.0, 40.0), None);
        let edge = scene.edge(handle).unwrap();
        assert_eq!(edge.sample(0.0), pos2(0.0, 0.0));
        assert!((edge.sample(1.0) - pos2(100.0, 40.0)).length() < 1e-4);
        assert_eq!(edge.kind, EdgeKind::Flow);
    }

    #[test]
    fn test_skip_connection_arcs_above() {
        let mut scene = Scene::new();
        let handle = scene.create_skip_connection(pos2(0.0, 100.0), pos2(300.0, 100.0), None);
        let edge = scene.edge(handle).unwrap();
        assert_eq!(edge.kind, EdgeKind::Skip);
        assert!(edge.sample(0.5).y < 100.0);
    }

    #[test]
    fn test_arrow_head_tip_is_endpoint() {
        let mut scene = Scene::new();
        let handle = scene.create_edge(pos2(0.0, 0.0), pos2(50.0, 0.0), None);
        let [tip, a, b] = scene.edge(handle).unwrap().arrow_head();
        assert_eq!(tip, pos2(50.0, 0.0));
        assert!(a.x < 50.0 && b.x < 50.0);
    }

    #[test]
    fn test_polyline_follows_curve() {
        let mut scene = Scene::new();
        let handle = scene.create_skip_connection(pos2(0.0, 100.0), pos2(300.0, 100.0), None);
        let edge = scene.edge(handle).unwrap();
        let points = edge.polyline();
        assert_eq!(points.len(), EDGE_SAMPLES + 1);
        assert_eq!(points[0], edge.start());
        assert!((*points.last().unwrap() - edge.end()).length() < 1e-3);
        assert!(points.iter().all(|x| edge.distance_to(*x) < 1e-3));
    }

    #[test]
    fn test_dash_offset_marches_forward() {
        let period = EDGE_DASH[0] + EDGE_DASH[1];
        assert_eq!(dash_offset(0.0), 0.0);
        for step in 0..100 {
            let offset = dash_offset(step as f64 * 0.37);
            assert!((0.0..period).contains(&offset), "{offset}");
        }
        // a larger phase pulls the pattern back toward the start
        let early = dash_offset(0.1);
        let later = dash_offset(0.2);
        assert!((early - later - 0.1 * DASH_SPEED).abs() < 1e-3);
    }
}
