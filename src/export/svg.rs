use crate::camera::{Camera, SurfaceSize};
use crate::scene::{DiagramEdge, DiagramNode, EDGE_DASH, EdgeKind, Scene};
use maud::{Markup, html};

const FLOW_COLOR: &str = "#5f6b7a";
const SKIP_COLOR: &str = "#d9822b";
const PORT_COLOR: &str = "#2b6cb0";
const TEXT_COLOR: &str = "#1a202c";
const FONT: &str = "Helvetica, Arial, sans-serif";

fn px(value: f32) -> String {
    format!("{value:.1}")
}

/// Renders `scene` as a standalone SVG document the size of `surface`, with
/// `camera` applied as a single group transform.
pub fn render_svg(scene: &Scene, camera: &Camera, surface: SurfaceSize) -> String {
    svg_markup(scene, camera, surface).into_string()
}

/// Same document as [`render_svg`], for embedding into a larger page.
pub fn svg_markup(scene: &Scene, camera: &Camera, surface: SurfaceSize) -> Markup {
    let (width, height) = (surface.width.to_string(), surface.height.to_string());
    let view_box = format!("0 0 {width} {height}");
    html! {
        svg xmlns="http://www.w3.org/2000/svg" width=(width) height=(height) viewBox=(view_box) {
            defs {
                @for (id, color) in [("arrow-flow", FLOW_COLOR), ("arrow-skip", SKIP_COLOR)] {
                    marker id=(id) viewBox="0 0 10 10" refX="9" refY="5" markerWidth="7" markerHeight="7" orient="auto-start-reverse" {
                        path d="M 0 0 L 10 5 L 0 10 z" fill=(color) {}
                    }
                }
            }
            g class="camera" transform=(camera.svg_transform()) {
                @for edge in scene.edges() {
                    (edge_markup(edge))
                }
                @for node in scene.nodes() {
                    (node_markup(node))
                }
                @for port in scene.ports() {
                    circle class="port" cx=(px(port.center.x)) cy=(px(port.center.y)) r=(px(port.radius))
                        fill=(PORT_COLOR) stroke="#ffffff" stroke-width="1.5" {
                        title { (port.tooltip) }
                    }
                }
                @for label in scene.labels() {
                    text class="label" x=(px(label.position.x)) y=(px(label.position.y)) text-anchor="middle"
                        font-family=(FONT) font-size="12" font-style="italic" fill=(TEXT_COLOR) {
                        (label.text)
                    }
                }
            }
        }
    }
}

fn edge_markup(edge: &DiagramEdge) -> Markup {
    let [p0, p1, p2, p3] = edge.points;
    let (class, color, marker, dash) = match edge.kind {
        EdgeKind::Flow => ("edge", FLOW_COLOR, "url(#arrow-flow)", None),
        EdgeKind::Skip => ("edge skip", SKIP_COLOR, "url(#arrow-skip)", Some(EDGE_DASH)),
    };
    let dash = dash.map(|[dash, gap]| format!("{dash} {gap}"));
    let d = format!(
        "M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
        p0.x, p0.y, p1.x, p1.y, p2.x, p2.y, p3.x, p3.y
    );
    html! {
        path class=(class) d=(d) fill="none" stroke=(color) stroke-width="2" stroke-dasharray=[dash] marker-end=(marker) {
            @if let Some(tooltip) = &edge.tooltip {
                title { (tooltip) }
            }
        }
    }
}

fn node_markup(node: &DiagramNode) -> Markup {
    let rect = node.rect;
    let center = rect.center();
    let clickable = node.is_clickable();
    let class = if clickable { "node clickable" } else { "node" };
    let target = node.on_click.as_ref().map(|x| x.level().to_string());
    let cursor = target.as_ref().map(|_| "pointer");
    html! {
        g class=(class) data-target=[target] cursor=[cursor] {
            @if let Some(tooltip) = &node.tooltip {
                title { (tooltip) }
            }
            rect x=(px(rect.min.x)) y=(px(rect.min.y)) width=(px(rect.width())) height=(px(rect.height()))
                rx=(px(node.style.corner_radius())) fill=(node.style.fill().to_hex())
                stroke=(node.style.stroke().to_hex()) stroke-width=(if clickable { "2.5" } else { "1.5" }) {}
            @match &node.subtitle {
                Some(subtitle) => {
                    text x=(px(center.x)) y=(px(center.y - 3.0)) text-anchor="middle" font-family=(FONT)
                        font-size="13" font-weight="bold" fill=(TEXT_COLOR) {
                        (node.label)
                    }
                    text x=(px(center.x)) y=(px(center.y + 12.0)) text-anchor="middle" font-family=(FONT)
                        font-size="10" fill=(TEXT_COLOR) {
                        (subtitle)
                    }
                }
                None => {
                    text x=(px(center.x)) y=(px(center.y)) text-anchor="middle" dominant-baseline="middle"
                        font-family=(FONT) font-size="13" font-weight="bold" fill=(TEXT_COLOR) {
                        (node.label)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeSpec, NodeStyle};
    use emath::{pos2, vec2};

    #[test]
    fn test_svg_contains_primitives() {
        let mut scene = Scene::new();
        scene.create_node(
            NodeSpec::new(pos2(50.0, 50.0), vec2(60.0, 30.0), "A & B", NodeStyle::Conv)
                .tooltip("<weights>"),
        );
        scene.create_edge(pos2(0.0, 0.0), pos2(100.0, 0.0), Some("[1, 2]".into()));
        scene.create_skip_connection(pos2(0.0, 0.0), pos2(100.0, 0.0), None);
        scene.create_port(pos2(0.0, 0.0), "[1, 2]");

        let svg = render_svg(&scene, &Camera::default(), SurfaceSize::new(200.0, 100.0));
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\""));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 1);
        assert_eq!(svg.matches("</rect>").count(), 1);
        assert_eq!(svg.matches("<path class=\"edge").count(), 2);
        assert_eq!(svg.matches("stroke-dasharray").count(), 1);
        assert_eq!(svg.matches("<circle").count(), 1);
        // non-clickable nodes carry no target attributes
        assert!(!svg.contains("data-target"));
        assert!(svg.contains("A &amp; B"));
        assert!(svg.contains("&lt;weights&gt;"));
    }
}
