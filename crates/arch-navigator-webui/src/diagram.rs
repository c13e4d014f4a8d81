use arch_navigator::ArchitectureNavigator;
use arch_navigator::camera::SurfaceSize;
use arch_navigator::scene::{EDGE_DASH, EdgeKind, HitTarget, NodeHandle, Rgb, dash_offset};
use egui::epaint::CubicBezierShape;
use egui::{Align2, Color32, CornerRadius, FontId, Pos2, Sense, Shape, Stroke, StrokeKind, Ui, Vec2};

const SKIP_COLOR: Color32 = Color32::from_rgb(0xd9, 0x82, 0x2b);
const PORT_COLOR: Color32 = Color32::from_rgb(0x2b, 0x6c, 0xb0);
const NODE_TEXT_COLOR: Color32 = Color32::from_rgb(0x1a, 0x20, 0x2c);
const ZOOM_SPEED: f32 = 0.002;

fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Draws the navigator's scene into the remaining space of `ui` and feeds
/// drag, scroll and click input back into it.
pub(crate) fn show(ui: &mut Ui, navigator: &mut ArchitectureNavigator) {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
    if let Err(err) = navigator.resize(SurfaceSize::new(rect.width(), rect.height())) {
        log::debug!("Skipping diagram paint: {err}");
        return;
    }
    let origin = rect.min.to_vec2();

    if response.dragged() {
        navigator.pan(response.drag_delta());
    }
    if let Some(pointer) = response.hover_pos() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            navigator.zoom_about(pointer - origin, (scroll * ZOOM_SPEED).exp());
        }
    }

    let hovered = response.hover_pos().and_then(|x| navigator.hover(x - origin));
    paint(ui, navigator, origin, rect, hovered);

    if response.clicked() {
        if let Some(pointer) = response.interact_pointer_pos() {
            if let Some(change) = navigator.click_screen(pointer - origin) {
                log::info!("{change:?} -> {}", navigator.breadcrumb());
                ui.ctx().request_repaint();
            }
        }
    } else if let Some(tooltip) = hovered.and_then(|x| navigator.scene().tooltip(x)) {
        let tooltip = tooltip.to_string();
        response.on_hover_text_at_pointer(tooltip);
    }
}

fn paint(
    ui: &Ui,
    navigator: &ArchitectureNavigator,
    origin: Vec2,
    rect: egui::Rect,
    hovered: Option<HitTarget>,
) {
    let painter = ui.painter_at(rect);
    let camera = *navigator.camera();
    let scene = navigator.scene();
    let to_screen = |p: Pos2| camera.to_screen(p) + origin;
    let zoom = camera.scale;
    let edge_stroke = ui.visuals().widgets.noninteractive.fg_stroke;
    let hovered_stroke = ui.visuals().widgets.hovered.fg_stroke;

    for (i, edge) in scene.edges().iter().enumerate() {
        let is_hovered = matches!(hovered, Some(HitTarget::Edge(h)) if h.0 == i);
        let stroke = match (edge.kind, is_hovered) {
            (_, true) => hovered_stroke,
            (EdgeKind::Flow, false) => edge_stroke,
            (EdgeKind::Skip, false) => Stroke::new(2.0, SKIP_COLOR),
        };
        if is_hovered {
            let points = edge.polyline().into_iter().map(to_screen).collect::<Vec<_>>();
            let offset = dash_offset(ui.input(|i| i.time));
            painter.extend(Shape::dashed_line_with_offset(
                &points,
                stroke,
                &EDGE_DASH[..1],
                &EDGE_DASH[1..],
                offset,
            ));
            // keep the dashes moving while the pointer rests on the edge
            ui.ctx().request_repaint();
        } else {
            painter.add(CubicBezierShape::from_points_stroke(
                edge.points.map(to_screen),
                false,
                Color32::TRANSPARENT,
                stroke,
            ));
        }
        painter.add(Shape::convex_polygon(
            edge.arrow_head().map(to_screen).to_vec(),
            stroke.color,
            Stroke::NONE,
        ));
    }

    for (i, node) in scene.nodes().iter().enumerate() {
        let is_hovered = hovered == Some(HitTarget::Node(NodeHandle(i)));
        let screen_rect = camera.rect_to_screen(node.rect).translate(origin);
        let stroke_width = match (node.is_clickable(), is_hovered) {
            (true, true) => 3.5,
            (true, false) => 2.5,
            (false, _) => 1.5,
        };
        let radius = (node.style.corner_radius() * zoom).round().clamp(0.0, 255.0) as u8;
        painter.rect(
            screen_rect,
            CornerRadius::same(radius),
            color(node.style.fill()),
            Stroke::new(stroke_width, color(node.style.stroke())),
            StrokeKind::Inside,
        );

        let title_size = (13.0 * zoom).clamp(6.0, 28.0);
        match &node.subtitle {
            Some(subtitle) => {
                painter.text(
                    screen_rect.center() - Vec2::new(0.0, title_size * 0.55),
                    Align2::CENTER_CENTER,
                    &node.label,
                    FontId::proportional(title_size),
                    NODE_TEXT_COLOR,
                );
                painter.text(
                    screen_rect.center() + Vec2::new(0.0, title_size * 0.65),
                    Align2::CENTER_CENTER,
                    subtitle,
                    FontId::proportional(title_size * 0.75),
                    NODE_TEXT_COLOR,
                );
            }
            None => {
                painter.text(
                    screen_rect.center(),
                    Align2::CENTER_CENTER,
                    &node.label,
                    FontId::proportional(title_size),
                    NODE_TEXT_COLOR,
                );
            }
        }
    }

    for port in scene.ports() {
        painter.circle(
            to_screen(port.center),
            port.radius * zoom.clamp(0.5, 2.0),
            PORT_COLOR,
            Stroke::new(1.5, Color32::WHITE),
        );
    }

    for label in scene.labels() {
        painter.text(
            to_screen(label.position),
            Align2::CENTER_CENTER,
            &label.text,
            FontId::proportional((12.0 * zoom).clamp(6.0, 24.0)),
            ui.visuals().text_color(),
        );
    }
}
