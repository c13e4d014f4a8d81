use super::{RenderContext, chain_with_ports, format_count};
use crate::navigation::LevelPayload;
use crate::scene::{NodeSpec, NodeStyle, Scene};
use crate::shapes::{bottleneck_params, conv_params, format_shape};
use emath::{pos2, vec2};

pub const RESIDUAL_FORMULA: &str = "y = ReLU(F(x) + x)";

pub(super) fn render(payload: &LevelPayload, ctx: &RenderContext, scene: &mut Scene) {
    let LevelPayload::Residual(target) = payload else {
        log::warn!("Residual renderer called with {:?}", payload.level());
        return;
    };
    let n = ctx.input.n();
    let in_shape = format_shape(&[n, target.in_channels, target.in_height, target.in_width]);
    let out_shape = format_shape(&[n, target.channels, target.height, target.width]);

    let centers = ctx.layout.row(5, ctx.layout.center_y());
    let size = ctx.layout.node_size(5);
    let add_size = vec2(size.y, size.y) * 0.7;

    let x = scene.create_node(
        NodeSpec::new(centers[0], size, "x", NodeStyle::Input)
            .subtitle(in_shape.clone())
            .tooltip(format!("Block input {in_shape}")),
    );
    let fx = scene.create_node(
        NodeSpec::new(centers[1], size, "F(x)", NodeStyle::Block)
            .subtitle("1×1 → 3×3 → 1×1")
            .on_click(LevelPayload::Fx(*target))
            .tooltip(format!(
                "Residual branch, {} weights. Click to expand.",
                format_count(bottleneck_params(target.in_channels, target.channels, false))
            )),
    );
    let add = scene.create_node(
        NodeSpec::new(centers[2], add_size, "⊕", NodeStyle::Add)
            .tooltip("Element-wise sum of F(x) and the shortcut"),
    );
    let relu = scene.create_node(
        NodeSpec::new(centers[3], size, "ReLU", NodeStyle::Activation)
            .subtitle("max(0, ·)"),
    );
    let y = scene.create_node(
        NodeSpec::new(centers[4], size, "y", NodeStyle::Output).subtitle(out_shape.clone()),
    );

    chain_with_ports(
        ctx,
        scene,
        &[x, fx, add, relu, y],
        &[in_shape.clone(), out_shape.clone(), out_shape.clone(), out_shape],
    );

    let skip_tooltip = if target.has_projection() {
        format!(
            "Projection shortcut: 1×1 conv {}→{}, stride {} ({} weights) + BN",
            target.in_channels,
            target.channels,
            target.stride(),
            format_count(conv_params(1, target.in_channels, target.channels))
        )
    } else {
        "Identity shortcut: x is added unchanged".to_string()
    };
    if let (Some(from), Some(to)) = (
        scene.node(x).map(|x| x.top()),
        scene.node(add).map(|x| x.top()),
    ) {
        let skip = scene.create_skip_connection(from, to, Some(skip_tooltip));
        let crest = scene.edge(skip).map(|x| x.sample(0.5)).unwrap_or(from);
        let caption = if target.has_projection() {
            "W_s · x"
        } else {
            "identity"
        };
        scene.create_label(pos2(crest.x, crest.y - 10.0), caption);
    }

    scene.create_label(
        pos2(centers[2].x, centers[2].y + size.y * 1.2),
        RESIDUAL_FORMULA,
    );
}
