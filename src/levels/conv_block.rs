use super::{RenderContext, chain_with_ports, format_count};
use crate::navigation::LevelPayload;
use crate::scene::{NodeSpec, NodeStyle, Scene};
use crate::shapes::{conv_params, format_shape};
use emath::pos2;

pub(super) fn render(payload: &LevelPayload, ctx: &RenderContext, scene: &mut Scene) {
    let LevelPayload::ConvBlock(target) = payload else {
        log::warn!("ConvBlock renderer called with {:?}", payload.level());
        return;
    };
    let n = ctx.input.n();
    let k = target.kernel;
    let in_shape = format_shape(&[n, target.in_channels, target.in_height, target.in_width]);
    let out_shape = format_shape(&[n, target.out_channels, target.height, target.width]);
    let with_relu = target.position < 3;
    let count = if with_relu { 5 } else { 4 };

    let centers = ctx.layout.row(count, ctx.layout.center_y());
    let size = ctx.layout.node_size(count);

    let mut nodes = vec![
        scene.create_node(
            NodeSpec::new(centers[0], size, "Input", NodeStyle::Input).subtitle(in_shape.clone()),
        ),
        scene.create_node(
            NodeSpec::new(centers[1], size, format!("Conv {k}×{k}"), NodeStyle::Conv)
                .subtitle(format!("stride {} · pad {}", target.stride, k / 2))
                .tooltip(format!(
                    "{k}·{k}·{}·{} = {} weights",
                    target.in_channels,
                    target.out_channels,
                    format_count(conv_params(k, target.in_channels, target.out_channels))
                )),
        ),
        scene.create_node(
            NodeSpec::new(centers[2], size, "BatchNorm", NodeStyle::Norm)
                .subtitle(format!("γ, β × {}", target.out_channels))
                .tooltip(format!(
                    "{} learnable scale and shift values",
                    2 * target.out_channels
                )),
        ),
    ];
    let mut edge_shapes = vec![in_shape, out_shape.clone(), out_shape.clone()];
    if with_relu {
        nodes.push(scene.create_node(
            NodeSpec::new(centers[3], size, "ReLU", NodeStyle::Activation).subtitle("max(0, ·)"),
        ));
        edge_shapes.push(out_shape.clone());
    }
    nodes.push(scene.create_node(
        NodeSpec::new(centers[count - 1], size, "Output", NodeStyle::Output).subtitle(out_shape),
    ));

    if !with_relu {
        scene.create_label(
            pos2(centers[count - 1].x, centers[count - 1].y + size.y),
            "ReLU follows the residual add",
        );
    }

    chain_with_ports(ctx, scene, &nodes, &edge_shapes);
}
