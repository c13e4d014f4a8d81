use super::{RenderContext, chain_with_ports, format_count};
use crate::navigation::{BlockTarget, ConvTarget, LevelPayload};
use crate::scene::{NodeSpec, NodeStyle, Scene};
use crate::shapes::{BOTTLENECK_EXPANSION, conv_params, format_shape};

/// x, three conv/BN pairs, two inner ReLUs, F(x)
const NODE_COUNT: usize = 10;

/// The three convs of the bottleneck branch. The 3x3 carries the stride, so
/// the first conv keeps the input resolution and the last two produce the
/// block's output resolution.
pub fn branch_convs(target: &BlockTarget) -> [ConvTarget; 3] {
    let mid = target.channels / BOTTLENECK_EXPANSION;
    let conv = |position, kernel, in_channels, in_hw: (u64, u64), out_channels, stride, out_hw: (u64, u64)| {
        ConvTarget {
            stage: target.stage,
            block: target.block,
            position,
            kernel,
            in_channels,
            in_height: in_hw.0,
            in_width: in_hw.1,
            out_channels,
            stride,
            height: out_hw.0,
            width: out_hw.1,
        }
    };
    let in_hw = (target.in_height, target.in_width);
    let out_hw = (target.height, target.width);
    [
        conv(1, 1, target.in_channels, in_hw, mid, 1, in_hw),
        conv(2, 3, mid, in_hw, mid, target.stride(), out_hw),
        conv(3, 1, mid, out_hw, target.channels, 1, out_hw),
    ]
}

pub(super) fn render(payload: &LevelPayload, ctx: &RenderContext, scene: &mut Scene) {
    let LevelPayload::Fx(target) = payload else {
        log::warn!("F(x) renderer called with {:?}", payload.level());
        return;
    };
    let n = ctx.input.n();
    let centers = ctx.layout.row(NODE_COUNT, ctx.layout.center_y());
    let size = ctx.layout.node_size(NODE_COUNT);

    let mut nodes = vec![];
    let mut edge_shapes = vec![];
    let in_shape = format_shape(&[n, target.in_channels, target.in_height, target.in_width]);
    nodes.push(scene.create_node(
        NodeSpec::new(centers[0], size, "x", NodeStyle::Input).subtitle(in_shape.clone()),
    ));
    edge_shapes.push(in_shape);

    for conv in branch_convs(target) {
        let position = conv.position;
        let kernel = conv.kernel;
        let out_shape = format_shape(&[n, conv.out_channels, conv.height, conv.width]);

        nodes.push(
            scene.create_node(
                NodeSpec::new(
                    centers[nodes.len()],
                    size,
                    format!("Conv{position} {kernel}×{kernel}"),
                    NodeStyle::Conv,
                )
                .subtitle(format!("{}→{}", conv.in_channels, conv.out_channels))
                .on_click(LevelPayload::ConvBlock(conv))
                .tooltip(format!(
                    "{kernel}×{kernel} conv, stride {}, {} weights. Click to expand.",
                    conv.stride,
                    format_count(conv_params(kernel, conv.in_channels, conv.out_channels))
                )),
            ),
        );
        edge_shapes.push(out_shape.clone());

        nodes.push(
            scene.create_node(
                NodeSpec::new(
                    centers[nodes.len()],
                    size,
                    format!("BN{position}"),
                    NodeStyle::Norm,
                )
                .subtitle(format!("{}ch", conv.out_channels))
                .tooltip(format!("BatchNorm over {} channels", conv.out_channels)),
            ),
        );
        edge_shapes.push(out_shape);

        // the last ReLU is applied after the residual add
        if position < 3 {
            nodes.push(scene.create_node(NodeSpec::new(
                centers[nodes.len()],
                size,
                format!("ReLU{position}"),
                NodeStyle::Activation,
            )));
            edge_shapes.push(format_shape(&[n, conv.out_channels, conv.height, conv.width]));
        }
    }

    nodes.push(
        scene.create_node(
            NodeSpec::new(centers[nodes.len()], size, "F(x)", NodeStyle::Output).subtitle(
                format_shape(&[n, target.channels, target.height, target.width]),
            ),
        ),
    );

    chain_with_ports(ctx, scene, &nodes, &edge_shapes);
}
