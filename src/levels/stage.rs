use super::{RenderContext, block_target, chain_with_ports, format_count, stage_input_hw};
use crate::navigation::{LevelPayload, StageKind, StageTarget};
use crate::scene::{NodeSpec, NodeStyle, Scene};
use crate::shapes::{NUM_CLASSES, bottleneck_params, format_shape, stage_spec};
use emath::pos2;

const MAX_BLOCKS_PER_ROW: usize = 8;

pub(super) fn render(payload: &LevelPayload, ctx: &RenderContext, scene: &mut Scene) {
    let LevelPayload::Stage(target) = payload else {
        log::warn!("Stage renderer called with {:?}", payload.level());
        return;
    };
    match target.kind {
        StageKind::Stage { index, block_count } => {
            render_stage(target, index, block_count, ctx, scene)
        }
        StageKind::Head => render_head(target, ctx, scene),
    }
}

fn render_stage(
    target: &StageTarget,
    index: usize,
    block_count: u64,
    ctx: &RenderContext,
    scene: &mut Scene,
) {
    let n = ctx.input.n();
    let in_channels = stage_spec(ctx.depth, index)
        .map(|x| x.in_channels)
        .unwrap_or(target.channels);
    let (in_h, in_w) = stage_input_hw(ctx.shapes, index);
    let out_shape = format_shape(&[n, target.channels, target.height, target.width]);

    // input, blocks, output share one grid so long stages wrap
    let count = block_count as usize + 2;
    let (centers, size) = ctx.layout.grid(count, MAX_BLOCKS_PER_ROW);

    let mut nodes = vec![scene.create_node(
        NodeSpec::new(centers[0], size, "Input", NodeStyle::Input)
            .subtitle(format_shape(&[n, in_channels, in_h, in_w])),
    )];
    let mut edge_shapes = vec![format_shape(&[n, in_channels, in_h, in_w])];

    for index_in_stage in 1..=block_count {
        let Some(block) = block_target(ctx.shapes, ctx.depth, index, index_in_stage) else {
            continue;
        };
        let block_in = block.in_channels;
        let subtitle = if block.has_projection() {
            format!("{}→{} · stride {}", block_in, target.channels, block.stride())
        } else {
            format!("{}→{}", block_in, target.channels)
        };
        nodes.push(
            scene.create_node(
                NodeSpec::new(
                    centers[block.block as usize],
                    size,
                    format!("Block {}", block.block),
                    NodeStyle::Block,
                )
                .subtitle(subtitle)
                .on_click(LevelPayload::Residual(block))
                .tooltip(format!(
                    "Bottleneck {} ({} weights{}). Click to expand.",
                    block.block,
                    format_count(bottleneck_params(
                        block_in,
                        target.channels,
                        block.has_projection()
                    )),
                    if block.has_projection() {
                        ", projection shortcut"
                    } else {
                        ""
                    }
                )),
            ),
        );
        edge_shapes.push(out_shape.clone());
    }

    nodes.push(scene.create_node(
        NodeSpec::new(centers[count - 1], size, "Output", NodeStyle::Output)
            .subtitle(out_shape.clone()),
    ));

    if let Some(first) = centers.first() {
        scene.create_label(
            pos2(first.x, first.y - size.y),
            format!("layer{index} · {block_count} bottleneck blocks"),
        );
    }

    chain_with_ports(ctx, scene, &nodes, &edge_shapes);
}

fn render_head(target: &StageTarget, ctx: &RenderContext, scene: &mut Scene) {
    let shapes = ctx.shapes;
    let centers = ctx.layout.row(6, ctx.layout.center_y());
    let size = ctx.layout.node_size(6);
    let features = format_shape(&[ctx.input.n(), target.channels, target.height, target.width]);

    let nodes = [
        scene.create_node(
            NodeSpec::new(centers[0], size, "Features", NodeStyle::Input).subtitle(features.clone()),
        ),
        scene.create_node(
            NodeSpec::new(centers[1], size, "AvgPool", NodeStyle::Pool)
                .subtitle("global average")
                .tooltip(format!(
                    "Averages each {}×{} map to one value",
                    target.height, target.width
                )),
        ),
        scene.create_node(
            NodeSpec::new(centers[2], size, "Flatten", NodeStyle::Transform)
                .subtitle(shapes.flatten.format_shape()),
        ),
        scene.create_node(
            NodeSpec::new(centers[3], size, "FC", NodeStyle::Linear)
                .subtitle(format!("{} → {}", target.channels, NUM_CLASSES))
                .tooltip(format!(
                    "Linear layer, {} parameters",
                    format_count(shapes.fc.parameters)
                )),
        ),
        scene.create_node(
            NodeSpec::new(centers[4], size, "Softmax", NodeStyle::Activation)
                .subtitle("probabilities"),
        ),
        scene.create_node(
            NodeSpec::new(centers[5], size, "Prediction", NodeStyle::Output)
                .subtitle(shapes.pred.format_shape()),
        ),
    ];

    chain_with_ports(
        ctx,
        scene,
        &nodes,
        &[
            features,
            shapes.avgpool.format_shape(),
            shapes.flatten.format_shape(),
            shapes.fc.format_shape(),
            shapes.pred.format_shape(),
        ],
    );
}
