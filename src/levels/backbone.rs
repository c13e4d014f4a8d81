use super::{RenderContext, chain_with_ports, format_count, stage_target};
use crate::navigation::LevelPayload;
use crate::scene::{NodeSpec, NodeStyle, Scene};
use crate::shapes::stage_spec;

const FIRST_CLICKABLE_STAGE: usize = 2;

pub(super) fn render(_payload: &LevelPayload, ctx: &RenderContext, scene: &mut Scene) {
    let shapes = ctx.shapes;
    // stem, four stages, feature output
    let centers = ctx.layout.row(6, ctx.layout.center_y());
    let size = ctx.layout.node_size(6);

    let mut nodes = vec![scene.create_node(
        NodeSpec::new(centers[0], size, "Stem", NodeStyle::Stem)
            .subtitle("7×7 conv · maxpool")
            .tooltip(format!(
                "conv1 {} ({} weights), then 3×3 maxpool to {}",
                shapes.conv1.format_shape(),
                format_count(shapes.conv1.parameters),
                shapes.pool.format_shape()
            )),
    )];
    let mut edge_shapes = vec![shapes.pool.format_shape()];

    for (i, entry) in shapes.stages.iter().enumerate() {
        let index = i + 1;
        let (Some(spec), Some(target)) = (
            stage_spec(ctx.depth, index),
            stage_target(shapes, ctx.depth, index),
        ) else {
            continue;
        };
        let mut node = NodeSpec::new(
            centers[index],
            size,
            format!("Stage {index}"),
            NodeStyle::Stage,
        )
        .subtitle(format!("{} blocks · {}ch", spec.blocks, spec.out_channels))
        .tooltip(format!(
            "layer{index}: {} → {} ({} scale, {} weights)",
            spec.in_channels,
            entry.format_shape(),
            entry.scale,
            format_count(entry.parameters)
        ));
        // stage 1 keeps the stem resolution and has no drill-down view
        if index >= FIRST_CLICKABLE_STAGE {
            node = node.on_click(LevelPayload::Stage(target));
        }
        nodes.push(scene.create_node(node));
        edge_shapes.push(entry.format_shape());
    }

    nodes.push(
        scene.create_node(
            NodeSpec::new(centers[5], size, "Features", NodeStyle::Output)
                .subtitle(shapes.stages[3].format_shape())
                .tooltip("Final feature map handed to the head"),
        ),
    );

    chain_with_ports(ctx, scene, &nodes, &edge_shapes);
}
