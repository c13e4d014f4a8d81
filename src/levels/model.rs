use super::{RenderContext, chain_with_ports, format_count, head_target};
use crate::navigation::LevelPayload;
use crate::scene::{NodeSpec, NodeStyle, Scene};

pub(super) fn render(_payload: &LevelPayload, ctx: &RenderContext, scene: &mut Scene) {
    let shapes = ctx.shapes;
    let centers = ctx.layout.row(4, ctx.layout.center_y());
    let size = ctx.layout.node_size(4);

    let backbone_params = shapes.conv1.parameters
        + shapes.stages.iter().map(|x| x.parameters).sum::<u64>();
    let last_stage = &shapes.stages[3];

    let input = scene.create_node(
        NodeSpec::new(centers[0], size, "Input", NodeStyle::Input)
            .subtitle(shapes.input.format_shape())
            .tooltip(format!("Image batch {}", ctx.input)),
    );
    let backbone = scene.create_node(
        NodeSpec::new(centers[1], size, "Backbone", NodeStyle::Stem)
            .subtitle(format!("{} · stem + 4 stages", ctx.depth))
            .on_click(LevelPayload::Backbone)
            .tooltip(format!(
                "Feature extractor, {} conv weights. Click to expand.",
                format_count(backbone_params)
            )),
    );
    let head = scene.create_node(
        NodeSpec::new(centers[2], size, "Head", NodeStyle::Head)
            .subtitle("avgpool → fc")
            .on_click(LevelPayload::Stage(head_target(shapes)))
            .tooltip(format!(
                "Classifier, {} parameters. Click to expand.",
                format_count(shapes.fc.parameters)
            )),
    );
    let output = scene.create_node(
        NodeSpec::new(centers[3], size, "Prediction", NodeStyle::Output)
            .subtitle(shapes.pred.format_shape())
            .tooltip("Class probabilities after softmax"),
    );

    chain_with_ports(
        ctx,
        scene,
        &[input, backbone, head, output],
        &[
            shapes.input.format_shape(),
            last_stage.format_shape(),
            shapes.fc.format_shape(),
        ],
    );
}
