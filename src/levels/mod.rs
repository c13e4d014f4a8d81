mod backbone;
mod conv_block;
mod fx;
mod model;
mod residual;
mod stage;

use crate::config::InputConfig;
use crate::layout::Layout;
use crate::navigation::{BlockTarget, Level, LevelPayload, NavigationFrame, StageKind, StageTarget};
use crate::scene::{EdgeHandle, NodeHandle, Scene};
use crate::shapes::{ResNetDepth, ShapeTable, stage_spec};

pub use fx::branch_convs;

pub use residual::RESIDUAL_FORMULA;

pub struct RenderContext<'a> {
    pub input: &'a InputConfig,
    pub shapes: &'a ShapeTable,
    pub depth: ResNetDepth,
    pub layout: Layout,
}

pub type RenderFn = fn(&LevelPayload, &RenderContext, &mut Scene);

pub fn renderer_for(level: Level) -> RenderFn {
    match level {
        Level::Model => model::render,
        Level::Backbone => backbone::render,
        Level::Stage => stage::render,
        Level::Residual => residual::render,
        Level::Fx => fx::render,
        Level::ConvBlock => conv_block::render,
    }
}

/// Clears `scene` and draws `frame` into it.
pub fn render_frame(frame: &NavigationFrame, ctx: &RenderContext, scene: &mut Scene) {
    scene.clear();
    renderer_for(frame.level())(frame.payload(), ctx, scene);
    log::debug!(
        "Rendered {}: {} nodes, {} edges, {} ports",
        frame.level(),
        scene.nodes().len(),
        scene.edges().len(),
        scene.ports().len()
    );
}

pub(crate) fn format_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.2}M", count as f64 / 1e6)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1e3)
    } else {
        count.to_string()
    }
}

/// Spatial size entering stage `index` (1-based): the pooled stem output for
/// the first stage, the previous stage's output otherwise.
pub(crate) fn stage_input_hw(shapes: &ShapeTable, index: usize) -> (u64, u64) {
    let entry = if index <= 1 {
        Some(&shapes.pool)
    } else {
        shapes.stage(index - 1)
    };
    entry.and_then(|x| x.spatial()).unwrap_or((1, 1))
}

/// Click target for stage `index` (1-based) on the backbone.
pub fn stage_target(shapes: &ShapeTable, depth: ResNetDepth, index: usize) -> Option<StageTarget> {
    let spec = stage_spec(depth, index)?;
    let (height, width) = shapes.stage(index)?.spatial()?;
    Some(StageTarget {
        kind: StageKind::Stage {
            index,
            block_count: spec.blocks,
        },
        channels: spec.out_channels,
        height,
        width,
    })
}

pub fn head_target(shapes: &ShapeTable) -> StageTarget {
    let last = &shapes.stages[3];
    let (height, width) = last.spatial().unwrap_or((1, 1));
    StageTarget {
        kind: StageKind::Head,
        channels: last.channels(),
        height,
        width,
    }
}

/// Click target for block `block` (1-based) of stage `stage`.
pub fn block_target(
    shapes: &ShapeTable,
    depth: ResNetDepth,
    stage: usize,
    block: u64,
) -> Option<BlockTarget> {
    let spec = stage_spec(depth, stage)?;
    if block == 0 || block > spec.blocks {
        return None;
    }
    let (height, width) = shapes.stage(stage)?.spatial()?;
    let (in_height, in_width) = if block == 1 {
        stage_input_hw(shapes, stage)
    } else {
        (height, width)
    };
    Some(BlockTarget {
        stage,
        block,
        in_channels: spec.block_in_channels(block),
        in_height,
        in_width,
        channels: spec.out_channels,
        height,
        width,
    })
}

/// Recomputes the shape-dependent fields of `payload` against a new shape
/// table, keeping which stage/block/conv it points at. Returns `None` if the
/// target no longer exists.
pub fn retarget(
    payload: &LevelPayload,
    shapes: &ShapeTable,
    depth: ResNetDepth,
) -> Option<LevelPayload> {
    Some(match payload {
        LevelPayload::Model => LevelPayload::Model,
        LevelPayload::Backbone => LevelPayload::Backbone,
        LevelPayload::Stage(target) => match target.kind {
            StageKind::Stage { index, .. } => {
                LevelPayload::Stage(stage_target(shapes, depth, index)?)
            }
            StageKind::Head => LevelPayload::Stage(head_target(shapes)),
        },
        LevelPayload::Residual(target) => {
            LevelPayload::Residual(block_target(shapes, depth, target.stage, target.block)?)
        }
        LevelPayload::Fx(target) => {
            LevelPayload::Fx(block_target(shapes, depth, target.stage, target.block)?)
        }
        LevelPayload::ConvBlock(target) => {
            let block = block_target(shapes, depth, target.stage, target.block)?;
            let convs = branch_convs(&block);
            LevelPayload::ConvBlock(*convs.get(target.position.checked_sub(1)?)?)
        }
    })
}

/// Chains `nodes` left to right and drops a port at the start of every edge
/// showing the tensor shape flowing through it.
pub(crate) fn chain_with_ports(
    ctx: &RenderContext,
    scene: &mut Scene,
    nodes: &[NodeHandle],
    shapes: &[String],
) -> Vec<EdgeHandle> {
    let tooltips = shapes.iter().cloned().map(Some).collect::<Vec<_>>();
    let edges = ctx.layout.chain(scene, nodes, &tooltips);
    for (edge, shape) in edges.iter().zip(shapes) {
        if let Some(start) = scene.edge(*edge).map(|x| x.start()) {
            scene.create_port(start, shape.clone());
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(9408), "9.4K");
        assert_eq!(format_count(2_049_000), "2.05M");
    }
}
