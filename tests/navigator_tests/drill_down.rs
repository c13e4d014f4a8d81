use super::{block_nodes, counts, navigator};
use arch_navigator::navigation::{Level, LevelPayload, NavigationChange, StageKind};
use arch_navigator::{NavigatorError, ResNetDepth, compute_shapes};

pub fn test_stage_block_counts(depth: ResNetDepth) {
    let mut navigator = navigator(depth);
    navigator.click_label("Backbone").unwrap();
    // stage 1 is drawn but has no drill-down view
    let stage1 = navigator.scene().find_node("Stage 1").unwrap();
    assert!(!navigator.scene().node(stage1).unwrap().is_clickable());
    match navigator.click_label("Stage 1") {
        Err(NavigatorError::UnknownNode { label, level }) => {
            assert_eq!(label, "Stage 1");
            assert_eq!(level, Level::Backbone);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(navigator.click_node(stage1).is_none());
    assert_eq!(navigator.level(), Level::Backbone);

    for index in 2..=4 {
        let change = navigator.click_label(&format!("Stage {index}")).unwrap();
        assert_eq!(change, NavigationChange::Pushed(Level::Stage));
        let expected = depth.block_counts()[index - 1];
        assert_eq!(block_nodes(navigator.scene()) as u64, expected);
        match navigator.top().payload() {
            LevelPayload::Stage(target) => {
                assert_eq!(
                    target.kind,
                    StageKind::Stage {
                        index,
                        block_count: expected
                    }
                );
            }
            other => panic!("expected a stage payload, got {other:?}"),
        }
        // input, blocks, output in one chain
        assert_eq!(navigator.scene().edges().len() as u64, expected + 1);
        navigator.back().unwrap();
    }
    assert_eq!(navigator.level(), Level::Backbone);
}

pub fn test_drill_to_conv_block(depth: ResNetDepth) {
    let mut navigator = navigator(depth);
    navigator
        .navigate_labels(&["Backbone", "Stage 3", "Block 1", "F(x)", "Conv2 3×3"])
        .unwrap();
    assert_eq!(
        navigator.stack().levels(),
        vec![
            Level::Model,
            Level::Backbone,
            Level::Stage,
            Level::Residual,
            Level::Fx,
            Level::ConvBlock
        ]
    );
    assert_eq!(
        navigator.breadcrumb(),
        "Model › Backbone › Stage › Residual › Fx › ConvBlock"
    );
    let LevelPayload::ConvBlock(conv) = *navigator.top().payload() else {
        panic!("expected a conv payload");
    };
    assert_eq!((conv.stage, conv.block, conv.position), (3, 1, 2));
    assert_eq!(conv.kernel, 3);
    assert_eq!(conv.stride, 2);
    assert_eq!((conv.in_channels, conv.out_channels), (256, 256));
    assert_eq!((conv.in_height, conv.height), (28, 14));
    // leaf level
    assert!(navigator.scene().nodes().iter().all(|x| !x.is_clickable()));

    for _ in 0..5 {
        assert!(navigator.back().is_some());
    }
    assert_eq!(navigator.level(), Level::Model);
    assert!(navigator.back().is_none());
    assert_eq!(navigator.stack().depth(), 1);
}

pub fn test_idempotent_rerender(depth: ResNetDepth) {
    let mut navigator = navigator(depth);
    let path = ["Backbone", "Stage 4", "Block 2", "F(x)", "Conv3 1×1"];
    for label in [None].into_iter().chain(path.iter().map(Some)) {
        if let Some(label) = label {
            navigator.click_label(label).unwrap();
        }
        let before = counts(navigator.scene());
        let camera = *navigator.camera();
        navigator.render();
        assert_eq!(counts(navigator.scene()), before, "at {}", navigator.level());
        assert_eq!(*navigator.camera(), camera);
    }
}

pub fn test_residual_skip_connection(depth: ResNetDepth) {
    let mut navigator = navigator(depth);
    for (stage, block, projection) in [("Stage 2", "Block 1", true), ("Stage 2", "Block 2", false)] {
        navigator.navigate_labels(&["Backbone", stage, block]).unwrap();
        let scene = navigator.scene();
        assert_eq!(scene.skip_connections().count(), 1);
        let skip = scene.skip_connections().next().unwrap();
        let tooltip = skip.tooltip.as_deref().unwrap();
        assert_eq!(tooltip.starts_with("Projection"), projection, "{tooltip}");
        assert!(navigator.show_formula_panel());
        navigator.home();
    }
}

pub fn test_head_path(depth: ResNetDepth) {
    let mut navigator = navigator(depth);
    navigator.click_label("Head").unwrap();
    let labels = navigator
        .scene()
        .nodes()
        .iter()
        .map(|x| x.label.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        labels,
        ["Features", "AvgPool", "Flatten", "FC", "Softmax", "Prediction"]
    );
    let shapes = compute_shapes(&navigator.input(), depth);
    let fc = navigator.scene().find_node("FC").unwrap();
    let tooltip = navigator.scene().node(fc).unwrap().tooltip.clone().unwrap();
    assert!(tooltip.contains("2.05M"), "{tooltip} / {}", shapes.fc.parameters);
}
