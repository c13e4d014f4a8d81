use arch_navigator::shapes::stage_spec;
use arch_navigator::{InputConfig, ResNetDepth, compute_shapes};

pub fn test_canonical_input_shapes(depth: ResNetDepth) {
    let shapes = compute_shapes(&InputConfig::default(), depth);
    assert_eq!(shapes.input.shape, vec![1, 3, 224, 224]);
    assert_eq!(shapes.conv1.shape, vec![1, 64, 112, 112]);
    assert_eq!(shapes.pool.shape, vec![1, 64, 56, 56]);
    assert_eq!(shapes.stages[0].shape, vec![1, 256, 56, 56]);
    assert_eq!(shapes.stages[1].shape, vec![1, 512, 28, 28]);
    assert_eq!(shapes.stages[2].shape, vec![1, 1024, 14, 14]);
    assert_eq!(shapes.stages[3].shape, vec![1, 2048, 7, 7]);
    assert_eq!(shapes.avgpool.shape, vec![1, 2048, 1, 1]);
    assert_eq!(shapes.flatten.shape, vec![1, 2048]);
    assert_eq!(shapes.fc.shape, vec![1, 1000]);
    assert_eq!(shapes.pred.shape, vec![1, 1000]);

    let scales = shapes.stages.iter().map(|x| x.scale.as_str()).collect::<Vec<_>>();
    assert_eq!(scales, ["4.0×", "8.0×", "16.0×", "32.0×"]);
    assert_eq!(shapes.conv1.parameters, 9408);
    assert_eq!(shapes.fc.parameters, 2_049_000);
}

pub fn test_monotone_spatial_dims(depth: ResNetDepth) {
    for (h, w) in [(32, 32), (33, 47), (224, 224), (299, 299), (512, 384), (1000, 37)] {
        let input = InputConfig::new(2, 3, h, w).unwrap();
        let shapes = compute_shapes(&input, depth);
        let spatial = [&shapes.input, &shapes.conv1, &shapes.pool]
            .into_iter()
            .chain(shapes.stages.iter())
            .chain([&shapes.avgpool])
            .map(|x| x.spatial().unwrap())
            .collect::<Vec<_>>();
        for pair in spatial.windows(2) {
            assert!(pair[1].0 <= pair[0].0, "height grew for {h}x{w}: {spatial:?}");
            assert!(pair[1].1 <= pair[0].1, "width grew for {h}x{w}: {spatial:?}");
        }
        assert!(spatial.iter().all(|x| x.0 >= 1 && x.1 >= 1));
        // batch flows through every row
        assert!(shapes.rows().all(|x| x.shape[0] == 2));
    }
}

pub fn test_stage_channels(depth: ResNetDepth) {
    let shapes = compute_shapes(&InputConfig::default(), depth);
    for index in 1..=4 {
        let spec = stage_spec(depth, index).unwrap();
        assert_eq!(shapes.stage(index).unwrap().channels(), spec.out_channels);
        assert_eq!(spec.blocks, depth.block_counts()[index - 1]);
        assert_eq!(spec.mid_channels * 4, spec.out_channels);
    }
    assert_eq!(spec_in(depth, 1), 64);
    assert_eq!(spec_in(depth, 3), 512);
}

fn spec_in(depth: ResNetDepth, index: usize) -> u64 {
    stage_spec(depth, index).unwrap().in_channels
}

pub fn test_total_parameters(depth: ResNetDepth) {
    let shapes = compute_shapes(&InputConfig::default(), depth);
    let expected = match depth {
        ResNetDepth::ResNet50 => 25_503_912,
        ResNetDepth::ResNet101 => 44_443_816,
        ResNetDepth::ResNet152 => 60_041_384,
    };
    assert_eq!(shapes.total_parameters(), expected);
    // parameter counts do not depend on the spatial size
    let large = compute_shapes(&InputConfig::new(4, 3, 512, 512).unwrap(), depth);
    assert_eq!(large.total_parameters() - large.conv1.parameters, expected - 9408);
}
