use arch_navigator::scene::Scene;
use arch_navigator::{ArchitectureNavigator, NavigatorOptions, ResNetDepth};

pub mod drill_down;
pub mod shapes;

fn navigator(depth: ResNetDepth) -> ArchitectureNavigator {
    ArchitectureNavigator::new(NavigatorOptions {
        depth,
        ..NavigatorOptions::default()
    })
    .unwrap()
}

fn counts(scene: &Scene) -> (usize, usize, usize, usize) {
    (
        scene.nodes().len(),
        scene.edges().len(),
        scene.ports().len(),
        scene.labels().len(),
    )
}

fn block_nodes(scene: &Scene) -> usize {
    scene
        .nodes()
        .iter()
        .filter(|x| x.label.starts_with("Block "))
        .count()
}
