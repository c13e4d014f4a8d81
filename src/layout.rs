use crate::camera::SurfaceSize;
use crate::scene::{EdgeHandle, NodeHandle, Scene};
use emath::{Pos2, Vec2, pos2, vec2};

const MIN_NODE_WIDTH: f32 = 48.0;
const MAX_NODE_WIDTH: f32 = 220.0;
const MIN_NODE_HEIGHT: f32 = 40.0;
const MAX_NODE_HEIGHT: f32 = 90.0;

/// Places nodes relative to the surface size so each level fills whatever
/// viewport it is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    width: f32,
    height: f32,
    margin: f32,
}

impl Layout {
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            width: surface.width,
            height: surface.height,
            margin: (surface.width * 0.06).clamp(24.0, 80.0),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn center_y(&self) -> f32 {
        self.height / 2.0
    }

    fn slot(&self, count: usize) -> f32 {
        (self.width - 2.0 * self.margin).max(1.0) / count.max(1) as f32
    }

    pub fn node_size(&self, count: usize) -> Vec2 {
        vec2(
            (self.slot(count) * 0.72).clamp(MIN_NODE_WIDTH, MAX_NODE_WIDTH),
            (self.height * 0.16).clamp(MIN_NODE_HEIGHT, MAX_NODE_HEIGHT),
        )
    }

    /// `count` evenly spaced centers on the horizontal line `y`.
    pub fn row(&self, count: usize, y: f32) -> Vec<Pos2> {
        let slot = self.slot(count);
        (0..count)
            .map(|i| pos2(self.margin + slot * (i as f32 + 0.5), y))
            .collect()
    }

    /// `count` evenly spaced centers on the vertical line `x`.
    pub fn column(&self, count: usize, x: f32) -> Vec<Pos2> {
        let usable = (self.height - 2.0 * self.margin).max(1.0);
        let slot = usable / count.max(1) as f32;
        (0..count)
            .map(|i| pos2(x, self.margin + slot * (i as f32 + 0.5)))
            .collect()
    }

    /// Row-major grid holding at most `max_per_row` nodes per row, vertically
    /// centered. Returns the centers and a node size that fits every cell.
    pub fn grid(&self, count: usize, max_per_row: usize) -> (Vec<Pos2>, Vec2) {
        let per_row = max_per_row.max(1).min(count.max(1));
        let rows = count.max(1).div_ceil(per_row);
        let size = self.node_size(per_row);
        let row_pitch = size.y * 1.8;
        let first_y = self.center_y() - row_pitch * (rows as f32 - 1.0) / 2.0;
        let mut centers = Vec::with_capacity(count);
        for r in 0..rows {
            let y = first_y + row_pitch * r as f32;
            for x in self.row(per_row, y) {
                if centers.len() == count {
                    break;
                }
                centers.push(x);
            }
        }
        (centers, size)
    }

    /// Connects consecutive nodes. Nodes on the same row are joined side to
    /// side, a wrap to the next row goes bottom to top.
    pub fn chain(
        &self,
        scene: &mut Scene,
        nodes: &[NodeHandle],
        tooltips: &[Option<String>],
    ) -> Vec<EdgeHandle> {
        let mut edges = vec![];
        for (i, pair) in nodes.windows(2).enumerate() {
            let (Some(a), Some(b)) = (scene.node(pair[0]), scene.node(pair[1])) else {
                continue;
            };
            let (p1, p2) = if (a.center().y - b.center().y).abs() < 1.0 {
                (a.right(), b.left())
            } else {
                (a.bottom(), b.top())
            };
            let tooltip = tooltips.get(i).cloned().flatten();
            edges.push(scene.create_edge(p1, p2, tooltip));
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_is_centered_and_ordered() {
        let layout = Layout::new(SurfaceSize::new(1000.0, 500.0));
        let xs = layout.row(4, 250.0);
        assert_eq!(xs.len(), 4);
        assert!(xs.windows(2).all(|w| w[0].x < w[1].x));
        let mid = (xs[0].x + xs[3].x) / 2.0;
        assert!((mid - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_grid_wraps_rows() {
        let layout = Layout::new(SurfaceSize::new(1000.0, 500.0));
        let (centers, _) = layout.grid(23, 8);
        assert_eq!(centers.len(), 23);
        assert!(centers[8].y > centers[7].y);
    }
}
