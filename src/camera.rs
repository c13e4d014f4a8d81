use crate::error::NavigatorError;
use emath::{Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

/// Size of the drawing surface in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<(), NavigatorError> {
        let usable = self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0;
        if usable {
            Ok(())
        } else {
            Err(NavigatorError::MissingSurface {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn to_vec2(&self) -> Vec2 {
        vec2(self.width, self.height)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.to_vec2())
    }
}

/// World-to-screen transform: `screen = world * scale + translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub scale: f32,
    pub translation: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: Vec2::ZERO,
        }
    }
}

impl Camera {
    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        pos2(
            world.x * self.scale + self.translation.x,
            world.y * self.scale + self.translation.y,
        )
    }

    pub fn to_world(&self, screen: Pos2) -> Pos2 {
        pos2(
            (screen.x - self.translation.x) / self.scale,
            (screen.y - self.translation.y) / self.scale,
        )
    }

    pub fn rect_to_screen(&self, world: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(world.min), self.to_screen(world.max))
    }

    pub fn pan(&mut self, screen_delta: Vec2) {
        self.translation += screen_delta;
    }

    /// Zooms by `factor`, keeping the world point under `screen_point` fixed.
    pub fn zoom_about(&mut self, screen_point: Pos2, factor: f32, min_zoom: f32, max_zoom: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchor = self.to_world(screen_point);
        self.scale = (self.scale * factor).clamp(min_zoom, max_zoom);
        self.translation = vec2(
            screen_point.x - anchor.x * self.scale,
            screen_point.y - anchor.y * self.scale,
        );
    }

    /// Auto-fit: scales `bounds` to fill the surface minus `padding` on each
    /// side and centers it.
    pub fn fit(
        bounds: Rect,
        surface: SurfaceSize,
        padding: f32,
        min_zoom: f32,
        max_zoom: f32,
    ) -> Self {
        let center = surface.rect().center();
        if !bounds.is_positive() || !bounds.is_finite() {
            return Self {
                scale: 1.0,
                translation: center.to_vec2(),
            };
        }
        let available = (surface.to_vec2() - Vec2::splat(2.0 * padding)).max(Vec2::splat(1.0));
        let scale = (available.x / bounds.width())
            .min(available.y / bounds.height())
            .clamp(min_zoom, max_zoom);
        let bounds_center = bounds.center();
        Self {
            scale,
            translation: vec2(
                center.x - bounds_center.x * scale,
                center.y - bounds_center.y * scale,
            ),
        }
    }

    pub fn svg_transform(&self) -> String {
        format!(
            "translate({:.2} {:.2}) scale({:.4})",
            self.translation.x, self.translation.y, self.scale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_about_keeps_anchor() {
        let mut camera = Camera::default();
        let anchor = pos2(120.0, 80.0);
        let before = camera.to_world(anchor);
        camera.zoom_about(anchor, 2.0, 0.1, 8.0);
        let after = camera.to_world(anchor);
        assert!((before - after).length() < 1e-4);
        assert_eq!(camera.scale, 2.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.zoom_about(Pos2::ZERO, 100.0, 0.1, 8.0);
        assert_eq!(camera.scale, 8.0);
    }
}
