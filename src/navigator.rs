use crate::camera::{Camera, SurfaceSize};
use crate::code_panel::code_for_frame;
use crate::config::{InputConfig, NavigatorOptions};
use crate::error::{InputConfigError, NavigatorError};
use crate::layout::Layout;
use crate::levels::{RenderContext, render_frame, retarget};
use crate::navigation::{Level, NavigationChange, NavigationFrame, NavigationStack};
use crate::scene::{HitTarget, NodeHandle, Scene};
use crate::shapes::{ResNetDepth, ShapeTable, compute_shapes};
use emath::{Pos2, Vec2};
use serde::Serialize;

/// Serializable view of everything the navigator currently shows.
#[derive(Debug, Clone, Serialize)]
pub struct NavigatorSnapshot {
    pub depth: ResNetDepth,
    pub level: Level,
    pub breadcrumb: String,
    pub can_go_back: bool,
    pub show_formula_panel: bool,
    pub input: InputConfig,
    pub stack: NavigationStack,
    pub shapes: ShapeTable,
    pub code: String,
    pub camera: Camera,
    pub scene: Scene,
}

/// Owns the navigation stack and the currently rendered frame.
///
/// Every state change (push, pop, new input, resize) goes through [`Self::render`],
/// which rebuilds the scene for the top frame and refits the camera.
pub struct ArchitectureNavigator {
    options: NavigatorOptions,
    input: InputConfig,
    stack: NavigationStack,
    shapes: ShapeTable,
    scene: Scene,
    camera: Camera,
    code: String,
}

impl ArchitectureNavigator {
    pub fn new(options: NavigatorOptions) -> Result<Self, NavigatorError> {
        options.surface.validate()?;
        options.validate()?;
        let input = options.input;
        let shapes = compute_shapes(&input, options.depth);
        let mut navigator = Self {
            options,
            input,
            stack: NavigationStack::new(),
            shapes,
            scene: Scene::new(),
            camera: Camera::default(),
            code: String::new(),
        };
        navigator.render();
        log::info!(
            "Navigator ready: {} on {}x{} surface, input {}",
            navigator.options.depth,
            navigator.options.surface.width,
            navigator.options.surface.height,
            navigator.input
        );
        Ok(navigator)
    }

    /// Clears the scene, recomputes the shape table, draws the top frame,
    /// looks up its code and auto-fits the camera.
    pub fn render(&mut self) {
        self.shapes = compute_shapes(&self.input, self.options.depth);
        let ctx = RenderContext {
            input: &self.input,
            shapes: &self.shapes,
            depth: self.options.depth,
            layout: Layout::new(self.options.surface),
        };
        render_frame(self.stack.top(), &ctx, &mut self.scene);
        self.code = code_for_frame(self.stack.top(), self.options.code_panel_mode).into_owned();
        self.fit_camera();
    }

    pub fn fit_camera(&mut self) {
        self.camera = Camera::fit(
            self.scene.bounding_rect(),
            self.options.surface,
            self.options.fit_padding,
            self.options.min_zoom,
            self.options.max_zoom,
        );
        log::debug!(
            "Camera fit: scale {:.3}, translation ({:.1}, {:.1})",
            self.camera.scale,
            self.camera.translation.x,
            self.camera.translation.y
        );
    }

    /// Clicks whatever sits at `world_pos`. Only clickable nodes navigate;
    /// anything else is ignored.
    pub fn click(&mut self, world_pos: Pos2) -> Option<NavigationChange> {
        match self.scene.hit_test(world_pos)? {
            HitTarget::Node(handle) => self.click_node(handle),
            HitTarget::Edge(_) | HitTarget::Port(_) => None,
        }
    }

    pub fn click_screen(&mut self, screen_pos: Pos2) -> Option<NavigationChange> {
        self.click(self.camera.to_world(screen_pos))
    }

    pub fn click_node(&mut self, handle: NodeHandle) -> Option<NavigationChange> {
        let target = self.scene.node(handle)?.on_click?;
        let change = self.stack.push(target);
        self.render();
        Some(change)
    }

    /// Clicks the clickable node labelled `label` in the current frame.
    pub fn click_label(&mut self, label: &str) -> Result<NavigationChange, NavigatorError> {
        let level = self.level();
        let handle = self
            .scene
            .find_node(label)
            .filter(|x| self.scene.node(*x).is_some_and(|x| x.is_clickable()));
        handle
            .and_then(|x| self.click_node(x))
            .ok_or_else(|| NavigatorError::UnknownNode {
                label: label.to_string(),
                level,
            })
    }

    /// Clicks each label in turn, starting from the current frame.
    pub fn navigate_labels<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<(), NavigatorError> {
        for label in labels {
            self.click_label(label.as_ref())?;
        }
        Ok(())
    }

    /// Pops one frame. A no-op at the root.
    pub fn back(&mut self) -> Option<NavigationChange> {
        let frame = self.stack.pop()?;
        self.render();
        Some(NavigationChange::Popped(frame.level()))
    }

    /// Returns to the root frame.
    pub fn home(&mut self) {
        if self.stack.can_go_back() {
            self.stack.reset();
            self.render();
        }
    }

    pub fn apply_input(&mut self, input: InputConfig) {
        log::info!("Input changed {} -> {}", self.input, input);
        self.input = input;
        self.shapes = compute_shapes(&self.input, self.options.depth);
        self.retarget_stack();
        self.render();
    }

    /// Parses the four form fields (N, C, H, W) and applies them. On error
    /// the previous input stays in effect.
    pub fn apply_form(&mut self, fields: &[&str; 4]) -> Result<(), InputConfigError> {
        let input = InputConfig::parse_fields(fields).inspect_err(|err| {
            log::warn!("Rejected input form: {err}");
        })?;
        self.apply_input(input);
        Ok(())
    }

    /// Restores the configured default input.
    pub fn reset_input(&mut self) {
        self.apply_input(self.options.input);
    }

    /// Switches network depth. The stack goes back to the root since stage
    /// block counts differ between depths.
    pub fn set_depth(&mut self, depth: ResNetDepth) {
        if depth == self.options.depth {
            return;
        }
        log::info!("Depth changed {} -> {}", self.options.depth, depth);
        self.options.depth = depth;
        self.stack.reset();
        self.render();
    }

    pub fn resize(&mut self, surface: SurfaceSize) -> Result<(), NavigatorError> {
        surface.validate()?;
        if surface != self.options.surface {
            self.options.surface = surface;
            self.render();
        }
        Ok(())
    }

    pub fn pan(&mut self, screen_delta: Vec2) {
        self.camera.pan(screen_delta);
    }

    pub fn zoom_about(&mut self, screen_point: Pos2, factor: f32) {
        self.camera.zoom_about(
            screen_point,
            factor,
            self.options.min_zoom,
            self.options.max_zoom,
        );
    }

    pub fn hover(&self, screen_pos: Pos2) -> Option<HitTarget> {
        self.scene.hit_test(self.camera.to_world(screen_pos))
    }

    pub fn tooltip_at(&self, screen_pos: Pos2) -> Option<&str> {
        self.scene.tooltip(self.hover(screen_pos)?)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn top(&self) -> &NavigationFrame {
        self.stack.top()
    }

    pub fn level(&self) -> Level {
        self.stack.top().level()
    }

    pub fn breadcrumb(&self) -> String {
        self.stack.breadcrumb()
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.can_go_back()
    }

    pub fn show_formula_panel(&self) -> bool {
        self.stack.show_formula_panel()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn shape_table(&self) -> &ShapeTable {
        &self.shapes
    }

    pub fn input(&self) -> InputConfig {
        self.input
    }

    pub fn options(&self) -> &NavigatorOptions {
        &self.options
    }

    pub fn surface(&self) -> SurfaceSize {
        self.options.surface
    }

    pub fn snapshot(&self) -> NavigatorSnapshot {
        NavigatorSnapshot {
            depth: self.options.depth,
            level: self.level(),
            breadcrumb: self.breadcrumb(),
            can_go_back: self.can_go_back(),
            show_formula_panel: self.show_formula_panel(),
            input: self.input,
            stack: self.stack.clone(),
            shapes: self.shapes.clone(),
            code: self.code.clone(),
            camera: self.camera,
            scene: self.scene.clone(),
        }
    }

    /// Frames below the top carry shapes from the old input. Rebuild them
    /// against the new shape table, truncating at the first frame whose
    /// target no longer exists.
    fn retarget_stack(&mut self) {
        let frames = self.stack.frames().to_vec();
        let mut stack = NavigationStack::new();
        for frame in frames.iter().skip(1) {
            match retarget(frame.payload(), &self.shapes, self.options.depth) {
                Some(payload) => {
                    stack.push(payload);
                }
                None => {
                    log::warn!("Dropping {} frame after input change", frame.level());
                    break;
                }
            }
        }
        self.stack = stack;
    }
}
