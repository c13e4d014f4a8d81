use serde::{Deserialize, Serialize};

pub const BREADCRUMB_SEPARATOR: &str = " › ";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
pub enum Level {
    Model,
    Backbone,
    Stage,
    Residual,
    Fx,
    ConvBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    /// `index` is 1-based, matching the labels drawn on the backbone.
    Stage { index: usize, block_count: u64 },
    Head,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageTarget {
    pub kind: StageKind,
    pub channels: u64,
    pub height: u64,
    pub width: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockTarget {
    pub stage: usize,
    /// 1-based block index within the stage.
    pub block: u64,
    pub in_channels: u64,
    pub in_height: u64,
    pub in_width: u64,
    pub channels: u64,
    pub height: u64,
    pub width: u64,
}

impl BlockTarget {
    pub fn has_projection(&self) -> bool {
        self.block == 1
    }

    /// Stride of the block's 3x3 conv; only the first block of a stage
    /// downsamples.
    pub fn stride(&self) -> u64 {
        if self.block == 1 && self.stage > 1 { 2 } else { 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConvTarget {
    pub stage: usize,
    pub block: u64,
    /// 1-based position of the conv inside F(x).
    pub position: usize,
    pub kernel: u64,
    pub in_channels: u64,
    pub in_height: u64,
    pub in_width: u64,
    pub out_channels: u64,
    pub stride: u64,
    pub height: u64,
    pub width: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelPayload {
    Model,
    Backbone,
    Stage(StageTarget),
    Residual(BlockTarget),
    Fx(BlockTarget),
    ConvBlock(ConvTarget),
}

impl LevelPayload {
    pub fn level(&self) -> Level {
        match self {
            LevelPayload::Model => Level::Model,
            LevelPayload::Backbone => Level::Backbone,
            LevelPayload::Stage(_) => Level::Stage,
            LevelPayload::Residual(_) => Level::Residual,
            LevelPayload::Fx(_) => Level::Fx,
            LevelPayload::ConvBlock(_) => Level::ConvBlock,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationFrame {
    payload: LevelPayload,
}

impl NavigationFrame {
    pub fn new(payload: LevelPayload) -> Self {
        Self { payload }
    }

    pub fn level(&self) -> Level {
        self.payload.level()
    }

    pub fn payload(&self) -> &LevelPayload {
        &self.payload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationChange {
    Pushed(Level),
    Popped(Level),
}

/// Drill-down history. The bottom frame is always `Model` and is never popped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationStack {
    frames: Vec<NavigationFrame>,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationStack {
    pub fn new() -> Self {
        Self {
            frames: vec![NavigationFrame::new(LevelPayload::Model)],
        }
    }

    pub fn push(&mut self, payload: LevelPayload) -> NavigationChange {
        let level = payload.level();
        log::debug!("Navigation push {} (depth {})", level, self.frames.len() + 1);
        self.frames.push(NavigationFrame::new(payload));
        NavigationChange::Pushed(level)
    }

    /// Removes the top frame. Returns `None` and leaves the stack untouched
    /// when only the root frame remains.
    pub fn pop(&mut self) -> Option<NavigationFrame> {
        if self.frames.len() <= 1 {
            return None;
        }
        let frame = self.frames.pop();
        if let Some(frame) = &frame {
            log::debug!("Navigation pop {} (depth {})", frame.level(), self.frames.len());
        }
        frame
    }

    pub fn top(&self) -> &NavigationFrame {
        // frames is never empty
        &self.frames[self.frames.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[NavigationFrame] {
        &self.frames
    }

    pub fn levels(&self) -> Vec<Level> {
        self.frames.iter().map(|x| x.level()).collect()
    }

    pub fn can_go_back(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn breadcrumb(&self) -> String {
        self.frames
            .iter()
            .map(|x| x.level().to_string())
            .collect::<Vec<_>>()
            .join(BREADCRUMB_SEPARATOR)
    }

    pub fn show_formula_panel(&self) -> bool {
        self.top().level() == Level::Residual
    }

    pub fn reset(&mut self) {
        self.frames.truncate(1);
    }
}
