use crate::config::InputConfig;
use serde::{Deserialize, Serialize};

pub const STEM_CHANNELS: u64 = 64;
pub const STAGE_CHANNELS: [u64; 4] = [256, 512, 1024, 2048];
pub const STAGE_DOWNSAMPLE: [u64; 4] = [1, 2, 4, 8];
pub const NUM_CLASSES: u64 = 1000;
pub const STEM_KERNEL: u64 = 7;
pub const BOTTLENECK_EXPANSION: u64 = 4;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ResNetDepth {
    #[default]
    ResNet50,
    ResNet101,
    ResNet152,
}

impl ResNetDepth {
    pub fn block_counts(&self) -> [u64; 4] {
        match self {
            ResNetDepth::ResNet50 => [3, 4, 6, 3],
            ResNetDepth::ResNet101 => [3, 4, 23, 3],
            ResNetDepth::ResNet152 => [3, 8, 36, 3],
        }
    }
}

/// Static description of one of the four bottleneck stages (1-based index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpec {
    pub index: usize,
    pub blocks: u64,
    pub in_channels: u64,
    pub mid_channels: u64,
    pub out_channels: u64,
    pub downsample: u64,
    pub stride: u64,
}

impl StageSpec {
    /// Input channels seen by the given block (1-based).
    pub fn block_in_channels(&self, block: u64) -> u64 {
        if block <= 1 {
            self.in_channels
        } else {
            self.out_channels
        }
    }

    pub fn parameters(&self) -> u64 {
        (1..=self.blocks)
            .map(|block| {
                bottleneck_params(self.block_in_channels(block), self.out_channels, block == 1)
            })
            .sum()
    }
}

/// Returns the spec of stage `index` (1..=4), or `None` out of range.
pub fn stage_spec(depth: ResNetDepth, index: usize) -> Option<StageSpec> {
    if (1..=4).contains(&index) {
        Some(spec_at(depth, index - 1))
    } else {
        None
    }
}

// `i` is 0-based and must be < 4
fn spec_at(depth: ResNetDepth, i: usize) -> StageSpec {
    let out_channels = STAGE_CHANNELS[i];
    StageSpec {
        index: i + 1,
        blocks: depth.block_counts()[i],
        in_channels: if i == 0 {
            STEM_CHANNELS
        } else {
            STAGE_CHANNELS[i - 1]
        },
        mid_channels: out_channels / BOTTLENECK_EXPANSION,
        out_channels,
        downsample: STAGE_DOWNSAMPLE[i],
        stride: if i == 0 { 1 } else { 2 },
    }
}

pub fn conv_params(kernel: u64, in_channels: u64, out_channels: u64) -> u64 {
    kernel * kernel * in_channels * out_channels
}

/// Conv weights of one bottleneck block: 1x1 reduce, 3x3, 1x1 expand, plus
/// the 1x1 projection shortcut on the first block of a stage.
pub fn bottleneck_params(in_channels: u64, out_channels: u64, projection: bool) -> u64 {
    let mid = out_channels / BOTTLENECK_EXPANSION;
    let mut total =
        conv_params(1, in_channels, mid) + conv_params(3, mid, mid) + conv_params(1, mid, out_channels);
    if projection {
        total += conv_params(1, in_channels, out_channels);
    }
    total
}

/// `[1, 64, 112, 112]` style rendering used by tooltips and the shape table.
pub fn format_shape(shape: &[u64]) -> String {
    let joined = shape
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

pub fn halve(value: u64) -> u64 {
    (value / 2).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeEntry {
    pub name: String,
    pub shape: Vec<u64>,
    pub scale: String,
    pub parameters: u64,
}

impl ShapeEntry {
    fn new(name: impl Into<String>, shape: Vec<u64>, scale: String, parameters: u64) -> Self {
        Self {
            name: name.into(),
            shape,
            scale,
            parameters,
        }
    }

    pub fn spatial(&self) -> Option<(u64, u64)> {
        if self.shape.len() == 4 {
            Some((self.shape[2], self.shape[3]))
        } else {
            None
        }
    }

    pub fn channels(&self) -> u64 {
        self.shape.get(1).copied().unwrap_or(0)
    }

    pub fn format_shape(&self) -> String {
        format_shape(&self.shape)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeTable {
    pub input: ShapeEntry,
    pub conv1: ShapeEntry,
    pub pool: ShapeEntry,
    pub stages: [ShapeEntry; 4],
    pub avgpool: ShapeEntry,
    pub flatten: ShapeEntry,
    pub fc: ShapeEntry,
    pub pred: ShapeEntry,
}

impl ShapeTable {
    /// Rows in display order, top to bottom of the side panel.
    pub fn rows(&self) -> impl Iterator<Item = &ShapeEntry> {
        [&self.input, &self.conv1, &self.pool]
            .into_iter()
            .chain(self.stages.iter())
            .chain([&self.avgpool, &self.flatten, &self.fc, &self.pred])
    }

    /// `index` is 1-based.
    pub fn stage(&self, index: usize) -> Option<&ShapeEntry> {
        index.checked_sub(1).and_then(|i| self.stages.get(i))
    }

    pub fn total_parameters(&self) -> u64 {
        self.rows().map(|x| x.parameters).sum()
    }
}

fn scale_label(input_h: u64, current_h: u64) -> String {
    format!("{:.1}×", input_h as f64 / current_h as f64)
}

pub fn compute_shapes(input: &InputConfig, depth: ResNetDepth) -> ShapeTable {
    let (n, c, h, w) = (input.n(), input.c(), input.h(), input.w());

    let conv1_hw = (halve(h), halve(w));
    let pool_hw = (halve(conv1_hw.0), halve(conv1_hw.1));

    let stages = std::array::from_fn(|i| {
        let spec = spec_at(depth, i);
        let sh = (pool_hw.0 / spec.downsample).max(1);
        let sw = (pool_hw.1 / spec.downsample).max(1);
        ShapeEntry::new(
            format!("stage{}", i + 1),
            vec![n, spec.out_channels, sh, sw],
            scale_label(h, sh),
            spec.parameters(),
        )
    });

    let final_channels = STAGE_CHANNELS[3];
    ShapeTable {
        input: ShapeEntry::new("input", vec![n, c, h, w], scale_label(h, h), 0),
        conv1: ShapeEntry::new(
            "conv1",
            vec![n, STEM_CHANNELS, conv1_hw.0, conv1_hw.1],
            scale_label(h, conv1_hw.0),
            conv_params(STEM_KERNEL, c, STEM_CHANNELS),
        ),
        pool: ShapeEntry::new(
            "pool",
            vec![n, STEM_CHANNELS, pool_hw.0, pool_hw.1],
            scale_label(h, pool_hw.0),
            0,
        ),
        stages,
        avgpool: ShapeEntry::new(
            "avgpool",
            vec![n, final_channels, 1, 1],
            scale_label(h, 1),
            0,
        ),
        flatten: ShapeEntry::new("flatten", vec![n, final_channels], "-".to_string(), 0),
        fc: ShapeEntry::new(
            "fc",
            vec![n, NUM_CLASSES],
            "-".to_string(),
            final_channels * NUM_CLASSES + NUM_CLASSES,
        ),
        pred: ShapeEntry::new("pred", vec![n, NUM_CLASSES], "-".to_string(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottleneck_params_first_block_of_stage1() {
        // 64*64 + 9*64*64 + 64*256 + 64*256
        assert_eq!(bottleneck_params(64, 256, true), 73728);
        assert_eq!(bottleneck_params(256, 256, false), 69632);
    }

    #[test]
    fn test_stage_spec_out_of_range() {
        assert!(stage_spec(ResNetDepth::ResNet50, 0).is_none());
        assert!(stage_spec(ResNetDepth::ResNet50, 5).is_none());
    }

    #[test]
    fn test_format_shape_matches_table_rows() {
        assert_eq!(format_shape(&[1, 64, 112, 112]), "[1, 64, 112, 112]");
        assert_eq!(format_shape(&[]), "[]");
        let table = compute_shapes(&InputConfig::default(), ResNetDepth::ResNet50);
        for row in table.rows() {
            assert_eq!(row.format_shape(), format_shape(&row.shape));
        }
    }
}
