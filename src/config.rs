use crate::error::{MorphError, MorphResult};
use crate::Float;

use serde::{Deserialize, Serialize};

/// How two shapes are brought to the same number of segments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleStrategy {
    /// Both shapes become `resample_resolution` lines placed at equal
    /// arc-length steps. Curve identity is lost, counts always match.
    #[default]
    ArcLength,
    /// The shape with fewer segments has each of them split evenly.
    /// Overshoot past the other shape's count is dropped.
    SegmentCount,
}

/// Precision of blended stroke widths.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthPrecision {
    /// Rounded to the nearest whole unit, halves away from zero.
    #[default]
    Integer,
    Exact,
}

/// Largest accepted `frame_count`: frame indices and the frame total must
/// fit the 32-bit fields of the binary frame record.
pub const MAX_FRAME_COUNT: usize = u32::MAX as usize - 1;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    /// Lines per shape under [`ResampleStrategy::ArcLength`].
    pub resample_resolution: usize,
    /// Number of steps between the two shapes; `frame_count + 1` frames are produced.
    pub frame_count: usize,
    /// Side of the square canvas shapes are centered in.
    pub canvas_size: Float,
    /// Length the longer side of each shape's bounding box is scaled to.
    pub target_size: Float,
    /// Skip normalization and morph shapes in their own coordinates.
    pub normalize: bool,
    pub strategy: ResampleStrategy,
    pub width_precision: WidthPrecision,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            resample_resolution: 100,
            frame_count: 100,
            canvas_size: 500.0,
            target_size: 400.0,
            normalize: true,
            strategy: ResampleStrategy::ArcLength,
            width_precision: WidthPrecision::Integer,
        }
    }
}

impl MorphConfig {
    pub fn validate(&self) -> MorphResult<()> {
        let invalid = |reason| Err(MorphError::InvalidConfig { reason });

        if self.frame_count == 0 {
            return invalid("frame_count must be at least 1");
        }
        if self.frame_count > MAX_FRAME_COUNT {
            return invalid("frame_count must fit in 32 bits");
        }
        if self.strategy == ResampleStrategy::ArcLength && self.resample_resolution == 0 {
            return invalid("resample_resolution must be at least 1");
        }
        if self.normalize {
            if !(self.canvas_size.is_finite() && self.canvas_size > 0.0) {
                return invalid("canvas_size must be positive and finite");
            }
            if !(self.target_size.is_finite() && self.target_size > 0.0) {
                return invalid("target_size must be positive and finite");
            }
        }
        Ok(())
    }
}
