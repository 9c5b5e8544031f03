use crate::config::MorphConfig;
use crate::error::{MorphError, MorphResult};
use crate::primitive::Shape;
use crate::{Couple, Float};

/// Rescales `shape` so the longer side of its bounding box equals
/// `target_size`, then centers it in a `canvas_size` square.
pub fn normalize(shape: &Shape, canvas_size: Float, target_size: Float) -> MorphResult<Shape> {
    let (min, max) = shape.bounds();
    let size = max - min;
    if size.x == 0.0 && size.y == 0.0 {
        return Err(MorphError::DegenerateShape);
    }

    let scale = target_size / size.x.max(size.y);
    let offset = Couple::new(
        0.5 * canvas_size - 0.5 * (min.x + max.x) * scale,
        0.5 * canvas_size - 0.5 * (min.y + max.y) * scale,
    );
    log::debug!(
        "normalizing {} segments: scale {}, offset ({}, {})",
        shape.len(),
        scale,
        offset.x,
        offset.y
    );

    Ok(shape.scaled_translated(scale, offset))
}

pub fn normalize_with(shape: &Shape, config: &MorphConfig) -> MorphResult<Shape> {
    normalize(shape, config.canvas_size, config.target_size)
}
