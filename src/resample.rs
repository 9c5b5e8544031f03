//! Bringing two shapes to comparable segment counts.

use crate::config::{MorphConfig, ResampleStrategy};
use crate::error::{MorphError, MorphResult, Side};
use crate::primitive::{locate, Segment, Shape, StyledSegment};
use crate::Float;

use alloc::vec::Vec;

/// Splits every segment of `shape` into `parts` pieces along its own
/// parametrization. Styles are copied onto each piece.
pub fn subdivide(shape: &Shape, parts: usize) -> Shape {
    let mut segments = Vec::with_capacity(shape.len() * parts.max(1));
    for styled in shape {
        for piece in styled.segment.subdivide(parts) {
            segments.push(StyledSegment::new(piece, styled.stroker));
        }
    }
    Shape::from_non_empty(segments)
}

/// Subdivides the shape with fewer segments by `ceil(max / min)`.
///
/// The subdivided count can exceed the other shape's count; the two results
/// then differ in length and matching keeps only the common prefix.
pub fn equalize_segment_counts(a: &Shape, b: &Shape) -> (Shape, Shape) {
    let (na, nb) = (a.len(), b.len());
    if na == nb {
        return (a.clone(), b.clone());
    }

    let (few, many) = (na.min(nb), na.max(nb));
    let parts = many.div_ceil(few);
    log::debug!(
        "equalizing segment counts {} / {}: splitting each of {} segments in {}",
        na,
        nb,
        few,
        parts
    );

    if few * parts > many {
        log::warn!(
            "segment count overshoot: {} segments for {}, the last {} will be dropped",
            few * parts,
            many,
            few * parts - many
        );
    }

    match na < nb {
        true => (subdivide(a, parts), b.clone()),
        false => (a.clone(), subdivide(b, parts)),
    }
}

/// Rebuilds `shape` as `resolution` lines joining `resolution + 1` points
/// taken at equal arc-length fractions. Each line keeps the style of the
/// input segment under its midpoint.
pub fn resample_arc_length(shape: &Shape, resolution: usize) -> MorphResult<Shape> {
    if resolution == 0 {
        return Err(MorphError::InvalidConfig {
            reason: "resample_resolution must be at least 1",
        });
    }

    let lengths = shape.segment_lengths();
    let total: Float = lengths.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(MorphError::ResampleFailed);
    }

    let segments = shape.segments();
    let k = resolution as Float;
    let points: Vec<_> = (0..=resolution)
        .map(|i| {
            let (index, fraction) = locate(&lengths, i as Float / k);
            let segment = &segments[index].segment;
            segment.evaluate(segment.parameter_at_length(fraction))
        })
        .collect();

    let lines = points
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let (index, _) = locate(&lengths, (i as Float + 0.5) / k);
            StyledSegment::new(Segment::line(w[0], w[1]), segments[index].stroker)
        })
        .collect();

    log::debug!("resampled {} segments ({} long) into {} lines", shape.len(), total, resolution);
    Ok(Shape::from_non_empty(lines))
}

/// Applies the configured strategy to both shapes.
pub fn resample_pair(a: &Shape, b: &Shape, config: &MorphConfig) -> MorphResult<(Shape, Shape)> {
    match config.strategy {
        ResampleStrategy::ArcLength => {
            let k = config.resample_resolution;
            let a = resample_arc_length(a, k).map_err(|e| e.on(Side::Source))?;
            let b = resample_arc_length(b, k).map_err(|e| e.on(Side::Target))?;
            Ok((a, b))
        }
        ResampleStrategy::SegmentCount => Ok(equalize_segment_counts(a, b)),
    }
}
