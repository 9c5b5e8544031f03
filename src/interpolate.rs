//! Blending matched segments at an interpolation factor `t` in `[0, 1]`.
//!
//! Geometry is the affine combination `(1 - t) * a + t * b` of every control
//! point in lockstep, so `t = 0` and `t = 1` reproduce the endpoints exactly.
//! Factors outside `[0, 1]` extrapolate; callers clamp.

use crate::color::blend_color;
use crate::config::WidthPrecision;
use crate::error::MorphResult;
use crate::matching::{MatchedShapes, PairGeometry, SegmentPair};
use crate::primitive::{
    Arc, CubicCurve, Line, QuadraticCurve, Segment, Shape, Stroker, StyledSegment,
};
use crate::{Couple, Float};

#[allow(unused_imports)]
use vek::num_traits::real::Real;

pub fn lerp(a: Couple, b: Couple, t: Float) -> Couple {
    a * (1.0 - t) + b * t
}

fn lerp_points<const N: usize>(a: &[Couple; N], b: &[Couple; N], t: Float) -> [Couple; N] {
    core::array::from_fn(|i| lerp(a[i], b[i], t))
}

/// Stroke width blend. Equal widths and the two endpoints are passed
/// through untouched; anything else is rounded per `precision`.
pub fn blend_width(a: Float, b: Float, t: Float, precision: WidthPrecision) -> Float {
    if a == b || t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }

    let width = (1.0 - t) * a + t * b;
    match precision {
        WidthPrecision::Integer => width.round(),
        WidthPrecision::Exact => width,
    }
}

pub fn blend_stroker(a: &Stroker, b: &Stroker, t: Float, precision: WidthPrecision) -> Stroker {
    Stroker::new(blend_color(a.color, b.color, t), blend_width(a.width, b.width, t, precision))
}

impl PairGeometry {
    pub fn blend(&self, t: Float) -> Segment {
        match self {
            Self::Arc(a, b) => Segment::Arc(Arc {
                points: lerp_points(&a.points, &b.points, t),
            }),
            Self::CubicCurve(a, b) => Segment::CubicCurve(CubicCurve {
                points: lerp_points(&a.points, &b.points, t),
            }),
            Self::QuadraticCurve(a, b) => Segment::QuadraticCurve(QuadraticCurve {
                points: lerp_points(&a.points, &b.points, t),
            }),
            Self::Line(a, b) => Segment::Line(Line {
                points: lerp_points(&a.points, &b.points, t),
            }),
        }
    }
}

impl SegmentPair {
    pub fn blend(&self, t: Float, precision: WidthPrecision) -> StyledSegment {
        let stroker = blend_stroker(&self.from, &self.to, t, precision);
        StyledSegment::new(self.geometry.blend(t), stroker)
    }
}

/// Blends two styled segments, promoting the lower arity one first.
pub fn blend(
    a: &StyledSegment,
    b: &StyledSegment,
    t: Float,
    precision: WidthPrecision,
) -> MorphResult<StyledSegment> {
    Ok(SegmentPair::new(0, a, b)?.blend(t, precision))
}

/// The in-between shape of a matched pair of shapes at `t`.
pub fn blend_shapes(matched: &MatchedShapes, t: Float, precision: WidthPrecision) -> Shape {
    Shape::from_non_empty(matched.pairs().iter().map(|pair| pair.blend(t, precision)).collect())
}
