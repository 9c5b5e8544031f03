//! Index-for-index pairing of segments.

use crate::error::{MorphError, MorphResult};
use crate::primitive::{
    Arc, CubicCurve, Line, QuadraticCurve, Segment, SegmentKind, Shape, Stroker, StyledSegment,
};

use alloc::vec::Vec;

/// Two segments of the same variant, ready to be blended.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PairGeometry {
    Arc(Arc, Arc),
    CubicCurve(CubicCurve, CubicCurve),
    QuadraticCurve(QuadraticCurve, QuadraticCurve),
    Line(Line, Line),
}

impl PairGeometry {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Arc(..) => SegmentKind::Arc,
            Self::CubicCurve(..) => SegmentKind::CubicCurve,
            Self::QuadraticCurve(..) => SegmentKind::QuadraticCurve,
            Self::Line(..) => SegmentKind::Line,
        }
    }

    pub fn from_segment(&self) -> Segment {
        match *self {
            Self::Arc(a, _) => Segment::Arc(a),
            Self::CubicCurve(a, _) => Segment::CubicCurve(a),
            Self::QuadraticCurve(a, _) => Segment::QuadraticCurve(a),
            Self::Line(a, _) => Segment::Line(a),
        }
    }

    pub fn to_segment(&self) -> Segment {
        match *self {
            Self::Arc(_, b) => Segment::Arc(b),
            Self::CubicCurve(_, b) => Segment::CubicCurve(b),
            Self::QuadraticCurve(_, b) => Segment::QuadraticCurve(b),
            Self::Line(_, b) => Segment::Line(b),
        }
    }
}

/// A matched pair of styled segments. Construction promotes the lower
/// arity segment when needed, so the geometry always has equal arity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SegmentPair {
    pub(crate) geometry: PairGeometry,
    pub(crate) from: Stroker,
    pub(crate) to: Stroker,
}

impl SegmentPair {
    /// `index` is only used to report which pair failed.
    pub fn new(index: usize, from: &StyledSegment, to: &StyledSegment) -> MorphResult<Self> {
        let unsupported = || MorphError::UnsupportedSegmentPair {
            index,
            from: from.segment.kind(),
            to: to.segment.kind(),
        };

        let (a, b) = promote_pair(&from.segment, &to.segment).ok_or_else(unsupported)?;
        let geometry = match (a, b) {
            (Segment::Arc(a), Segment::Arc(b)) => PairGeometry::Arc(a, b),
            (Segment::CubicCurve(a), Segment::CubicCurve(b)) => PairGeometry::CubicCurve(a, b),
            (Segment::QuadraticCurve(a), Segment::QuadraticCurve(b)) => {
                PairGeometry::QuadraticCurve(a, b)
            }
            (Segment::Line(a), Segment::Line(b)) => PairGeometry::Line(a, b),
            _ => return Err(unsupported()),
        };

        Ok(Self {
            geometry,
            from: from.stroker,
            to: to.stroker,
        })
    }

    pub fn kind(&self) -> SegmentKind {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &PairGeometry {
        &self.geometry
    }

    /// Source side, after promotion.
    pub fn source(&self) -> StyledSegment {
        StyledSegment::new(self.geometry.from_segment(), self.from)
    }

    /// Target side, after promotion.
    pub fn target(&self) -> StyledSegment {
        StyledSegment::new(self.geometry.to_segment(), self.to)
    }
}

/// Brings two segments to a common variant: the lower one in the
/// Line < QuadraticCurve < CubicCurve chain is promoted to the higher one.
/// Returns `None` when no promotion connects the two variants.
pub fn promote_pair(a: &Segment, b: &Segment) -> Option<(Segment, Segment)> {
    let (ka, kb) = (a.kind(), b.kind());
    if ka == kb {
        return Some((*a, *b));
    }

    let (ra, rb) = (ka.promotion_rank()?, kb.promotion_rank()?);
    match ra < rb {
        true => Some((a.promote(kb)?, *b)),
        false => Some((*a, b.promote(ka)?)),
    }
}

/// Segment pairs of two shapes, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedShapes {
    pairs: Vec<SegmentPair>,
}

impl MatchedShapes {
    pub fn pairs(&self) -> &[SegmentPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Always `false`: matching two shapes yields at least one pair.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The source shape as it enters blending (promoted, truncated).
    pub fn source(&self) -> Shape {
        Shape::from_non_empty(self.pairs.iter().map(SegmentPair::source).collect())
    }

    /// The target shape as it enters blending (promoted, truncated).
    pub fn target(&self) -> Shape {
        Shape::from_non_empty(self.pairs.iter().map(SegmentPair::target).collect())
    }
}

/// Pairs segment `i` of `a` with segment `i` of `b`.
///
/// When counts differ only the common prefix is matched and the rest of the
/// longer shape is dropped. A pair with no promotion rule fails the whole match.
pub fn match_segments(a: &Shape, b: &Shape) -> MorphResult<MatchedShapes> {
    if a.len() != b.len() {
        let kept = a.len().min(b.len());
        log::warn!("matching {} against {} segments, keeping the first {}", a.len(), b.len(), kept);
    }

    let pairs = a
        .iter()
        .zip(b.iter())
        .enumerate()
        .map(|(i, (from, to))| SegmentPair::new(i, from, to))
        .collect::<MorphResult<Vec<_>>>()?;

    log::debug!("matched {} segment pairs", pairs.len());
    Ok(MatchedShapes { pairs })
}
