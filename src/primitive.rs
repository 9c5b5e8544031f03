//! Segments, strokes and shapes.
//!
//! Every segment variant stores a fixed-size array of couples, so blending and
//! affine transforms can walk control points in lockstep. An [`Arc`] is not a
//! Bezier: its three couples are `[center, radii, angular_range]`, with the
//! angular range holding the start and end angles in radians.

use crate::error::{MorphError, MorphResult};
use crate::{Couple, Float, C_ZERO};

use vek::bezier::{CubicBezier2, QuadraticBezier2};

#[allow(unused_imports)]
use vek::num_traits::real::Real;

use rgb::RGB8;

use alloc::{vec, vec::Vec};
use core::f32::consts::{FRAC_PI_2, TAU};
use core::fmt;

/// Tolerance used by [`Segment::arc_length`] when subdividing curves.
pub const ARC_LENGTH_ACCURACY: Float = 1e-3;

const MAX_SUBDIVISION_DEPTH: u32 = 16;
const INVERSE_LENGTH_ITERATIONS: u32 = 24;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Arc,
    CubicCurve,
    QuadraticCurve,
    Line,
}

/// Codec order: a kind's position here is its `as_u32` value.
pub const SEGMENT_KINDS: [SegmentKind; 4] = [
    SegmentKind::Arc,
    SegmentKind::CubicCurve,
    SegmentKind::QuadraticCurve,
    SegmentKind::Line,
];

impl SegmentKind {
    pub fn arity(self) -> usize {
        match self {
            SegmentKind::Arc => 3,
            SegmentKind::CubicCurve => 4,
            SegmentKind::QuadraticCurve => 3,
            SegmentKind::Line => 2,
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            SegmentKind::Arc => 0,
            SegmentKind::CubicCurve => 1,
            SegmentKind::QuadraticCurve => 2,
            SegmentKind::Line => 3,
        }
    }

    pub fn as_text(self) -> &'static str {
        match self {
            SegmentKind::Arc => "Arc",
            SegmentKind::CubicCurve => "CubicCurve",
            SegmentKind::QuadraticCurve => "QuadraticCurve",
            SegmentKind::Line => "Line",
        }
    }

    /// Position in the Line < QuadraticCurve < CubicCurve promotion chain.
    /// Arcs sit outside of it.
    pub(crate) fn promotion_rank(self) -> Option<u8> {
        match self {
            SegmentKind::Line => Some(0),
            SegmentKind::QuadraticCurve => Some(1),
            SegmentKind::CubicCurve => Some(2),
            SegmentKind::Arc => None,
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Line {
    pub points: [Couple; 2],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadraticCurve {
    pub points: [Couple; 3],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubicCurve {
    pub points: [Couple; 4],
}

/// Axis-aligned elliptical arc: `center + (rx * cos(a), ry * sin(a))`
/// for `a` going from `angular_range.x` to `angular_range.y`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Arc {
    pub points: [Couple; 3],
}

impl Arc {
    pub fn new(center: Couple, radii: Couple, angular_range: Couple) -> Self {
        Self {
            points: [center, radii, angular_range],
        }
    }

    pub fn center(&self) -> Couple {
        self.points[0]
    }

    pub fn radii(&self) -> Couple {
        self.points[1]
    }

    pub fn angular_range(&self) -> Couple {
        self.points[2]
    }

    pub fn sweep(&self) -> Float {
        self.angular_range().y - self.angular_range().x
    }

    fn angle_at(&self, u: Float) -> Float {
        let range = self.angular_range();
        range.x + (range.y - range.x) * u
    }

    fn point_at_angle(&self, angle: Float) -> Couple {
        let (sin, cos) = angle.sin_cos();
        let radii = self.radii();
        self.center() + Couple::new(radii.x * cos, radii.y * sin)
    }

    fn speed_at_angle(&self, angle: Float) -> Float {
        let (sin, cos) = angle.sin_cos();
        let radii = self.radii();
        Couple::new(radii.x * sin, radii.y * cos).magnitude()
    }

    fn length(&self, accuracy: Float) -> Float {
        let range = self.angular_range();
        let (a, b) = (range.x.min(range.y), range.x.max(range.y));
        adaptive_simpson(&|angle| self.speed_at_angle(angle), a, b, accuracy, MAX_SUBDIVISION_DEPTH)
    }

    fn sub_arc(&self, u0: Float, u1: Float) -> Self {
        Self::new(self.center(), self.radii(), Couple::new(self.angle_at(u0), self.angle_at(u1)))
    }

    fn bounds(&self) -> (Couple, Couple) {
        let range = self.angular_range();
        let (lo, hi) = (range.x.min(range.y), range.x.max(range.y));
        if hi - lo >= TAU {
            let radii = self.radii().map(|r| r.abs());
            return (self.center() - radii, self.center() + radii);
        }

        let mut extent = Extent::new(self.point_at_angle(range.x));
        extent.include(self.point_at_angle(range.y));

        // axis extremes sit on multiples of a quarter turn; less than a
        // full turn holds at most four of them
        let first = (lo / FRAC_PI_2).ceil();
        for k in 0..4u8 {
            let angle = (first + k as Float) * FRAC_PI_2;
            if angle >= hi {
                break;
            }
            extent.include(self.point_at_angle(angle));
        }
        extent.into_pair()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Segment {
    Arc(Arc),
    CubicCurve(CubicCurve),
    QuadraticCurve(QuadraticCurve),
    Line(Line),
}

impl Segment {
    /// Builds a segment of `kind` from an explicit control point list.
    pub fn new(kind: SegmentKind, points: &[Couple]) -> MorphResult<Self> {
        if points.len() != kind.arity() {
            return Err(MorphError::InvalidArity {
                kind,
                expected: kind.arity(),
                found: points.len(),
            });
        }

        Ok(match kind {
            SegmentKind::Arc => Self::arc(points[0], points[1], points[2]),
            SegmentKind::CubicCurve => Self::cubic(points[0], points[1], points[2], points[3]),
            SegmentKind::QuadraticCurve => Self::quadratic(points[0], points[1], points[2]),
            SegmentKind::Line => Self::line(points[0], points[1]),
        })
    }

    pub fn line(a: Couple, b: Couple) -> Self {
        Self::Line(Line { points: [a, b] })
    }

    pub fn quadratic(start: Couple, ctrl: Couple, end: Couple) -> Self {
        Self::QuadraticCurve(QuadraticCurve {
            points: [start, ctrl, end],
        })
    }

    pub fn cubic(start: Couple, ctrl0: Couple, ctrl1: Couple, end: Couple) -> Self {
        Self::CubicCurve(CubicCurve {
            points: [start, ctrl0, ctrl1, end],
        })
    }

    pub fn arc(center: Couple, radii: Couple, angular_range: Couple) -> Self {
        Self::Arc(Arc::new(center, radii, angular_range))
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Arc(_) => SegmentKind::Arc,
            Self::CubicCurve(_) => SegmentKind::CubicCurve,
            Self::QuadraticCurve(_) => SegmentKind::QuadraticCurve,
            Self::Line(_) => SegmentKind::Line,
        }
    }

    pub fn control_points(&self) -> &[Couple] {
        match self {
            Self::Arc(arc) => &arc.points,
            Self::CubicCurve(curve) => &curve.points,
            Self::QuadraticCurve(curve) => &curve.points,
            Self::Line(line) => &line.points,
        }
    }

    pub fn start(&self) -> Couple {
        self.evaluate(0.0)
    }

    pub fn end(&self) -> Couple {
        self.evaluate(1.0)
    }

    /// Point at local parameter `u` (clamped to `[0, 1]`).
    pub fn evaluate(&self, u: Float) -> Couple {
        let u = u.clamp(0.0, 1.0);
        match self {
            Self::Arc(arc) => arc.point_at_angle(arc.angle_at(u)),
            Self::CubicCurve(curve) => {
                let [start, ctrl0, ctrl1, end] = curve.points;
                CubicBezier2 { start, ctrl0, ctrl1, end }.evaluate(u)
            }
            Self::QuadraticCurve(curve) => {
                let [start, ctrl, end] = curve.points;
                QuadraticBezier2 { start, ctrl, end }.evaluate(u)
            }
            Self::Line(line) => {
                let [a, b] = line.points;
                a * (1.0 - u) + b * u
            }
        }
    }

    pub fn arc_length(&self) -> Float {
        self.arc_length_with(ARC_LENGTH_ACCURACY)
    }

    /// Closed form for lines; curves are subdivided until each piece's
    /// control polygon is within `accuracy` of its chord.
    pub fn arc_length_with(&self, accuracy: Float) -> Float {
        match self {
            Self::Arc(arc) => arc.length(accuracy),
            Self::CubicCurve(curve) => bezier_length(&curve.points, accuracy, 0),
            Self::QuadraticCurve(curve) => bezier_length(&curve.points, accuracy, 0),
            Self::Line(line) => (line.points[1] - line.points[0]).magnitude(),
        }
    }

    /// Local parameter at which the traveled length reaches
    /// `fraction` of the segment's arc length.
    pub fn parameter_at_length(&self, fraction: Float) -> Float {
        let fraction = fraction.clamp(0.0, 1.0);
        if let Self::Line(_) = self {
            return fraction;
        }

        let total = self.arc_length();
        if total <= 0.0 || fraction == 0.0 || fraction == 1.0 {
            return fraction;
        }

        let target = fraction * total;
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..INVERSE_LENGTH_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            if self.split(mid)[0].arc_length() < target {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    /// Splits the segment at local parameter `u`; both halves keep the variant.
    pub fn split(&self, u: Float) -> [Segment; 2] {
        let u = u.clamp(0.0, 1.0);
        match self {
            Self::Arc(arc) => [Self::Arc(arc.sub_arc(0.0, u)), Self::Arc(arc.sub_arc(u, 1.0))],
            Self::CubicCurve(curve) => {
                let (left, right) = de_casteljau(&curve.points, u);
                [
                    Self::CubicCurve(CubicCurve { points: left }),
                    Self::CubicCurve(CubicCurve { points: right }),
                ]
            }
            Self::QuadraticCurve(curve) => {
                let (left, right) = de_casteljau(&curve.points, u);
                [
                    Self::QuadraticCurve(QuadraticCurve { points: left }),
                    Self::QuadraticCurve(QuadraticCurve { points: right }),
                ]
            }
            Self::Line(line) => {
                let [a, b] = line.points;
                let mid = self.evaluate(u);
                [Self::line(a, mid), Self::line(mid, b)]
            }
        }
    }

    /// Cuts the segment into `parts` pieces of equal parametric span.
    pub fn subdivide(&self, parts: usize) -> Vec<Segment> {
        if parts <= 1 {
            return vec![*self];
        }

        let mut pieces = Vec::with_capacity(parts);
        let mut rest = *self;
        for i in 0..parts - 1 {
            // rest covers [i / parts, 1] of self
            let remaining = (parts - i) as Float;
            let [piece, tail] = rest.split(1.0 / remaining);
            pieces.push(piece);
            rest = tail;
        }
        pieces.push(rest);

        // lines are re-derived from their own endpoints to avoid drift
        if let Self::Line(line) = self {
            let [a, b] = line.points;
            let n = parts as Float;
            for (i, piece) in pieces.iter_mut().enumerate() {
                let t1 = i as Float / n;
                let t2 = (i + 1) as Float / n;
                *piece = Self::line(a + (b - a) * t1, a + (b - a) * t2);
            }
        }

        pieces
    }

    /// Tight axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Couple, Couple) {
        match self {
            Self::Arc(arc) => arc.bounds(),
            Self::CubicCurve(curve) => {
                let [p0, p1, p2, p3] = curve.points;
                let mut extent = Extent::new(p0);
                extent.include(p3);
                let a = (p1 - p2) * 3.0 + p3 - p0;
                let b = (p0 - p1 * 2.0 + p2) * 2.0;
                let c = p1 - p0;
                let (rx, ry) = (quadratic_roots(a.x, b.x, c.x), quadratic_roots(a.y, b.y, c.y));
                let roots = rx.into_iter().chain(ry);
                for u in roots.flatten() {
                    if u > 0.0 && u < 1.0 {
                        extent.include(self.evaluate(u));
                    }
                }
                extent.into_pair()
            }
            Self::QuadraticCurve(curve) => {
                let [p0, p1, p2] = curve.points;
                let mut extent = Extent::new(p0);
                extent.include(p2);
                let den = p0 - p1 * 2.0 + p2;
                for (num, den) in [(p0.x - p1.x, den.x), (p0.y - p1.y, den.y)] {
                    if den != 0.0 {
                        let u = num / den;
                        if u > 0.0 && u < 1.0 {
                            extent.include(self.evaluate(u));
                        }
                    }
                }
                extent.into_pair()
            }
            Self::Line(line) => {
                let mut extent = Extent::new(line.points[0]);
                extent.include(line.points[1]);
                extent.into_pair()
            }
        }
    }

    /// Uniform scale about the origin followed by a translation.
    pub fn scaled_translated(&self, scale: Float, offset: Couple) -> Self {
        let map = |p: Couple| p * scale + offset;
        match self {
            Self::Arc(arc) => {
                Self::arc(map(arc.center()), arc.radii() * scale, arc.angular_range())
            }
            Self::CubicCurve(curve) => Self::CubicCurve(CubicCurve {
                points: curve.points.map(map),
            }),
            Self::QuadraticCurve(curve) => Self::QuadraticCurve(QuadraticCurve {
                points: curve.points.map(map),
            }),
            Self::Line(line) => Self::Line(Line {
                points: line.points.map(map),
            }),
        }
    }

    /// Re-expresses the segment as `kind` when `kind` is higher in the
    /// Line < QuadraticCurve < CubicCurve chain. Lines duplicate their
    /// endpoints; quadratics are degree-elevated, which keeps their geometry.
    pub fn promote(&self, kind: SegmentKind) -> Option<Segment> {
        if self.kind() == kind {
            return Some(*self);
        }

        match (self, kind) {
            (Self::Line(line), SegmentKind::QuadraticCurve) => {
                let [a, b] = line.points;
                Some(Self::quadratic(a, a, b))
            }
            (Self::Line(line), SegmentKind::CubicCurve) => {
                let [a, b] = line.points;
                Some(Self::cubic(a, a, b, b))
            }
            (Self::QuadraticCurve(curve), SegmentKind::CubicCurve) => {
                let [start, ctrl, end] = curve.points;
                let cubic = QuadraticBezier2 { start, ctrl, end }.into_cubic();
                Some(Self::cubic(cubic.start, cubic.ctrl0, cubic.ctrl1, cubic.end))
            }
            _ => None,
        }
    }
}

/// Stroke attributes attached to a segment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stroker {
    pub color: RGB8,
    pub width: Float,
}

impl Stroker {
    pub const fn new(color: RGB8, width: Float) -> Self {
        Self { color, width }
    }
}

impl Default for Stroker {
    fn default() -> Self {
        Self::new(RGB8::new(0, 0, 0), 1.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StyledSegment {
    pub segment: Segment,
    pub stroker: Stroker,
}

impl StyledSegment {
    pub fn new(segment: Segment, stroker: Stroker) -> Self {
        Self { segment, stroker }
    }
}

/// An ordered, non-empty sequence of styled segments.
///
/// Order defines which segment pairs with which during a morph; every
/// transform returns a new shape with that order preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    segments: Vec<StyledSegment>,
}

impl Shape {
    pub fn new(segments: Vec<StyledSegment>) -> MorphResult<Self> {
        match segments.is_empty() {
            true => Err(MorphError::EmptyShape),
            false => Ok(Self { segments }),
        }
    }

    /// Shape whose segments all share `stroker`.
    pub fn uniform<I>(segments: I, stroker: Stroker) -> MorphResult<Self>
    where
        I: IntoIterator<Item = Segment>,
    {
        Self::new(segments.into_iter().map(|s| StyledSegment::new(s, stroker)).collect())
    }

    /// Open chain of lines through `points`.
    pub fn polyline(points: &[Couple], stroker: Stroker) -> MorphResult<Self> {
        Self::uniform(points.windows(2).map(|w| Segment::line(w[0], w[1])), stroker)
    }

    /// Closed chain of lines through `points`, back to the first one.
    pub fn polygon(points: &[Couple], stroker: Stroker) -> MorphResult<Self> {
        if points.len() < 2 {
            return Err(MorphError::EmptyShape);
        }
        let closing = [points[points.len() - 1], points[0]];
        let edges = points.windows(2).chain(core::iter::once(&closing[..]));
        Self::uniform(edges.map(|w| Segment::line(w[0], w[1])), stroker)
    }

    /// Polygon with `sides` vertices on a circle, the first one at angle 0.
    pub fn regular_polygon(
        center: Couple,
        radius: Float,
        sides: usize,
        stroker: Stroker,
    ) -> MorphResult<Self> {
        let vertices: Vec<Couple> = (0..sides)
            .map(|i| {
                let (sin, cos) = (TAU * i as Float / sides as Float).sin_cos();
                center + Couple::new(cos, sin) * radius
            })
            .collect();
        Self::polygon(&vertices, stroker)
    }

    pub fn ellipse(center: Couple, radii: Couple, stroker: Stroker) -> Self {
        Self {
            segments: vec![StyledSegment::new(
                Segment::arc(center, radii, Couple::new(0.0, TAU)),
                stroker,
            )],
        }
    }

    pub fn circle(center: Couple, radius: Float, stroker: Stroker) -> Self {
        Self::ellipse(center, Couple::new(radius, radius), stroker)
    }

    pub fn segments(&self) -> &[StyledSegment] {
        &self.segments
    }

    pub fn iter(&self) -> core::slice::Iter<'_, StyledSegment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`: shapes cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn into_segments(self) -> Vec<StyledSegment> {
        self.segments
    }

    pub fn segment_lengths(&self) -> Vec<Float> {
        self.segments.iter().map(|s| s.segment.arc_length()).collect()
    }

    pub fn arc_length(&self) -> Float {
        self.segment_lengths().iter().sum()
    }

    /// Point at global position `s` in `[0, 1]`, measured along arc length.
    pub fn point_at(&self, s: Float) -> Couple {
        let lengths = self.segment_lengths();
        let (index, u) = locate(&lengths, s);
        self.segments[index].segment.evaluate(u)
    }

    pub fn bounds(&self) -> (Couple, Couple) {
        let (min, max) = self.segments[0].segment.bounds();
        let mut extent = Extent { min, max };
        for styled in &self.segments[1..] {
            let (min, max) = styled.segment.bounds();
            extent.include(min);
            extent.include(max);
        }
        extent.into_pair()
    }

    /// Applies [`Segment::scaled_translated`] to every segment.
    pub fn scaled_translated(&self, scale: Float, offset: Couple) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|s| StyledSegment::new(s.segment.scaled_translated(scale, offset), s.stroker))
                .collect(),
        }
    }

    pub(crate) fn from_non_empty(segments: Vec<StyledSegment>) -> Self {
        debug_assert!(!segments.is_empty());
        Self { segments }
    }
}

impl<'a> IntoIterator for &'a Shape {
    type Item = &'a StyledSegment;
    type IntoIter = core::slice::Iter<'a, StyledSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Finds the segment containing global position `s` given per-segment
/// lengths, and the local parameter inside it.
pub(crate) fn locate(lengths: &[Float], s: Float) -> (usize, Float) {
    let total: Float = lengths.iter().sum();
    if total <= 0.0 {
        return (0, 0.0);
    }

    let target = s.clamp(0.0, 1.0) * total;
    let mut traveled = 0.0;
    for (i, &length) in lengths.iter().enumerate() {
        if length > 0.0 && target <= traveled + length {
            return (i, ((target - traveled) / length).clamp(0.0, 1.0));
        }
        traveled += length;
    }

    // rounding left us past the last non-empty segment
    let last = lengths.iter().rposition(|l| *l > 0.0).unwrap_or(lengths.len() - 1);
    (last, 1.0)
}

struct Extent {
    min: Couple,
    max: Couple,
}

impl Extent {
    fn new(p: Couple) -> Self {
        Self { min: p, max: p }
    }

    fn include(&mut self, p: Couple) {
        self.min = Couple::new(self.min.x.min(p.x), self.min.y.min(p.y));
        self.max = Couple::new(self.max.x.max(p.x), self.max.y.max(p.y));
    }

    fn into_pair(self) -> (Couple, Couple) {
        (self.min, self.max)
    }
}

fn de_casteljau<const N: usize>(points: &[Couple; N], u: Float) -> ([Couple; N], [Couple; N]) {
    let mut work = *points;
    let mut left = [C_ZERO; N];
    let mut right = [C_ZERO; N];
    for level in 0..N {
        left[level] = work[0];
        right[N - 1 - level] = work[N - 1 - level];
        for i in 0..N - 1 - level {
            work[i] = work[i] * (1.0 - u) + work[i + 1] * u;
        }
    }
    (left, right)
}

fn bezier_length<const N: usize>(points: &[Couple; N], accuracy: Float, depth: u32) -> Float {
    let chord = (points[N - 1] - points[0]).magnitude();
    let polygon: Float = points.windows(2).map(|w| (w[1] - w[0]).magnitude()).sum();

    if polygon - chord <= accuracy || depth >= MAX_SUBDIVISION_DEPTH {
        // Gravesen's estimate for a degree N - 1 curve
        let degree = (N - 1) as Float;
        return (2.0 * chord + (degree - 1.0) * polygon) / (degree + 1.0);
    }

    let (left, right) = de_casteljau(points, 0.5);
    let half = 0.5 * accuracy;
    bezier_length(&left, half, depth + 1) + bezier_length(&right, half, depth + 1)
}

fn simpson<F: Fn(Float) -> Float>(f: &F, a: Float, b: Float) -> Float {
    (b - a) / 6.0 * (f(a) + 4.0 * f(0.5 * (a + b)) + f(b))
}

fn adaptive_simpson<F>(f: &F, a: Float, b: Float, accuracy: Float, depth: u32) -> Float
where
    F: Fn(Float) -> Float,
{
    if b <= a {
        return 0.0;
    }
    let mid = 0.5 * (a + b);
    let whole = simpson(f, a, b);
    let halves = simpson(f, a, mid) + simpson(f, mid, b);
    if depth == 0 || (halves - whole).abs() <= 15.0 * accuracy {
        return halves + (halves - whole) / 15.0;
    }
    let half = 0.5 * accuracy;
    adaptive_simpson(f, a, mid, half, depth - 1) + adaptive_simpson(f, mid, b, half, depth - 1)
}

/// Real roots of `a u^2 + b u + c`.
fn quadratic_roots(a: Float, b: Float, c: Float) -> [Option<Float>; 2] {
    if a.abs() < Float::EPSILON {
        return match b != 0.0 {
            true => [Some(-c / b), None],
            false => [None, None],
        };
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return [None, None];
    }
    let sq = disc.sqrt();
    [Some((-b + sq) / (2.0 * a)), Some((-b - sq) / (2.0 * a))]
}
