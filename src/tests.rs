use crate::color::{blend_color, parse_color, parse_hex, to_hex};
use crate::config::{ResampleStrategy, WidthPrecision};
use crate::error::Side;
use crate::format::{serialize, ParsingError, SerializedFrame};
use crate::interpolate::{blend, blend_shapes, blend_width};
use crate::matching::{match_segments, promote_pair};
use crate::normalize::normalize;
use crate::output::{frame_name, write_frames, BinaryEncoder, MemoryWriter, SvgEncoder, WriteError};
use crate::resample::{equalize_segment_counts, resample_arc_length};
use crate::*;

use core::f32::consts::{FRAC_PI_2, PI, TAU};
use pretty_assertions::assert_eq;
use rgb::RGB8;

fn c(x: Float, y: Float) -> Couple {
    Couple::new(x, y)
}

fn close(a: Couple, b: Couple, eps: Float) -> bool {
    (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps
}

fn black() -> Stroker {
    Stroker::default()
}

fn unit_square() -> Shape {
    Shape::polygon(&[c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)], black()).unwrap()
}

fn tripled_square() -> Shape {
    Shape::polygon(&[c(-1.0, -1.0), c(2.0, -1.0), c(2.0, 2.0), c(-1.0, 2.0)], black()).unwrap()
}

fn starts(shape: &Shape) -> Vec<Couple> {
    shape.iter().map(|s| s.segment.start()).collect()
}

fn raw_config() -> MorphConfig {
    MorphConfig {
        frame_count: 10,
        normalize: false,
        ..MorphConfig::default()
    }
}

#[test]
fn segment_arity_is_checked() {
    let points = [c(0.0, 0.0), c(1.0, 1.0), c(2.0, 0.0)];
    assert_eq!(
        Segment::new(SegmentKind::Line, &points),
        Err(MorphError::InvalidArity {
            kind: SegmentKind::Line,
            expected: 2,
            found: 3,
        })
    );
    assert_eq!(
        Segment::new(SegmentKind::QuadraticCurve, &points),
        Ok(Segment::quadratic(points[0], points[1], points[2]))
    );
    assert!(Segment::new(SegmentKind::CubicCurve, &points).is_err());
    assert!(Segment::new(SegmentKind::Arc, &points).is_ok());
}

#[test]
fn empty_shape_is_rejected() {
    assert_eq!(Shape::new(Vec::new()), Err(MorphError::EmptyShape));
    assert_eq!(Shape::polyline(&[c(1.0, 1.0)], black()), Err(MorphError::EmptyShape));
}

#[test]
fn segment_lengths() {
    assert_eq!(Segment::line(c(0.0, 0.0), c(3.0, 4.0)).arc_length(), 5.0);

    let straight = Segment::cubic(c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0));
    assert!((straight.arc_length() - 3.0).abs() < 1e-3);

    let circle = Segment::arc(c(5.0, 5.0), c(10.0, 10.0), c(0.0, TAU));
    assert!((circle.arc_length() - TAU * 10.0).abs() < 1e-2);

    let quarter = Segment::arc(c(0.0, 0.0), c(2.0, 2.0), c(0.0, FRAC_PI_2));
    assert!((quarter.arc_length() - PI).abs() < 1e-3);

    // a quarter circle as a cubic, r = 1
    let k = 0.552_284_8;
    let bezier_quarter = Segment::cubic(c(1.0, 0.0), c(1.0, k), c(k, 1.0), c(0.0, 1.0));
    assert!((bezier_quarter.arc_length() - FRAC_PI_2).abs() < 1e-2);
}

#[test]
fn evaluation_hits_endpoints() {
    let curve = Segment::quadratic(c(0.0, 0.0), c(1.0, 2.0), c(2.0, 0.0));
    assert!(close(curve.evaluate(0.0), c(0.0, 0.0), 1e-6));
    assert!(close(curve.evaluate(1.0), c(2.0, 0.0), 1e-6));
    assert!(close(curve.evaluate(0.5), c(1.0, 1.0), 1e-6));

    let arc = Segment::arc(c(0.0, 0.0), c(1.0, 2.0), c(0.0, PI));
    assert!(close(arc.start(), c(1.0, 0.0), 1e-6));
    assert!(close(arc.evaluate(0.5), c(0.0, 2.0), 1e-5));
    assert!(close(arc.end(), c(-1.0, 0.0), 1e-5));
}

#[test]
fn inverse_arc_length_on_symmetric_curve() {
    let curve = Segment::quadratic(c(0.0, 0.0), c(1.0, 2.0), c(2.0, 0.0));
    assert!((curve.parameter_at_length(0.5) - 0.5).abs() < 2e-3);
    assert_eq!(curve.parameter_at_length(0.0), 0.0);
    assert_eq!(curve.parameter_at_length(1.0), 1.0);

    let line = Segment::line(c(0.0, 0.0), c(10.0, 0.0));
    assert_eq!(line.parameter_at_length(0.3), 0.3);
}

#[test]
fn split_and_subdivide_keep_variant_and_continuity() {
    let curve = Segment::cubic(c(0.0, 0.0), c(1.0, 3.0), c(3.0, 3.0), c(4.0, 0.0));
    let [left, right] = curve.split(0.25);
    assert_eq!(left.kind(), SegmentKind::CubicCurve);
    assert!(close(left.end(), curve.evaluate(0.25), 1e-5));
    assert!(close(right.start(), curve.evaluate(0.25), 1e-5));
    assert!(close(right.evaluate(0.5), curve.evaluate(0.625), 1e-4));

    let pieces = curve.subdivide(4);
    assert_eq!(pieces.len(), 4);
    for (i, piece) in pieces.iter().enumerate() {
        assert_eq!(piece.kind(), SegmentKind::CubicCurve);
        assert!(close(piece.start(), curve.evaluate(i as Float / 4.0), 1e-4));
    }
    assert!(close(pieces[3].end(), c(4.0, 0.0), 1e-5));

    let arc = Segment::arc(c(0.0, 0.0), c(1.0, 1.0), c(0.0, PI));
    let halves = arc.subdivide(2);
    assert_eq!(halves[0], Segment::arc(c(0.0, 0.0), c(1.0, 1.0), c(0.0, FRAC_PI_2)));
}

#[test]
fn bounds_are_tight() {
    let curve = Segment::quadratic(c(0.0, 0.0), c(1.0, 2.0), c(2.0, 0.0));
    let (min, max) = curve.bounds();
    assert!(close(min, c(0.0, 0.0), 1e-6));
    assert!(close(max, c(2.0, 1.0), 1e-5));

    let circle = Shape::circle(c(5.0, 5.0), 2.0, black());
    let (min, max) = circle.bounds();
    assert!(close(min, c(3.0, 3.0), 1e-5));
    assert!(close(max, c(7.0, 7.0), 1e-5));

    let cubic = Segment::cubic(c(0.0, 0.0), c(0.0, 4.0), c(4.0, 4.0), c(4.0, 0.0));
    let (_, max) = cubic.bounds();
    assert!((max.y - 3.0).abs() < 1e-5);
}

#[test]
fn bounds_of_a_many_turn_arc() {
    let spin = Segment::arc(c(0.0, 0.0), c(1.0, -2.0), c(0.0, 3e7));
    let spinning = Shape::uniform([spin], black()).unwrap();
    assert_eq!(spinning.bounds(), (c(-1.0, -2.0), c(1.0, 2.0)));

    let fitted = normalize(&spinning, 500.0, 400.0).unwrap();
    let (min, max) = fitted.bounds();
    assert!(close(min, c(150.0, 50.0), 1e-3));
    assert!(close(max, c(350.0, 450.0), 1e-3));

    let far = Segment::arc(c(0.0, 0.0), c(1.0, 1.0), c(3e7, 3e7 + 1.0));
    let (min, max) = far.bounds();
    assert!(min.x >= -1.0 && max.x <= 1.0 && min.y >= -1.0 && max.y <= 1.0);
}

#[test]
fn shape_point_at_follows_arc_length() {
    let square = unit_square();
    assert!((square.arc_length() - 4.0).abs() < 1e-6);
    assert!(close(square.point_at(0.0), c(0.0, 0.0), 1e-6));
    assert!(close(square.point_at(0.125), c(0.5, 0.0), 1e-6));
    assert!(close(square.point_at(0.5), c(1.0, 1.0), 1e-6));
    assert!(close(square.point_at(1.0), c(0.0, 0.0), 1e-6));
}

#[test]
fn shape_builders() {
    let octagon = Shape::regular_polygon(c(100.0, 100.0), 50.0, 8, black()).unwrap();
    assert_eq!(octagon.len(), 8);
    assert!(close(octagon.segments()[0].segment.start(), c(150.0, 100.0), 1e-4));
    assert!(close(octagon.segments()[7].segment.end(), c(150.0, 100.0), 1e-4));

    let open = Shape::polyline(&[c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)], black()).unwrap();
    assert_eq!(open.len(), 2);

    let ellipse = Shape::ellipse(c(0.0, 0.0), c(2.0, 1.0), black());
    assert_eq!(ellipse.segments()[0].segment.kind(), SegmentKind::Arc);
}

#[test]
fn normalize_fits_and_centers() {
    let square = normalize(&unit_square(), 500.0, 400.0).unwrap();
    let (min, max) = square.bounds();
    assert!(close(min, c(50.0, 50.0), 1e-3));
    assert!(close(max, c(450.0, 450.0), 1e-3));
    assert_eq!(square.len(), 4);

    let line = Shape::polyline(&[c(0.0, 0.0), c(2.0, 0.0)], black()).unwrap();
    let line = normalize(&line, 500.0, 400.0).unwrap();
    let (min, max) = line.bounds();
    assert!(close(min, c(50.0, 250.0), 1e-3));
    assert!(close(max, c(450.0, 250.0), 1e-3));

    let circle = normalize(&Shape::circle(c(-7.0, 3.0), 1.0, black()), 500.0, 400.0).unwrap();
    match circle.segments()[0].segment {
        Segment::Arc(arc) => {
            assert!(close(arc.center(), c(250.0, 250.0), 1e-3));
            assert!(close(arc.radii(), c(200.0, 200.0), 1e-3));
            assert_eq!(arc.angular_range(), c(0.0, TAU));
        }
        other => panic!("unexpected segment {:?}", other),
    }
}

#[test]
fn normalize_rejects_a_single_point() {
    let dot = Shape::polyline(&[c(3.0, 3.0), c(3.0, 3.0)], black()).unwrap();
    assert_eq!(normalize(&dot, 500.0, 400.0), Err(MorphError::DegenerateShape));
}

#[test]
fn segment_count_equalization() {
    let a = Shape::polyline(&[c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)], black()).unwrap();
    let b = Shape::polyline(&[c(0.0, 0.0), c(4.0, 0.0)], black()).unwrap();

    let (a2, b2) = equalize_segment_counts(&a, &b);
    assert_eq!(a2, a);
    assert_eq!(b2.len(), 2);
    assert_eq!(starts(&b2), vec![c(0.0, 0.0), c(2.0, 0.0)]);
    assert_eq!(b2.segments()[1].segment.end(), c(4.0, 0.0));
}

#[test]
fn segment_count_overshoot_keeps_common_prefix() {
    let points = [c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0)];
    let a = Shape::polyline(&points, black()).unwrap();
    let b = Shape::polyline(&[c(0.0, 1.0), c(2.0, 1.0), c(4.0, 1.0)], black()).unwrap();

    let (a2, b2) = equalize_segment_counts(&a, &b);
    assert_eq!(a2.len(), 3);
    assert_eq!(b2.len(), 4);

    let matched = match_segments(&a2, &b2).unwrap();
    assert_eq!(matched.len(), 3);
    assert_eq!(matched.target().segments()[2].segment, Segment::line(c(2.0, 1.0), c(3.0, 1.0)));
}

#[test]
fn arc_length_resampling() {
    let circle = Shape::circle(c(0.0, 0.0), 100.0, black());
    let lines = resample_arc_length(&circle, 200).unwrap();
    assert_eq!(lines.len(), 200);
    for pair in lines.segments().windows(2) {
        assert_eq!(pair[0].segment.kind(), SegmentKind::Line);
        assert_eq!(pair[0].segment.end(), pair[1].segment.start());
    }

    let exact = TAU * 100.0;
    assert!((lines.arc_length() - exact).abs() / exact < 0.01);
}

#[test]
fn resampling_is_idempotent() {
    let once = resample_arc_length(&unit_square(), 100).unwrap();
    let twice = resample_arc_length(&once, 100).unwrap();
    assert_eq!(twice.len(), once.len());
    for (a, b) in once.iter().zip(twice.iter()) {
        assert!(close(a.segment.start(), b.segment.start(), 1e-4));
        assert!(close(a.segment.end(), b.segment.end(), 1e-4));
    }
}

#[test]
fn resampling_keeps_segment_styles() {
    let red = Stroker::new(RGB8::new(255, 0, 0), 3.0);
    let shape = Shape::new(vec![
        StyledSegment::new(Segment::line(c(0.0, 0.0), c(1.0, 0.0)), black()),
        StyledSegment::new(Segment::line(c(1.0, 0.0), c(2.0, 0.0)), red),
    ])
    .unwrap();

    let lines = resample_arc_length(&shape, 4).unwrap();
    let strokers: Vec<_> = lines.iter().map(|s| s.stroker).collect();
    assert_eq!(strokers, vec![black(), black(), red, red]);
}

#[test]
fn zero_length_shape_cannot_be_resampled() {
    let dot = Shape::polyline(&[c(1.0, 1.0), c(1.0, 1.0)], black()).unwrap();
    assert_eq!(resample_arc_length(&dot, 10), Err(MorphError::ResampleFailed));
}

#[test]
fn promotion_rules() {
    let line = Segment::line(c(0.0, 0.0), c(3.0, 0.0));
    let cubic = Segment::cubic(c(0.0, 0.0), c(1.0, 1.0), c(2.0, 1.0), c(3.0, 0.0));
    let (a, b) = promote_pair(&line, &cubic).unwrap();
    assert_eq!(a, Segment::cubic(c(0.0, 0.0), c(0.0, 0.0), c(3.0, 0.0), c(3.0, 0.0)));
    assert_eq!(b, cubic);

    let quad = Segment::quadratic(c(0.0, 0.0), c(1.0, 2.0), c(2.0, 0.0));
    let (elevated, _) = promote_pair(&quad, &cubic).unwrap();
    assert_eq!(elevated.kind(), SegmentKind::CubicCurve);
    for u in [0.1, 0.5, 0.9] {
        assert!(close(elevated.evaluate(u), quad.evaluate(u), 1e-5));
    }

    let (_, promoted) = promote_pair(&quad, &line).unwrap();
    assert_eq!(promoted, Segment::quadratic(c(0.0, 0.0), c(0.0, 0.0), c(3.0, 0.0)));

    let arc = Segment::arc(c(0.0, 0.0), c(1.0, 1.0), c(0.0, PI));
    assert_eq!(promote_pair(&arc, &line), None);
    assert_eq!(promote_pair(&quad, &arc), None);
}

#[test]
fn unsupported_pair_fails_the_match() {
    let circle = Shape::circle(c(0.0, 0.0), 1.0, black());
    let line = Shape::polyline(&[c(0.0, 0.0), c(1.0, 0.0)], black()).unwrap();
    assert_eq!(
        match_segments(&circle, &line),
        Err(MorphError::UnsupportedSegmentPair {
            index: 0,
            from: SegmentKind::Arc,
            to: SegmentKind::Line,
        })
    );
}

#[test]
fn horizontal_lines_blend_to_the_midpoint() {
    let a = StyledSegment::new(Segment::line(c(0.0, 0.0), c(2.0, 0.0)), black());
    let b = StyledSegment::new(Segment::line(c(0.0, 0.0), c(4.0, 0.0)), black());
    let mid = blend(&a, &b, 0.5, WidthPrecision::Integer).unwrap();
    assert_eq!(mid.segment, Segment::line(c(0.0, 0.0), c(3.0, 0.0)));

    assert_eq!(blend(&a, &b, 0.0, WidthPrecision::Integer).unwrap(), a);
    assert_eq!(blend(&a, &b, 1.0, WidthPrecision::Integer).unwrap(), b);
}

#[test]
fn square_blends_toward_its_tripled_counterpart() {
    let matched = match_segments(&unit_square(), &tripled_square()).unwrap();
    let mid = blend_shapes(&matched, 0.5, WidthPrecision::Integer);
    assert_eq!(
        starts(&mid),
        vec![c(-0.5, -0.5), c(1.5, -0.5), c(1.5, 1.5), c(-0.5, 1.5)]
    );
}

#[test]
fn arcs_blend_component_wise() {
    let small = Segment::arc(c(100.0, 100.0), c(10.0, 10.0), c(0.0, TAU));
    let big = Segment::arc(c(300.0, 100.0), c(50.0, 30.0), c(0.0, TAU));
    let (small, big) = (StyledSegment::new(small, black()), StyledSegment::new(big, black()));
    let mid = blend(&small, &big, 0.5, WidthPrecision::Exact).unwrap();
    assert_eq!(mid.segment, Segment::arc(c(200.0, 100.0), c(30.0, 20.0), c(0.0, TAU)));
}

#[test]
fn color_blend() {
    let black = RGB8::new(0, 0, 0);
    let white = RGB8::new(255, 255, 255);
    let mid = blend_color(black, white, 0.5);
    assert_eq!(mid, RGB8::new(0x7F, 0x7F, 0x7F));
    assert_eq!(to_hex(mid), "#7F7F7F");
    assert_eq!(blend_color(black, white, 0.0), black);
    assert_eq!(blend_color(black, white, 1.0), white);
}

#[test]
fn color_blend_is_symmetric() {
    let pairs = [
        (RGB8::new(0, 0, 0), RGB8::new(255, 255, 255)),
        (RGB8::new(12, 200, 77), RGB8::new(255, 3, 140)),
        (RGB8::new(1, 2, 3), RGB8::new(250, 128, 0)),
        (RGB8::new(10, 77, 3), RGB8::new(200, 1, 254)),
    ];
    let steps = 100_000;
    for (c1, c2) in pairs {
        for i in 0..=steps {
            let t = i as Float / steps as Float;
            assert_eq!(blend_color(c1, c2, t), blend_color(c2, c1, 1.0 - t), "t = {}", t);
        }
    }
}

#[test]
fn width_blend() {
    assert_eq!(blend_width(1.0, 4.0, 0.5, WidthPrecision::Integer), 3.0);
    assert_eq!(blend_width(1.0, 4.0, 0.5, WidthPrecision::Exact), 2.5);
    assert_eq!(blend_width(1.5, 4.0, 0.0, WidthPrecision::Integer), 1.5);
    assert_eq!(blend_width(1.5, 4.5, 1.0, WidthPrecision::Integer), 4.5);
    assert_eq!(blend_width(2.5, 2.5, 0.3, WidthPrecision::Integer), 2.5);
}

#[test]
fn color_parsing() {
    assert_eq!(parse_hex("#fff"), Some(RGB8::new(255, 255, 255)));
    assert_eq!(parse_hex("00ff7F"), Some(RGB8::new(0, 255, 127)));
    assert_eq!(parse_hex("#12345"), None);
    assert_eq!(parse_hex("#gg0000"), None);
    assert_eq!(parse_color("Red"), Some(RGB8::new(255, 0, 0)));
    assert_eq!(parse_color("lightgray"), Some(RGB8::new(0xD3, 0xD3, 0xD3)));
    assert_eq!(parse_color("no-such-color"), None);
}

#[test]
fn every_css_color_keyword_resolves() {
    assert_eq!(parse_color("darkgreen"), Some(RGB8::new(0, 100, 0)));
    assert_eq!(parse_color("SteelBlue"), Some(RGB8::new(70, 130, 180)));
    assert_eq!(parse_color("crimson"), Some(RGB8::new(220, 20, 60)));
    assert_eq!(parse_color("lightgoldenrodyellow"), Some(RGB8::new(250, 250, 210)));
}

#[test]
fn sequence_yields_every_step() {
    let morph = Morph::new(&unit_square(), &tripled_square(), raw_config()).unwrap();
    assert_eq!(morph.len(), 11);

    let frames: Vec<_> = morph.frames().collect();
    assert_eq!(frames.len(), 11);
    assert_eq!(morph.frames().len(), 11);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.index, i);
    }
    for pair in frames.windows(2) {
        assert!(pair[0].t < pair[1].t);
    }
    assert_eq!(frames[0].t, 0.0);
    assert_eq!(frames[10].t, 1.0);
}

#[test]
fn endpoint_frames_are_exact() {
    let red = Stroker::new(RGB8::new(255, 0, 0), 1.5);
    let source = Shape::regular_polygon(c(0.0, 0.0), 10.0, 3, red).unwrap();
    let target = Shape::circle(c(40.0, 20.0), 5.0, Stroker::new(RGB8::new(0, 0, 255), 4.0));
    let morph = Morph::new(&source, &target, MorphConfig::default()).unwrap();

    let mut frames = morph.frames();
    assert_eq!(frames.next().unwrap().shape, morph.source());
    assert_eq!(frames.next_back().unwrap().shape, morph.target());
    assert_eq!(frames.len(), 99);
}

#[test]
fn blended_geometry_stays_between_endpoints() {
    let circle = Shape::circle(c(3.0, 3.0), 2.0, black());
    let morph = Morph::new(&unit_square(), &circle, raw_config()).unwrap();
    let pairs = morph.matched().pairs();
    for frame in morph.frames() {
        for (styled, pair) in frame.shape.iter().zip(pairs) {
            let from = pair.source().segment;
            let to = pair.target().segment;
            let points = styled.segment.control_points();
            for (i, p) in points.iter().enumerate() {
                let (a, b) = (from.control_points()[i], to.control_points()[i]);
                assert!(p.x >= a.x.min(b.x) - 1e-4 && p.x <= a.x.max(b.x) + 1e-4);
                assert!(p.y >= a.y.min(b.y) - 1e-4 && p.y <= a.y.max(b.y) + 1e-4);
            }
        }
    }
}

#[test]
fn sequence_is_restartable_and_indexable() {
    let morph = Morph::new(&unit_square(), &tripled_square(), raw_config()).unwrap();
    let first: Vec<_> = morph.frames().collect();
    let second: Vec<_> = morph.frames().collect();
    assert_eq!(first, second);

    let backwards: Vec<_> = morph.frames().rev().map(|f| f.index).collect();
    assert_eq!(backwards, (0..=10).rev().collect::<Vec<_>>());

    assert_eq!(morph.frame(5), Some(first[5].clone()));
    assert_eq!(morph.frame(11), None);
}

#[test]
fn frame_count_is_capped() {
    let largest = MorphConfig {
        frame_count: config::MAX_FRAME_COUNT,
        ..MorphConfig::default()
    };
    assert!(largest.validate().is_ok());

    for frame_count in [config::MAX_FRAME_COUNT + 1, usize::MAX] {
        let too_many = MorphConfig {
            frame_count,
            ..MorphConfig::default()
        };
        assert!(matches!(too_many.validate(), Err(MorphError::InvalidConfig { .. })));
    }

    let morph = Morph::new(&unit_square(), &tripled_square(), raw_config()).unwrap();
    let mut frames = FrameSequence::new(morph.matched(), usize::MAX, WidthPrecision::Integer);
    assert_eq!(frames.len(), config::MAX_FRAME_COUNT + 1);
    let last = frames.next_back().unwrap();
    assert_eq!(last.index, config::MAX_FRAME_COUNT);
    assert_eq!(last.shape, morph.target());
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_frames_match_sequential_ones() {
    use rayon::prelude::*;

    let circle = Shape::circle(c(3.0, 3.0), 2.0, black());
    let morph = Morph::new(&unit_square(), &circle, raw_config()).unwrap();
    assert_eq!(morph.par_frames().len(), 11);
    let parallel: Vec<Frame> = morph.par_frames().collect();
    let sequential: Vec<Frame> = morph.frames().collect();
    assert_eq!(parallel, sequential);
}

#[test]
fn segment_count_strategy_morph() {
    let config = MorphConfig {
        strategy: ResampleStrategy::SegmentCount,
        frame_count: 2,
        ..raw_config()
    };
    let a = Shape::polyline(&[c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)], black()).unwrap();
    let b = Shape::polyline(&[c(0.0, 0.0), c(4.0, 0.0)], black()).unwrap();
    let morph = Morph::new(&a, &b, config).unwrap();

    let mid = morph.frame(1).unwrap();
    assert_eq!(mid.t, 0.5);
    assert_eq!(
        mid.shape.iter().map(|s| s.segment).collect::<Vec<_>>(),
        vec![Segment::line(c(0.0, 0.0), c(1.5, 0.0)), Segment::line(c(1.5, 0.0), c(3.0, 0.0))]
    );
}

#[test]
fn morph_errors_name_the_shape() {
    let dot = Shape::polyline(&[c(3.0, 3.0), c(3.0, 3.0)], black()).unwrap();

    let err = Morph::new(&dot, &unit_square(), MorphConfig::default()).unwrap_err();
    assert!(matches!(err, MorphError::Shape { side: Side::Source, .. }));
    assert_eq!(err.root(), &MorphError::DegenerateShape);
    assert!(err.to_string().starts_with("source shape:"));

    let err = Morph::new(&unit_square(), &dot, raw_config()).unwrap_err();
    assert!(matches!(err, MorphError::Shape { side: Side::Target, .. }));
    assert_eq!(err.root(), &MorphError::ResampleFailed);
}

#[test]
fn config_defaults_and_validation() {
    let json = r#"{ "frame_count": 10, "strategy": "segment_count" }"#;
    let config: MorphConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.frame_count, 10);
    assert_eq!(config.strategy, ResampleStrategy::SegmentCount);
    assert_eq!(config.resample_resolution, 100);
    assert_eq!(config.canvas_size, 500.0);
    assert_eq!(config.target_size, 400.0);
    assert!(config.validate().is_ok());

    let zero = MorphConfig {
        frame_count: 0,
        ..MorphConfig::default()
    };
    assert!(matches!(zero.validate(), Err(MorphError::InvalidConfig { .. })));
    assert!(Morph::new(&unit_square(), &tripled_square(), zero).is_err());

    let negative = MorphConfig {
        target_size: -1.0,
        ..MorphConfig::default()
    };
    assert!(negative.validate().is_err());
}

#[test]
fn binary_frames_round_trip() {
    let orange = Stroker::new(RGB8::new(255, 165, 0), 2.5);
    let shape = Shape::new(vec![
        StyledSegment::new(Segment::line(c(0.0, 0.0), c(1.0, 0.5)), black()),
        StyledSegment::new(Segment::quadratic(c(1.0, 0.5), c(2.0, 3.0), c(3.0, 0.0)), orange),
        StyledSegment::new(
            Segment::cubic(c(3.0, 0.0), c(4.0, 1.0), c(5.0, -1.0), c(6.0, 0.0)),
            black(),
        ),
        StyledSegment::new(Segment::arc(c(6.0, 0.0), c(1.0, 2.0), c(0.0, PI)), orange),
        StyledSegment::new(Segment::line(c(0.0, 0.0), c(1.0, 0.5)), black()),
    ])
    .unwrap();
    let frame = Frame {
        index: 42,
        t: 0.42,
        shape,
    };

    let bytes = serialize(&frame).unwrap();
    let serialized = SerializedFrame::new(&bytes[..]).unwrap();
    assert_eq!(serialized.index(), 42);
    assert_eq!(serialized.t(), 0.42);
    assert_eq!(serialized.steps(), 5);
    assert_eq!(serialized.strokers(), 2);
    assert_eq!(serialized.to_frame().unwrap(), frame);
}

#[test]
fn binary_frames_reject_bad_input() {
    let frame = Frame {
        index: 0,
        t: 0.0,
        shape: unit_square(),
    };
    let bytes = serialize(&frame).unwrap();

    assert_eq!(SerializedFrame::new(&b"RWY0"[..]).err(), Some(ParsingError::NotAFrameFile));
    assert_eq!(SerializedFrame::new(&bytes[..bytes.len() - 1]).err(), Some(ParsingError::TooShort));

    let mut longer = bytes.clone();
    longer.push(0);
    assert_eq!(SerializedFrame::new(&longer[..]).err(), Some(ParsingError::ExcessBytes));

    let serialized = SerializedFrame::new(&bytes[..]).unwrap();
    assert_eq!(serialized.step(4).err(), Some(ParsingError::InvalidIndex));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn oversized_frame_index_is_not_truncated() {
    let frame = Frame {
        index: u32::MAX as usize + 1,
        t: 1.0,
        shape: unit_square(),
    };
    assert_eq!(serialize(&frame), Err(ParsingError::Overflow));

    let mut writer = MemoryWriter::new();
    let result = write_frames([frame], "big", &BinaryEncoder, &mut writer);
    assert!(matches!(
        result,
        Err(WriteError::Encode {
            index,
            error: ParsingError::Overflow,
        }) if index == u32::MAX as usize + 1
    ));
    assert!(writer.is_empty());
}

#[test]
fn svg_output() {
    let grey = Stroker::new(RGB8::new(0x7F, 0x7F, 0x7F), 2.0);
    let shape = Shape::new(vec![
        StyledSegment::new(Segment::line(c(0.0, 0.0), c(3.0, 0.0)), grey),
        StyledSegment::new(
            Segment::cubic(c(3.0, 0.0), c(4.0, 1.0), c(5.0, 1.0), c(6.0, 0.0)),
            grey,
        ),
    ])
    .unwrap();

    let svg = svg::encode(&shape, 200.0);
    assert!(svg.starts_with(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"200\" height=\"200\">"
    ));
    assert!(svg.contains(
        "<line x1=\"0\" y1=\"0\" x2=\"3\" y2=\"0\" stroke=\"#7F7F7F\" stroke-width=\"2\" />"
    ));
    assert!(svg.contains("d=\"M 3 0 C 4 1 5 1 6 0\""));
    assert!(svg.trim_end().ends_with("</svg>"));

    let circle = svg::encode(&Shape::circle(c(10.0, 10.0), 5.0, grey), 20.0);
    assert_eq!(circle.matches(" A 5 5 0 0 1 ").count(), 2);
}

#[test]
fn frames_are_written_by_name() {
    let config = MorphConfig {
        frame_count: 3,
        ..raw_config()
    };
    let morph = Morph::new(&unit_square(), &tripled_square(), config).unwrap();

    let mut writer = MemoryWriter::new();
    let encoder = SvgEncoder { canvas_size: 500.0 };
    let written = write_frames(morph.frames(), "frame", &encoder, &mut writer).unwrap();
    assert_eq!(written, 4);
    assert_eq!(
        writer.names().collect::<Vec<_>>(),
        vec!["frame_000.svg", "frame_001.svg", "frame_002.svg", "frame_003.svg"]
    );

    let mut binary = MemoryWriter::new();
    write_frames(morph.frames(), "tc2", &BinaryEncoder, &mut binary).unwrap();
    let last = SerializedFrame::new(binary.get("tc2_003.mph").unwrap()).unwrap();
    assert_eq!(last.to_frame().unwrap().shape, morph.target());

    assert_eq!(frame_name("morph", 7, "svg"), "morph_007.svg");
}

#[cfg(feature = "std")]
#[test]
fn directory_writer_skips_or_overwrites_existing_files() {
    use crate::output::{DirectoryWriter, FrameWriter};
    use std::fs;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("frames");
    let kept = root.join("frame_000.svg");

    let mut writer = DirectoryWriter::new(&root).skip_existing(true);
    writer.write("frame_000.svg", b"first").unwrap();
    assert_eq!(fs::read(&kept).unwrap(), b"first");

    writer.write("frame_000.svg", b"second").unwrap();
    assert_eq!(fs::read(&kept).unwrap(), b"first");

    let mut writer = DirectoryWriter::new(&root).skip_existing(false);
    writer.write("frame_000.svg", b"second").unwrap();
    assert_eq!(fs::read(&kept).unwrap(), b"second");

    let config = MorphConfig {
        frame_count: 2,
        ..raw_config()
    };
    let morph = Morph::new(&unit_square(), &tripled_square(), config).unwrap();
    let encoder = SvgEncoder { canvas_size: 500.0 };
    let written = write_frames(morph.frames(), "frame", &encoder, &mut writer).unwrap();
    assert_eq!(written, 3);
    assert!(root.join("frame_002.svg").exists());
    assert_ne!(fs::read(&kept).unwrap(), b"second");
}
