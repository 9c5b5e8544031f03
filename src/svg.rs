//! SVG text for a frame: one element per segment.

use crate::color::to_hex;
use crate::primitive::{Arc, Segment, Shape, StyledSegment};
use crate::{Couple, Float};

#[allow(unused_imports)]
use vek::num_traits::real::Real;

use alloc::string::String;
use core::f32::consts::{PI, TAU};
use core::fmt::Write;

/// Renders `shape` as a standalone SVG document on a square canvas.
/// Lines become `<line>` elements, curves and arcs `<path>` elements.
pub fn encode(shape: &Shape, canvas_size: Float) -> String {
    let mut svg = String::new();
    // writing into a String cannot fail
    let _ = write_document(&mut svg, shape, canvas_size);
    svg
}

fn write_document<W: Write>(out: &mut W, shape: &Shape, canvas_size: Float) -> core::fmt::Result {
    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{0}\" height=\"{0}\">",
        canvas_size
    )?;
    for styled in shape {
        out.write_str("  ")?;
        write_segment(out, styled)?;
        out.write_char('\n')?;
    }
    out.write_str("</svg>\n")
}

fn write_segment<W: Write>(out: &mut W, styled: &StyledSegment) -> core::fmt::Result {
    let stroke = to_hex(styled.stroker.color);
    let width = styled.stroker.width;
    match &styled.segment {
        Segment::Line(line) => {
            let [a, b] = line.points;
            write!(
                out,
                concat!(
                    "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" ",
                    "stroke=\"{}\" stroke-width=\"{}\" />"
                ),
                a.x, a.y, b.x, b.y, stroke, width
            )
        }
        segment => {
            out.write_str("<path d=\"")?;
            write_path_data(out, segment)?;
            write!(out, "\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" />", stroke, width)
        }
    }
}

/// Path data of a single segment, starting with its own `M` command.
pub fn write_path_data<W: Write>(out: &mut W, segment: &Segment) -> core::fmt::Result {
    let start = segment.start();
    write!(out, "M {} {}", start.x, start.y)?;
    match segment {
        Segment::Line(line) => write!(out, " L {} {}", line.points[1].x, line.points[1].y),
        Segment::QuadraticCurve(curve) => {
            let [_, c, e] = curve.points;
            write!(out, " Q {} {} {} {}", c.x, c.y, e.x, e.y)
        }
        Segment::CubicCurve(curve) => {
            let [_, c0, c1, e] = curve.points;
            write!(out, " C {} {} {} {} {} {}", c0.x, c0.y, c1.x, c1.y, e.x, e.y)
        }
        Segment::Arc(arc) => write_arc(out, arc),
    }
}

fn write_arc<W: Write>(out: &mut W, arc: &Arc) -> core::fmt::Result {
    let sweep = arc.sweep();
    // an `A` command cannot close on its own start point
    if sweep.abs() >= TAU - 1e-4 {
        let mid = Segment::Arc(*arc).evaluate(0.5);
        write_arc_command(out, arc.radii(), sweep * 0.5, mid)?;
        return write_arc_command(out, arc.radii(), sweep * 0.5, Segment::Arc(*arc).end());
    }
    write_arc_command(out, arc.radii(), sweep, Segment::Arc(*arc).end())
}

fn write_arc_command<W: Write>(
    out: &mut W,
    radii: Couple,
    sweep: Float,
    end: Couple,
) -> core::fmt::Result {
    let large = (sweep.abs() > PI) as u8;
    let positive = (sweep > 0.0) as u8;
    let (rx, ry) = (radii.x.abs(), radii.y.abs());
    write!(out, " A {} {} 0 {} {} {} {}", rx, ry, large, positive, end.x, end.y)
}
