//! Compact binary record of a single frame.
//!
//! All values are big-endian quads. After the magic bytes come the frame
//! index (u32) and its interpolation factor (f32), then six sections, each a
//! u32 item count followed by fixed-size items:
//!
//! | section          | quads per item | content                           |
//! |------------------|----------------|-----------------------------------|
//! | strokers         | 2              | `0x00RRGGBB`, width               |
//! | arcs             | 6              | center, radii, angular range      |
//! | cubic curves     | 8              | four points                       |
//! | quadratic curves | 6              | three points                      |
//! | lines            | 4              | two points                        |
//! | steps            | 3              | kind, geometry index, stroker index |
//!
//! Steps keep the segment order; identical geometries and strokers are
//! stored once.

use crate::primitive::{Segment, SegmentKind, Shape, Stroker, StyledSegment, SEGMENT_KINDS};
use crate::sequence::Frame;
use crate::{Couple, Float, C_ZERO};

use rgb::RGB8;

use alloc::vec::Vec;

use ParsingError::*;

#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("not a morphway frame")]
    NotAFrameFile,
    #[error("unexpected end of data")]
    TooShort,
    #[error("trailing bytes after the last section")]
    ExcessBytes,
    #[error("unknown segment type")]
    InvalidStepType,
    #[error("index out of range")]
    InvalidIndex,
    #[error("frame has no segments")]
    EmptyFrame,
    #[error("value does not fit in 32 bits")]
    Overflow,
}

pub type ParsingResult<T> = Result<T, ParsingError>;

const MAGIC_BYTES: [u8; 4] = [b'M', b'P', b'H', b'0'];
const QUAD: usize = 4;
const HEADER: usize = MAGIC_BYTES.len() + 2 * QUAD;

fn slice<'a>(bytes: &'a [u8], i: &mut usize, len: usize) -> ParsingResult<&'a [u8]> {
    let pos = *i;
    *i += len;
    match bytes.get(pos..*i) {
        Some(bytes) => Ok(bytes),
        None => Err(TooShort),
    }
}

fn read_quad(bytes: &[u8], i: &mut usize) -> ParsingResult<[u8; 4]> {
    let mut quad = [0; 4];
    quad.copy_from_slice(slice(bytes, i, QUAD)?);
    Ok(quad)
}

fn read_u32(bytes: &[u8], i: &mut usize) -> ParsingResult<u32> {
    read_quad(bytes, i).map(u32::from_be_bytes)
}

fn read_f32(bytes: &[u8], i: &mut usize) -> ParsingResult<f32> {
    read_quad(bytes, i).map(f32::from_be_bytes)
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Section {
    offset: usize,
    count: usize,
    quads_per_item: usize,
}

impl Section {
    fn item(&self, i: usize) -> ParsingResult<usize> {
        match i < self.count {
            true => Ok(self.offset + i * self.quads_per_item * QUAD),
            false => Err(InvalidIndex),
        }
    }
}

fn discover_section(bytes: &[u8], i: &mut usize, quads_per_item: usize) -> ParsingResult<Section> {
    let count = read_u32(bytes, i)? as usize;
    let offset = *i;
    let size = count.checked_mul(quads_per_item * QUAD).ok_or(TooShort)?;
    *i = i.checked_add(size).ok_or(TooShort)?;
    match *i <= bytes.len() {
        true => Ok(Section { offset, count, quads_per_item }),
        false => Err(TooShort),
    }
}

/// Lazy reader over a serialized frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedFrame<T> {
    storage: T,
    strokers: Section,
    arcs: Section,
    cubic_curves: Section,
    quadratic_curves: Section,
    lines: Section,
    steps: Section,
}

impl<T: AsRef<[u8]>> SerializedFrame<T> {
    /// Checks the magic bytes and section layout. Items are decoded on access.
    pub fn new(storage: T) -> ParsingResult<Self> {
        let bytes = storage.as_ref();
        bytes.strip_prefix(&MAGIC_BYTES).ok_or(NotAFrameFile)?;
        if bytes.len() < HEADER {
            return Err(TooShort);
        }

        let mut i = HEADER;
        let i = &mut i;

        let strokers = discover_section(bytes, i, 2)?;
        let arcs = discover_section(bytes, i, 6)?;
        let cubic_curves = discover_section(bytes, i, 8)?;
        let quadratic_curves = discover_section(bytes, i, 6)?;
        let lines = discover_section(bytes, i, 4)?;
        let steps = discover_section(bytes, i, 3)?;

        if *i == bytes.len() {
            Ok(Self {
                storage,
                strokers,
                arcs,
                cubic_curves,
                quadratic_curves,
                lines,
                steps,
            })
        } else {
            Err(ExcessBytes)
        }
    }

    fn bytes(&self) -> &[u8] {
        self.storage.as_ref()
    }

    pub fn index(&self) -> usize {
        let bytes = self.bytes();
        u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize
    }

    pub fn t(&self) -> Float {
        let bytes = self.bytes();
        f32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]])
    }

    /// Number of segments in the frame.
    pub fn steps(&self) -> usize {
        self.steps.count
    }

    pub fn strokers(&self) -> usize {
        self.strokers.count
    }

    pub fn stroker(&self, i: usize) -> ParsingResult<Stroker> {
        let mut b = self.strokers.item(i)?;
        let [_, r, g, bl] = read_quad(self.bytes(), &mut b)?;
        let width = read_f32(self.bytes(), &mut b)?;
        Ok(Stroker::new(RGB8::new(r, g, bl), width))
    }

    fn couples<const N: usize>(&self, section: &Section, i: usize) -> ParsingResult<[Couple; N]> {
        let mut b = section.item(i)?;
        let mut points = [C_ZERO; N];
        for point in points.iter_mut() {
            let x = read_f32(self.bytes(), &mut b)?;
            let y = read_f32(self.bytes(), &mut b)?;
            *point = Couple::new(x, y);
        }
        Ok(points)
    }

    pub fn segment(&self, kind: SegmentKind, i: usize) -> ParsingResult<Segment> {
        Ok(match kind {
            SegmentKind::Arc => {
                let [center, radii, range] = self.couples(&self.arcs, i)?;
                Segment::arc(center, radii, range)
            }
            SegmentKind::CubicCurve => {
                let [a, b, c, d] = self.couples(&self.cubic_curves, i)?;
                Segment::cubic(a, b, c, d)
            }
            SegmentKind::QuadraticCurve => {
                let [a, b, c] = self.couples(&self.quadratic_curves, i)?;
                Segment::quadratic(a, b, c)
            }
            SegmentKind::Line => {
                let [a, b] = self.couples(&self.lines, i)?;
                Segment::line(a, b)
            }
        })
    }

    pub fn step(&self, i: usize) -> ParsingResult<StyledSegment> {
        let mut b = self.steps.item(i)?;
        let kind = read_u32(self.bytes(), &mut b)? as usize;
        let kind = *SEGMENT_KINDS.get(kind).ok_or(InvalidStepType)?;
        let index = read_u32(self.bytes(), &mut b)? as usize;
        let stroker = read_u32(self.bytes(), &mut b)? as usize;
        Ok(StyledSegment::new(self.segment(kind, index)?, self.stroker(stroker)?))
    }

    pub fn iter(&self) -> StepIterator<'_, T> {
        StepIterator { frame: self, next: 0 }
    }

    /// Decodes every step into an owned frame.
    pub fn to_frame(&self) -> ParsingResult<Frame> {
        let segments = self.iter().collect::<ParsingResult<Vec<_>>>()?;
        Ok(Frame {
            index: self.index(),
            t: self.t(),
            shape: Shape::new(segments).map_err(|_| EmptyFrame)?,
        })
    }
}

pub struct StepIterator<'a, T> {
    frame: &'a SerializedFrame<T>,
    next: usize,
}

impl<T: AsRef<[u8]>> Iterator for StepIterator<'_, T> {
    type Item = ParsingResult<StyledSegment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next < self.frame.steps() {
            let step = self.frame.step(self.next);
            self.next += 1;
            Some(step)
        } else {
            None
        }
    }
}

fn bytes(n: usize) -> ParsingResult<[u8; 4]> {
    Ok(to_u32(n)?.to_be_bytes())
}

fn to_u32(n: usize) -> ParsingResult<u32> {
    u32::try_from(n).map_err(|_| Overflow)
}

fn find_or_push<T: Eq>(vec: &mut Vec<T>, obj: T) -> usize {
    vec.iter().position(|o| o == &obj).unwrap_or_else(|| {
        let index = vec.len();
        vec.push(obj);
        index
    })
}

fn bits<const N: usize>(points: &[Couple; N]) -> Vec<u32> {
    points.iter().flat_map(|p| [p.x.to_bits(), p.y.to_bits()]).collect()
}

/// Encodes a frame. Fails with [`ParsingError::Overflow`] when the frame
/// index or a section length does not fit in a u32.
pub fn serialize(frame: &Frame) -> ParsingResult<Vec<u8>> {
    let mut strokers = Vec::new();
    let mut arcs = Vec::new();
    let mut cubic_curves = Vec::new();
    let mut quadratic_curves = Vec::new();
    let mut lines = Vec::new();
    let mut steps = Vec::new();

    for styled in &frame.shape {
        let Stroker { color, width } = styled.stroker;
        let packed = u32::from_be_bytes([0, color.r, color.g, color.b]);
        let stroker = find_or_push(&mut strokers, [packed, width.to_bits()]);

        let index = match &styled.segment {
            Segment::Arc(arc) => find_or_push(&mut arcs, bits(&arc.points)),
            Segment::CubicCurve(curve) => find_or_push(&mut cubic_curves, bits(&curve.points)),
            Segment::QuadraticCurve(curve) => {
                find_or_push(&mut quadratic_curves, bits(&curve.points))
            }
            Segment::Line(line) => find_or_push(&mut lines, bits(&line.points)),
        };

        steps.push([styled.segment.kind().as_u32(), to_u32(index)?, to_u32(stroker)?]);
    }

    let mut output = Vec::new();
    let mut write_fn = |quad: [u8; 4]| output.extend_from_slice(&quad);

    write_fn(MAGIC_BYTES);
    write_fn(bytes(frame.index)?);
    write_fn(frame.t.to_be_bytes());

    fn for_each<I, F>(write_fn: &mut F, items: &[I]) -> ParsingResult<()>
    where
        I: AsRef<[u32]>,
        F: FnMut([u8; 4]),
    {
        write_fn(bytes(items.len())?);
        for item in items {
            for quad in item.as_ref() {
                write_fn(quad.to_be_bytes());
            }
        }
        Ok(())
    }

    for_each(&mut write_fn, &strokers)?;
    for_each(&mut write_fn, &arcs)?;
    for_each(&mut write_fn, &cubic_curves)?;
    for_each(&mut write_fn, &quadratic_curves)?;
    for_each(&mut write_fn, &lines)?;
    for_each(&mut write_fn, &steps)?;

    Ok(output)
}
