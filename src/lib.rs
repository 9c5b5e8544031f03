#![cfg_attr(not(any(test, feature = "std")), no_std)]
extern crate alloc;

pub mod color;
pub mod config;
pub mod error;
pub mod format;
pub mod interpolate;
pub mod matching;
pub mod normalize;
pub mod output;
pub mod primitive;
pub mod resample;
pub mod sequence;
pub mod svg;

#[cfg(test)]
mod tests;

pub type Float = f32;
pub type Couple = vek::vec::repr_c::vec2::Vec2<Float>;
pub const C_ZERO: Couple = Couple::new(0.0, 0.0);

#[doc(inline)]
pub use {
    config::MorphConfig,
    error::MorphError,
    error::MorphResult,
    primitive::Segment,
    primitive::SegmentKind,
    primitive::Shape,
    primitive::Stroker,
    primitive::StyledSegment,
    sequence::Frame,
    sequence::FrameSequence,
    sequence::Morph,
};
