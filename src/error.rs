use crate::primitive::SegmentKind;

use alloc::boxed::Box;
use core::fmt;

pub type MorphResult<T> = Result<T, MorphError>;

/// Which input of a morph an error belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Source => "source",
            Side::Target => "target",
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MorphError {
    #[error("{kind} segment needs {expected} control points, got {found}")]
    InvalidArity {
        kind: SegmentKind,
        expected: usize,
        found: usize,
    },

    #[error("shape has no segments")]
    EmptyShape,

    #[error("shape bounding box has zero width and height")]
    DegenerateShape,

    #[error("shape has zero arc length and cannot be resampled")]
    ResampleFailed,

    #[error("segment {index}: no promotion between {from} and {to}")]
    UnsupportedSegmentPair {
        index: usize,
        from: SegmentKind,
        to: SegmentKind,
    },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("{side} shape: {source}")]
    Shape {
        side: Side,
        source: Box<MorphError>,
    },
}

impl MorphError {
    /// Attaches the input this error was raised for.
    pub fn on(self, side: Side) -> Self {
        match self {
            already @ MorphError::Shape { .. } => already,
            other => MorphError::Shape {
                side,
                source: Box::new(other),
            },
        }
    }

    /// The error with any side context stripped.
    pub fn root(&self) -> &MorphError {
        match self {
            MorphError::Shape { source, .. } => source.root(),
            other => other,
        }
    }
}
