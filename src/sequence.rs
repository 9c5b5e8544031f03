//! The morph pipeline and its lazy frame stream.

use crate::config::{MorphConfig, WidthPrecision, MAX_FRAME_COUNT};
use crate::error::{MorphResult, Side};
use crate::interpolate::blend_shapes;
use crate::matching::{match_segments, MatchedShapes};
use crate::normalize::normalize_with;
use crate::primitive::Shape;
use crate::resample::resample_pair;
use crate::Float;

use core::iter::FusedIterator;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// One in-between shape and its position in the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub t: Float,
    pub shape: Shape,
}

/// Interpolation factor of frame `index` out of `steps`.
pub fn interpolation_factor(index: usize, steps: usize) -> Float {
    index as Float / steps as Float
}

fn make_frame(
    matched: &MatchedShapes,
    index: usize,
    steps: usize,
    precision: WidthPrecision,
) -> Frame {
    let t = interpolation_factor(index, steps);
    log::trace!("frame {} at t = {}", index, t);
    Frame {
        index,
        t,
        shape: blend_shapes(matched, t, precision),
    }
}

/// Two shapes prepared once (normalized, resampled, matched) so that any
/// number of frames can be computed from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Morph {
    matched: MatchedShapes,
    config: MorphConfig,
}

impl Morph {
    pub fn new(source: &Shape, target: &Shape, config: MorphConfig) -> MorphResult<Self> {
        config.validate()?;

        let (source, target) = match config.normalize {
            true => (
                normalize_with(source, &config).map_err(|e| e.on(Side::Source))?,
                normalize_with(target, &config).map_err(|e| e.on(Side::Target))?,
            ),
            false => (source.clone(), target.clone()),
        };

        let (source, target) = resample_pair(&source, &target, &config)?;
        let matched = match_segments(&source, &target)?;
        Self::from_matched(matched, config)
    }

    /// Wraps shapes that were already matched by the caller.
    pub fn from_matched(matched: MatchedShapes, config: MorphConfig) -> MorphResult<Self> {
        config.validate()?;
        Ok(Self { matched, config })
    }

    pub fn matched(&self) -> &MatchedShapes {
        &self.matched
    }

    pub fn config(&self) -> &MorphConfig {
        &self.config
    }

    /// Equal to the first frame.
    pub fn source(&self) -> Shape {
        self.matched.source()
    }

    /// Equal to the last frame.
    pub fn target(&self) -> Shape {
        self.matched.target()
    }

    /// `frame_count + 1`: both endpoints are included.
    pub fn len(&self) -> usize {
        self.config.frame_count + 1
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Computes frame `index` on its own, or `None` past the last frame.
    /// Frames do not depend on each other, so callers may compute them in
    /// any order or on several threads.
    pub fn frame(&self, index: usize) -> Option<Frame> {
        self.frames().nth(index)
    }

    /// A fresh sequence over all frames; each call restarts from frame 0.
    pub fn frames(&self) -> FrameSequence<'_> {
        FrameSequence::new(&self.matched, self.config.frame_count, self.config.width_precision)
    }

    /// All frames, computed on the rayon thread pool. Collecting keeps
    /// index order.
    #[cfg(feature = "rayon")]
    pub fn par_frames(&self) -> impl IndexedParallelIterator<Item = Frame> + '_ {
        let steps = self.config.frame_count;
        let precision = self.config.width_precision;
        (0..steps + 1)
            .into_par_iter()
            .map(move |index| make_frame(&self.matched, index, steps, precision))
    }
}

/// Lazy, finite stream of frames at `t = i / steps` for `i` in `0..=steps`.
#[derive(Debug, Clone)]
pub struct FrameSequence<'a> {
    matched: &'a MatchedShapes,
    steps: usize,
    precision: WidthPrecision,
    front: usize,
    back: usize,
}

impl<'a> FrameSequence<'a> {
    /// `steps` is clamped to `1..=MAX_FRAME_COUNT`.
    pub fn new(matched: &'a MatchedShapes, steps: usize, precision: WidthPrecision) -> Self {
        let steps = steps.clamp(1, MAX_FRAME_COUNT);
        Self {
            matched,
            steps,
            precision,
            front: 0,
            back: steps + 1,
        }
    }

    fn make(&self, index: usize) -> Frame {
        make_frame(self.matched, index, self.steps, self.precision)
    }
}

impl Iterator for FrameSequence<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.front < self.back {
            let frame = self.make(self.front);
            self.front += 1;
            Some(frame)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.back - self.front;
        (left, Some(left))
    }

    fn nth(&mut self, n: usize) -> Option<Frame> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl DoubleEndedIterator for FrameSequence<'_> {
    fn next_back(&mut self) -> Option<Frame> {
        if self.front < self.back {
            self.back -= 1;
            Some(self.make(self.back))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for FrameSequence<'_> {}

impl FusedIterator for FrameSequence<'_> {}
