//! Handing frames to a storage collaborator.
//!
//! The engine never touches a filesystem itself: frames are encoded to bytes
//! and given to a [`FrameWriter`] under a name like `frame_007.svg`.

use crate::format::{serialize, ParsingError};
use crate::sequence::Frame;
use crate::{svg, Float};

use alloc::{collections::BTreeMap, format, string::String, vec::Vec};
use core::convert::Infallible;

/// Turns a frame into file content.
pub trait FrameEncoder {
    type Error;

    /// File extension, without the dot.
    fn extension(&self) -> &str;

    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, Self::Error>;
}

/// SVG document with one element per segment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SvgEncoder {
    pub canvas_size: Float,
}

impl FrameEncoder for SvgEncoder {
    type Error = Infallible;

    fn extension(&self) -> &str {
        "svg"
    }

    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, Infallible> {
        Ok(svg::encode(&frame.shape, self.canvas_size).into_bytes())
    }
}

/// The binary record of [`crate::format`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct BinaryEncoder;

impl FrameEncoder for BinaryEncoder {
    type Error = ParsingError;

    fn extension(&self) -> &str {
        "mph"
    }

    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, ParsingError> {
        serialize(frame)
    }
}

/// Destination for encoded frames, keyed by name.
pub trait FrameWriter {
    type Error;

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Failure of [`write_frames`]: the encoder or the writer gave up on a frame.
#[derive(thiserror::Error, Debug)]
pub enum WriteError<E, W> {
    #[error("cannot encode frame {index}: {error}")]
    Encode { index: usize, error: E },
    #[error("cannot write {name}: {error}")]
    Write { name: String, error: W },
}

/// `{base}_{index:03}.{extension}`
pub fn frame_name(base: &str, index: usize, extension: &str) -> String {
    format!("{}_{:03}.{}", base, index, extension)
}

/// Encodes and writes every frame, stopping at the first error.
/// Returns the number of frames handed to the writer.
pub fn write_frames<I, E, W>(
    frames: I,
    base: &str,
    encoder: &E,
    writer: &mut W,
) -> Result<usize, WriteError<E::Error, W::Error>>
where
    I: IntoIterator<Item = Frame>,
    E: FrameEncoder + ?Sized,
    W: FrameWriter + ?Sized,
{
    let mut written = 0;
    for frame in frames {
        let index = frame.index;
        let bytes = encoder
            .encode(&frame)
            .map_err(|error| WriteError::Encode { index, error })?;

        let name = frame_name(base, index, encoder.extension());
        if let Err(error) = writer.write(&name, &bytes) {
            return Err(WriteError::Write { name, error });
        }
        log::trace!("wrote {}", name);
        written += 1;
    }
    Ok(written)
}

/// Keeps frames in memory, sorted by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryWriter {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> BTreeMap<String, Vec<u8>> {
        self.files
    }
}

impl FrameWriter for MemoryWriter {
    type Error = Infallible;

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<(), Infallible> {
        self.files.insert(name.into(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(feature = "std")]
pub use self::directory::DirectoryWriter;

#[cfg(feature = "std")]
mod directory {
    use super::FrameWriter;

    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Writes frames as files under a directory, creating it on first use.
    #[derive(Debug, Clone, PartialEq)]
    pub struct DirectoryWriter {
        root: PathBuf,
        skip_existing: bool,
    }

    impl DirectoryWriter {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self {
                root: root.into(),
                skip_existing: false,
            }
        }

        /// Leave files that already exist untouched instead of overwriting them.
        pub fn skip_existing(mut self, skip: bool) -> Self {
            self.skip_existing = skip;
            self
        }

        pub fn root(&self) -> &Path {
            &self.root
        }
    }

    impl FrameWriter for DirectoryWriter {
        type Error = io::Error;

        fn write(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
            let path = self.root.join(name);
            if self.skip_existing && path.exists() {
                log::info!("{} already exists, skipping", path.display());
                return Ok(());
            }
            fs::create_dir_all(&self.root)?;
            fs::write(&path, bytes)
        }
    }
}
