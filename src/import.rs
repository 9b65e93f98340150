//! Input sources (spec §4.1 "the loader accepts either (a) a memory span,
//! (b) a file path ..., or (c) a user callback").
//!
//! A small closed `enum` the public `load_*` entry points build from,
//! rather than a trait object the caller constructs directly.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Where the raw FBX bytes come from.
pub enum Source<'a> {
    /// An in-memory buffer, read with zero copies into the reader.
    Memory(&'a [u8]),
    /// A file path, opened and read into memory on [`Source::read_all`].
    Path(&'a Path),
    /// A caller-supplied pull callback: `read(dst) -> bytes_read`, with
    /// `0` signaling end-of-stream (spec §4.1/§5 "Cancellation").
    Callback(Box<dyn FnMut(&mut [u8]) -> usize + 'a>),
}

impl<'a> Source<'a> {
    pub fn from_path(path: &'a Path) -> Self {
        Source::Path(path)
    }

    pub fn from_memory(data: &'a [u8]) -> Self {
        Source::Memory(data)
    }

    pub fn from_reader(read: impl FnMut(&mut [u8]) -> usize + 'a) -> Self {
        Source::Callback(Box::new(read))
    }

    /// Materializes the source into an owned byte buffer. `Memory` is
    /// borrowed in place by the caller instead where possible; this is
    /// only reached for `Path` and `Callback` sources, both of which need
    /// an owned buffer before the format dispatcher can peek the magic.
    pub(crate) fn read_all(self) -> Result<Vec<u8>> {
        match self {
            Source::Memory(data) => Ok(data.to_vec()),
            Source::Path(path) => fs::read(path).map_err(Error::from),
            Source::Callback(mut read) => {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 64 * 1024];
                loop {
                    let n = read(&mut chunk);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                Ok(buf)
            }
        }
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(data: &'a [u8]) -> Self {
        Source::Memory(data)
    }
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Source::Path(path)
    }
}
