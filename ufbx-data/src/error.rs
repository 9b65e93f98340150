//! The parse-failure frame stack (spec §7), reused by `ufbx::Error` so the
//! data crate and the loader crate agree on its shape.
//!
//! `SPEC_FULL` supplement: fixed capacity of 8 frames, matching
//! `original_source/ufbx.h`'s `UFBX_ERROR_STACK_MAX_DEPTH` rather than an
//! unbounded `Vec` (Design Note discipline carried through even though the
//! distilled spec only says "a small fixed-capacity stack").
pub const ERROR_STACK_MAX_DEPTH: usize = 8;

/// One `{function, source_line, description}` frame (spec §7).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorFrame {
    pub function: &'static str,
    pub source_line: u32,
    pub description: String,
}

/// The kind of a fatal load failure (spec §7, not exhaustive list
/// reproduced verbatim).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Truncated,
    BadMagic,
    BadHeader,
    BadNodeStructure,
    BadArray,
    Deflate(DeflateError),
    Allocation,
    BadString,
    BadIndex,
    MaxDepth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeflateError {
    HuffmanOverfull,
    HuffmanUnderfull,
    BadLengthCode,
    BadDistanceCode,
    BadStoredBlockLength,
    AdlerMismatch,
}

/// A fatal error with its accumulated call-frame context, capped at
/// [`ERROR_STACK_MAX_DEPTH`]: pushing past the cap silently drops the
/// oldest (outermost) frame rather than growing, mirroring the original's
/// fixed-size array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadError {
    pub kind: ErrorKind,
    pub frames: Vec<ErrorFrame>,
}

impl LoadError {
    pub fn new(kind: ErrorKind, function: &'static str, source_line: u32, description: impl Into<String>) -> Self {
        LoadError {
            kind,
            frames: vec![ErrorFrame { function, source_line, description: description.into() }],
        }
    }

    pub fn push_frame(&mut self, function: &'static str, source_line: u32, description: impl Into<String>) {
        if self.frames.len() >= ERROR_STACK_MAX_DEPTH {
            self.frames.remove(0);
        }
        self.frames.push(ErrorFrame { function, source_line, description: description.into() });
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self.kind)?;
        for frame in &self.frames {
            write!(f, "\n  at {}:{}: {}", frame.function, frame.source_line, frame.description)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadError {}
