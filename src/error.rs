//! Loader error type (spec §7), wrapping [`ufbx_data::error::LoadError`]'s
//! frame stack with the `From` conversions the pipeline needs.
//!
//! One `Error` enum at the crate boundary with `From` impls, not
//! `anyhow`/`eyre` (`SPEC_FULL` §1).

use std::fmt;
use std::io;
use ufbx_data::error::{ErrorFrame, ErrorKind, LoadError};

/// A recoverable, notable skip encountered while loading (spec §1
/// ambient addition "Warnings"): an unrecognized node attribute kind, for
/// instance, is silently dropped by the original but surfaced here as an
/// inspectable, typed record instead of silent data loss.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    UnknownAttributeKind(String),
    UnknownObjectType(String),
    UnrecognizedTangentWeightMode(char),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::UnknownAttributeKind(s) => write!(f, "unrecognized node attribute kind: {s}"),
            Warning::UnknownObjectType(s) => write!(f, "unrecognized top-level object type: {s}"),
            Warning::UnrecognizedTangentWeightMode(c) => write!(f, "unrecognized tangent weight mode: {c}"),
        }
    }
}

/// Accumulates [`Warning`]s across a load (spec §1 ambient addition).
#[derive(Clone, Debug, Default)]
pub struct Warnings(pub Vec<Warning>);

impl Warnings {
    pub fn push(&mut self, warning: Warning) {
        self.0.push(warning);
    }
}

/// Fatal load error (spec §7). Wraps the data crate's frame stack so both
/// `ufbx` and `ufbx-data` agree on its shape while the public surface is
/// entirely `ufbx::Error`.
///
/// An I/O variant, a format/parse variant, and a `Validation` variant
/// carrying every `(Path, validation::Error)` pair collected in one pass
/// rather than failing on the first one.
#[derive(Debug)]
pub enum Error {
    Load(LoadError),
    Io(io::Error),
    Validation(Vec<(ufbx_data::Path, ufbx_data::validation::Error)>),
}

impl Error {
    pub fn new(kind: ErrorKind, function: &'static str, line: u32, description: impl Into<String>) -> Self {
        Error::Load(LoadError::new(kind, function, line, description))
    }

    pub fn push_frame(&mut self, function: &'static str, line: u32, description: impl Into<String>) {
        if let Error::Load(e) = self {
            e.push_frame(function, line, description);
        }
    }

    pub fn frames(&self) -> &[ErrorFrame] {
        match self {
            Error::Load(e) => &e.frames,
            Error::Io(_) | Error::Validation(_) => &[],
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Load(e) => write!(f, "{e}"),
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Validation(errs) => {
                write!(f, "{} validation error(s)", errs.len())?;
                for (path, err) in errs {
                    write!(f, "\n  {path}: {err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Load(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Validation(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        Error::Load(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
